//! Filter predicates shared by the store client and the dev server.
//!
//! The wire encoding follows the PostgREST style the hosted store speaks:
//! a lone condition rides as `?column=eq.value`, an OR-combination as
//! `?or=(a.eq.v,b.ilike.*term*)`. The client encodes, the dev server parses
//! the same strings back and evaluates them against stored JSON rows.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cond {
    /// Exact match on a column.
    Eq { column: String, value: String },
    /// Case-insensitive substring match; `pattern` carries `*` wildcards.
    ILike { column: String, pattern: String },
}

impl Cond {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Cond::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Substring match: wraps the needle in `*` wildcards.
    pub fn contains(column: impl Into<String>, needle: impl AsRef<str>) -> Self {
        Cond::ILike {
            column: column.into(),
            pattern: format!("*{}*", needle.as_ref()),
        }
    }

    fn encode(&self) -> String {
        match self {
            Cond::Eq { column, value } => format!("{column}.eq.{value}"),
            Cond::ILike { column, pattern } => format!("{column}.ilike.{pattern}"),
        }
    }

    /// Parses `column.op.value`. The value may itself contain dots
    /// (emails do), so only the first two separators are structural.
    pub fn parse(expr: &str) -> Option<Cond> {
        let mut parts = expr.splitn(3, '.');
        let column = parts.next()?.to_string();
        let op = parts.next()?;
        let rest = parts.next()?.to_string();
        match op {
            "eq" => Some(Cond::Eq {
                column,
                value: rest,
            }),
            "ilike" => Some(Cond::ILike {
                column,
                pattern: rest,
            }),
            _ => None,
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Cond::Eq { column, value } => row
                .get(column)
                .and_then(Value::as_str)
                .map_or(false, |field| field == value),
            Cond::ILike { column, pattern } => {
                let needle = pattern.trim_matches('*').to_lowercase();
                row.get(column)
                    .and_then(Value::as_str)
                    .map_or(false, |field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter {
    All(Vec<Cond>),
    Any(Vec<Cond>),
}

impl Filter {
    /// Query-string pairs in the store's wire encoding.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            Filter::All(conds) => conds
                .iter()
                .map(|cond| match cond {
                    Cond::Eq { column, value } => (column.clone(), format!("eq.{value}")),
                    Cond::ILike { column, pattern } => {
                        (column.clone(), format!("ilike.{pattern}"))
                    }
                })
                .collect(),
            Filter::Any(conds) => {
                let inner = conds
                    .iter()
                    .map(Cond::encode)
                    .collect::<Vec<_>>()
                    .join(",");
                vec![("or".to_string(), format!("({inner})"))]
            }
        }
    }

    /// Rebuilds a filter from request query parameters. Unknown parameters
    /// (`select` and friends) are ignored; an absent filter matches all rows.
    pub fn from_params(params: &HashMap<String, String>) -> Filter {
        if let Some(expr) = params.get("or") {
            let inner = expr.trim_start_matches('(').trim_end_matches(')');
            let conds = inner.split(',').filter_map(Cond::parse).collect();
            return Filter::Any(conds);
        }
        let conds = params
            .iter()
            .filter(|(key, _)| key.as_str() != "select")
            .filter_map(|(key, value)| Cond::parse(&format!("{key}.{value}")))
            .collect();
        Filter::All(conds)
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::All(conds) => conds.iter().all(|cond| cond.matches(row)),
            Filter::Any(conds) => conds.iter().any(|cond| cond.matches(row)),
        }
    }
}
