//! Stand-in for the hosted data service, for local runs and integration
//! tests. Speaks the same wire contract the real backend does: filtered
//! selects and merge-by-key upserts per table, plus the identity endpoint.

use anyhow::Context;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use lobby_common::query::Filter;
use lobby_common::Identity;
use serde_json::Value;
use sled::Db;
use std::collections::HashMap;

pub type Result<T> = std::result::Result<T, AppError>;

pub struct AppError(anyhow::Error);

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>`
// to turn them into `Result<_, AppError>` without mapping manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

const SESSION_KEY: &str = "session";

#[derive(Clone)]
pub struct State {
    db: Db,
}

impl State {
    pub fn open(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Fresh throwaway database, used by integration tests.
    pub fn temporary() -> anyhow::Result<Self> {
        Ok(Self {
            db: sled::Config::new().temporary(true).open()?,
        })
    }
}

/// Natural key per table: the friends table is keyed by the directed pair,
/// everything else by its id. Upserting an existing key updates in place.
fn natural_key(table: &str, row: &Value) -> Option<String> {
    if table == "friends" {
        let sender = row.get("senderId")?.as_str()?;
        let receiver = row.get("receiverId")?.as_str()?;
        Some(format!("{sender}:{receiver}"))
    } else {
        Some(row.get("id")?.as_str()?.to_string())
    }
}

pub fn router(state: State) -> Router {
    Router::new()
        .route("/rest/:table", get(select_rows).post(upsert_rows))
        .route("/auth/user", get(current_user).post(set_user))
        .layer(Extension(state))
}

async fn select_rows(
    Extension(state): Extension<State>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>> {
    let filter = Filter::from_params(&params);
    let tree = state.db.open_tree(&table)?;
    let mut rows = Vec::new();
    for entry in tree.iter() {
        let (_key, bytes) = entry?;
        let row: Value = serde_json::from_slice(&bytes)?;
        if filter.matches(&row) {
            rows.push(row);
        }
    }
    tracing::debug!(table, matched = rows.len(), "select");
    Ok(Json(rows))
}

async fn upsert_rows(
    Extension(state): Extension<State>,
    Path(table): Path<String>,
    Json(payload): Json<Value>,
) -> Result<StatusCode> {
    let rows = match payload {
        Value::Array(rows) => rows,
        single => vec![single],
    };
    let tree = state.db.open_tree(&table)?;
    for row in rows {
        let key = natural_key(&table, &row).with_context(|| "row missing natural key")?;
        tree.insert(key.as_bytes(), serde_json::to_vec(&row)?)?;
    }
    Ok(StatusCode::CREATED)
}

async fn current_user(Extension(state): Extension<State>) -> Result<Json<Identity>> {
    let bytes = state
        .db
        .get(SESSION_KEY)?
        .with_context(|| "no authenticated session")?;
    Ok(Json(serde_json::from_slice(&bytes)?))
}

async fn set_user(
    Extension(state): Extension<State>,
    Json(identity): Json<Identity>,
) -> Result<()> {
    state.db.insert(SESSION_KEY, serde_json::to_vec(&identity)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn friends_rows_are_keyed_by_directed_pair() {
        let row = json!({ "senderId": "u1", "receiverId": "u2", "status": false });
        assert_eq!(natural_key("friends", &row).unwrap(), "u1:u2");
        let reversed = json!({ "senderId": "u2", "receiverId": "u1", "status": false });
        assert_eq!(natural_key("friends", &reversed).unwrap(), "u2:u1");
    }

    #[test]
    fn directory_rows_are_keyed_by_id() {
        let row = json!({ "id": "u2", "hotelName": "Lotus Inn" });
        assert_eq!(natural_key("userInfo", &row).unwrap(), "u2");
        assert_eq!(natural_key("userInfo", &json!({})), None);
    }
}
