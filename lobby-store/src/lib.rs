//! Client for the hosted data service: table-scoped select/upsert plus the
//! identity endpoint, and the [`DirectoryStore`] seam the workflows depend on
//! so tests can swap the remote store for an in-memory one.

pub mod error;

use async_trait::async_trait;
use lobby_common::query::{Cond, Filter};
use lobby_common::{FriendEdge, Identity, ProfileRecord, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::StoreError;

pub const DIRECTORY_TABLE: &str = "userInfo";
pub const FRIENDS_TABLE: &str = "friends";

/// Every query the friend-directory and profile workflows issue, behind one
/// trait so the remote dependency is mockable.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All friend edges touching the viewer, either direction.
    async fn find_known_edges(&self, viewer: &UserId) -> Result<Vec<FriendEdge>, StoreError>;

    /// Case-insensitive substring match on email or hotel name.
    async fn find_directory_matches(&self, term: &str) -> Result<Vec<ProfileRecord>, StoreError>;

    /// Insert-or-update keyed on the (sender, receiver) pair.
    async fn upsert_edge(&self, edge: &FriendEdge) -> Result<(), StoreError>;

    async fn fetch_profile(&self, id: &UserId) -> Result<Option<ProfileRecord>, StoreError>;

    /// Insert-or-update keyed on the record id.
    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StoreError>;
}

/// The real store: a PostgREST-flavored REST endpoint.
#[derive(Clone)]
pub struct RemoteStore {
    base: String,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base: base_url.into(),
            client: Default::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .client
            .get(format!("{}/rest/{}", self.base, table))
            .query(&filter.query_pairs())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        rows: &[T],
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}/rest/{}", self.base, table))
            .header("Prefer", "resolution=merge-duplicates")
            .json(rows)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        Ok(())
    }

    /// The identity provider's `currentUser` call.
    pub async fn current_user(&self) -> Result<Identity, StoreError> {
        let response = self
            .client
            .get(format!("{}/auth/user", self.base))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DirectoryStore for RemoteStore {
    async fn find_known_edges(&self, viewer: &UserId) -> Result<Vec<FriendEdge>, StoreError> {
        let filter = Filter::Any(vec![
            Cond::eq("senderId", viewer.as_str()),
            Cond::eq("receiverId", viewer.as_str()),
        ]);
        self.select(FRIENDS_TABLE, &filter).await
    }

    async fn find_directory_matches(&self, term: &str) -> Result<Vec<ProfileRecord>, StoreError> {
        let filter = Filter::Any(vec![
            Cond::contains("userEmail", term),
            Cond::contains("hotelName", term),
        ]);
        self.select(DIRECTORY_TABLE, &filter).await
    }

    async fn upsert_edge(&self, edge: &FriendEdge) -> Result<(), StoreError> {
        self.upsert(FRIENDS_TABLE, std::slice::from_ref(edge)).await
    }

    async fn fetch_profile(&self, id: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        let filter = Filter::All(vec![Cond::eq("id", id.as_str())]);
        let mut rows: Vec<ProfileRecord> = self.select(DIRECTORY_TABLE, &filter).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StoreError> {
        self.upsert(DIRECTORY_TABLE, std::slice::from_ref(record))
            .await
    }
}
