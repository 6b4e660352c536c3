//! In-memory stand-in for the remote store, so workflow tests run without a
//! network and can force failures and in-flight interleavings on demand.

use async_trait::async_trait;
use lobby_common::{FriendEdge, ProfileRecord, UserId};
use lobby_store::error::StatusCode;
use lobby_store::{DirectoryStore, StoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub struct MemoryStore {
    directory: Mutex<Vec<ProfileRecord>>,
    edges: Mutex<Vec<FriendEdge>>,
    fail_queries: AtomicBool,
    fail_upserts: AtomicBool,
    directory_calls: AtomicUsize,
    hold_next_search: AtomicBool,
    held: Notify,
    release: Notify,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            directory: Mutex::new(Vec::new()),
            edges: Mutex::new(Vec::new()),
            fail_queries: AtomicBool::new(false),
            fail_upserts: AtomicBool::new(false),
            directory_calls: AtomicUsize::new(0),
            hold_next_search: AtomicBool::new(false),
            held: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn seed_profile(&self, record: ProfileRecord) {
        self.directory.lock().unwrap().push(record);
    }

    pub fn seed_edge(&self, edge: FriendEdge) {
        self.edges.lock().unwrap().push(edge);
    }

    pub fn edges(&self) -> Vec<FriendEdge> {
        self.edges.lock().unwrap().clone()
    }

    pub fn directory_calls(&self) -> usize {
        self.directory_calls.load(Ordering::SeqCst)
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Makes the next directory search park until [`release_search`] is
    /// called, to reproduce a stale in-flight response deterministically.
    pub fn hold_next_search(&self) {
        self.hold_next_search.store(true, Ordering::SeqCst);
    }

    pub async fn wait_until_held(&self) {
        self.held.notified().await;
    }

    pub fn release_search(&self) {
        self.release.notify_one();
    }

    fn failing(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn find_known_edges(&self, viewer: &UserId) -> Result<Vec<FriendEdge>, StoreError> {
        self.failing(&self.fail_queries)?;
        Ok(self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|edge| edge.sender_id == *viewer || edge.receiver_id == *viewer)
            .cloned()
            .collect())
    }

    async fn find_directory_matches(&self, term: &str) -> Result<Vec<ProfileRecord>, StoreError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_next_search.swap(false, Ordering::SeqCst) {
            self.held.notify_one();
            self.release.notified().await;
        }
        self.failing(&self.fail_queries)?;
        let needle = term.to_lowercase();
        Ok(self
            .directory
            .lock()
            .unwrap()
            .iter()
            .filter(|record| {
                record.user_email.to_lowercase().contains(&needle)
                    || record.hotel_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn upsert_edge(&self, edge: &FriendEdge) -> Result<(), StoreError> {
        self.failing(&self.fail_upserts)?;
        let mut edges = self.edges.lock().unwrap();
        if let Some(existing) = edges
            .iter_mut()
            .find(|e| e.sender_id == edge.sender_id && e.receiver_id == edge.receiver_id)
        {
            *existing = edge.clone();
        } else {
            edges.push(edge.clone());
        }
        Ok(())
    }

    async fn fetch_profile(&self, id: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        self.failing(&self.fail_queries)?;
        Ok(self
            .directory
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == *id)
            .cloned())
    }

    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StoreError> {
        self.failing(&self.fail_upserts)?;
        let mut directory = self.directory.lock().unwrap();
        if let Some(existing) = directory.iter_mut().find(|r| r.id == record.id) {
            *existing = record.clone();
        } else {
            directory.push(record.clone());
        }
        Ok(())
    }
}
