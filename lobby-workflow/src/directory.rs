use lobby_common::{DirectoryEntry, FriendEdge, Identity, Notification, ProfileRecord};
use lobby_store::DirectoryStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Observable slice of the friend directory: what the presentation layer
/// renders. Published on every change through the watch channel.
#[derive(Clone, Debug, Default)]
pub struct DirectoryState {
    pub candidates: Vec<DirectoryEntry>,
    /// Display names of everyone already connected to the viewer, in either
    /// direction. Used purely to suppress redundant search results.
    pub known_friends: HashSet<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchOutcome {
    /// Empty query after trimming; no store call was made.
    QueryRequired,
    /// The store itself returned no rows.
    NoRecords,
    /// Rows came back; this many survived the viewer/known-friend filter.
    Candidates(usize),
    /// A newer search started while this one was in flight; its result was
    /// discarded and the state left to the newer search.
    Superseded,
    /// The store call failed. Logged; candidate list left unchanged.
    Unavailable,
}

/// Search accounts, filter out the viewer and existing connections, and
/// submit pending friend requests. One instance per signed-in session; the
/// viewer identity is fixed at construction.
pub struct FriendDirectory {
    session: Identity,
    store: Arc<dyn DirectoryStore>,
    state: watch::Sender<DirectoryState>,
    notify: mpsc::UnboundedSender<Notification>,
    search_seq: AtomicU64,
}

impl FriendDirectory {
    pub fn new(
        session: Identity,
        store: Arc<dyn DirectoryStore>,
    ) -> (
        Self,
        watch::Receiver<DirectoryState>,
        mpsc::UnboundedReceiver<Notification>,
    ) {
        let (state, state_rx) = watch::channel(DirectoryState::default());
        let (notify, notify_rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                store,
                state,
                notify,
                search_seq: AtomicU64::new(0),
            },
            state_rx,
            notify_rx,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    /// Refreshes the known-friend set from every edge touching the viewer.
    /// On store failure the set is left empty: searches then show all
    /// matches rather than blocking the page.
    pub async fn load_known_friends(&self) {
        match self.store.find_known_edges(&self.session.id).await {
            Ok(edges) => {
                let viewer = &self.session.id;
                let known: HashSet<String> = edges
                    .iter()
                    .map(|edge| edge.other_party(viewer).to_string())
                    .collect();
                self.state.send_modify(|state| state.known_friends = known);
            }
            Err(error) => {
                tracing::error!(%error, "failed to load friend edges");
                self.state.send_modify(|state| state.known_friends.clear());
            }
        }
    }

    /// One directory search. Empty queries short-circuit without touching
    /// the store; a result that comes back after a newer search has started
    /// is dropped, so the latest-issued search always wins.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let term = query.trim();
        if term.is_empty() {
            // The cleared list is itself the newest result: invalidate any
            // search still in flight so it cannot repopulate the list.
            self.search_seq.fetch_add(1, Ordering::SeqCst);
            self.push(Notification::error("Enter a hotel name or email to search."));
            self.state.send_modify(|state| state.candidates.clear());
            return SearchOutcome::QueryRequired;
        }

        let token = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let rows = match self.store.find_directory_matches(term).await {
            Ok(rows) => rows,
            Err(error) => {
                tracing::error!(%error, "directory search failed");
                return SearchOutcome::Unavailable;
            }
        };
        if self.search_seq.load(Ordering::SeqCst) != token {
            return SearchOutcome::Superseded;
        }

        if rows.is_empty() {
            self.push(Notification::error(
                "No matching hotels found. Check the spelling and try again.",
            ));
            self.state.send_modify(|state| state.candidates.clear());
            return SearchOutcome::NoRecords;
        }

        let known = self.state.borrow().known_friends.clone();
        let viewer = &self.session.id;
        let candidates: Vec<DirectoryEntry> = rows
            .into_iter()
            .map(ProfileRecord::into_entry)
            .filter(|entry| entry.id != *viewer && !known.contains(&entry.name))
            .collect();
        let found = candidates.len();
        self.state.send_modify(|state| state.candidates = candidates);
        SearchOutcome::Candidates(found)
    }

    /// Upserts a pending edge from the viewer to the candidate. The store's
    /// merge-by-key semantics make a repeat submission an update rather than
    /// a duplicate; no existence check is made here. Returns whether the
    /// request went through.
    pub async fn send_request(&self, candidate: &DirectoryEntry) -> bool {
        let edge = FriendEdge {
            sender_id: self.session.id.clone(),
            sender_name: self.session.email.clone(),
            receiver_id: candidate.id.clone(),
            receiver_name: candidate.name.clone(),
            status: false,
        };
        match self.store.upsert_edge(&edge).await {
            Ok(()) => {
                let name = candidate.name.clone();
                self.state
                    .send_modify(|state| state.candidates.retain(|c| c.name != name));
                self.push(Notification::success(format!(
                    "Friend request sent to {}.",
                    candidate.name
                )));
                true
            }
            Err(error) => {
                tracing::error!(%error, "friend request failed");
                false
            }
        }
    }

    fn push(&self, notification: Notification) {
        // Send only fails when the presentation side is gone; nothing to do.
        let _ = self.notify.send(notification);
    }
}
