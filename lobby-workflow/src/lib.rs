//! Request/response orchestration over the remote store: the friend
//! directory (search, filter, request) and the profile editor. Both publish
//! their observable state through `tokio::sync::watch` and user-facing
//! signals through an unbounded notification channel, so any presentation
//! layer can subscribe without the workflows knowing about it.

pub mod directory;
pub mod profile;

#[cfg(test)]
pub(crate) mod testing;

pub use directory::{DirectoryState, FriendDirectory, SearchOutcome};
pub use profile::{ProfileEditor, SaveOutcome};
