use lobby_common::{Identity, Notification, ProfileRecord};
use lobby_store::DirectoryStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaveOutcome {
    /// Empty name after trimming; nothing written.
    NameRequired,
    /// Same name as currently loaded; nothing written.
    Unchanged,
    Saved,
    /// The upsert failed. Logged; nothing changed locally.
    Failed,
}

/// Loads and edits the viewer's hotel name. The current name is published
/// through a watch channel the presentation layer renders from.
pub struct ProfileEditor {
    session: Identity,
    store: Arc<dyn DirectoryStore>,
    current: watch::Sender<String>,
    notify: mpsc::UnboundedSender<Notification>,
}

impl ProfileEditor {
    pub fn new(
        session: Identity,
        store: Arc<dyn DirectoryStore>,
    ) -> (
        Self,
        watch::Receiver<String>,
        mpsc::UnboundedReceiver<Notification>,
    ) {
        let (current, current_rx) = watch::channel(String::new());
        let (notify, notify_rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                store,
                current,
                notify,
            },
            current_rx,
            notify_rx,
        )
    }

    /// Fetches the viewer's directory row, if any. A missing row just means
    /// the hotel name was never set; store failures are logged and the
    /// field stays as it was.
    pub async fn load(&self) {
        match self.store.fetch_profile(&self.session.id).await {
            Ok(Some(record)) => {
                self.current.send_replace(record.hotel_name);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::error!(%error, "failed to load profile");
            }
        }
    }

    pub async fn save(&self, name: &str) -> SaveOutcome {
        let name = name.trim();
        if name.is_empty() {
            self.push(Notification::warning("Enter a hotel name."));
            return SaveOutcome::NameRequired;
        }
        if *self.current.borrow() == name {
            self.push(Notification::warning("The hotel name was not changed."));
            return SaveOutcome::Unchanged;
        }

        let record = ProfileRecord {
            id: self.session.id.clone(),
            user_id: self.session.id.clone(),
            user_email: self.session.email.clone(),
            hotel_name: name.to_string(),
        };
        match self.store.upsert_profile(&record).await {
            Ok(()) => {
                self.current.send_replace(name.to_string());
                self.push(Notification::success("Hotel name saved."));
                SaveOutcome::Saved
            }
            Err(error) => {
                tracing::error!(%error, "failed to save profile");
                SaveOutcome::Failed
            }
        }
    }

    fn push(&self, notification: Notification) {
        let _ = self.notify.send(notification);
    }
}
