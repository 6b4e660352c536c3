pub mod query;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The authenticated viewer, as handed out by the identity provider.
/// Acquired once at sign-in and passed explicitly into every workflow.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
}

/// A searchable account as shown to the viewer: one row of the directory
/// mapped down to the three fields the candidate list renders.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct DirectoryEntry {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Directional relationship row in the `friends` table. `status` is false
/// while the request is pending and true once accepted. The natural key is
/// the (senderId, receiverId) pair; upserting the same pair updates in place.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendEdge {
    pub sender_id: UserId,
    pub sender_name: String,
    pub receiver_id: UserId,
    pub receiver_name: String,
    pub status: bool,
}

impl FriendEdge {
    /// The display name of whichever party is not the viewer.
    pub fn other_party(&self, viewer: &UserId) -> &str {
        if self.sender_id == *viewer {
            &self.receiver_name
        } else {
            &self.sender_name
        }
    }
}

/// One row of the `userInfo` table, exactly as the profile workflow
/// writes it back.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: UserId,
    pub user_id: UserId,
    pub user_email: String,
    pub hotel_name: String,
}

impl ProfileRecord {
    pub fn into_entry(self) -> DirectoryEntry {
        DirectoryEntry {
            id: self.id,
            name: self.hotel_name,
            email: self.user_email,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// User-facing signal emitted by the workflows. The presentation layer
/// decides how to surface it (toasts, in the shipped app).
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_party_picks_the_non_viewer_name() {
        let edge = FriendEdge {
            sender_id: UserId::new("u1"),
            sender_name: "a@x.com".into(),
            receiver_id: UserId::new("u2"),
            receiver_name: "Lotus Inn".into(),
            status: false,
        };
        assert_eq!(edge.other_party(&UserId::new("u1")), "Lotus Inn");
        assert_eq!(edge.other_party(&UserId::new("u2")), "a@x.com");
    }

    #[test]
    fn friend_edge_uses_wire_column_names() {
        let edge = FriendEdge {
            sender_id: UserId::new("u1"),
            sender_name: "a@x.com".into(),
            receiver_id: UserId::new("u2"),
            receiver_name: "Lotus Inn".into(),
            status: false,
        };
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["senderId"], "u1");
        assert_eq!(value["receiverName"], "Lotus Inn");
        assert_eq!(value["status"], false);
    }

    #[test]
    fn profile_record_maps_to_directory_entry() {
        let record = ProfileRecord {
            id: UserId::new("u2"),
            user_id: UserId::new("u2"),
            user_email: "b@x.com".into(),
            hotel_name: "Lotus Inn".into(),
        };
        let entry = record.into_entry();
        assert_eq!(entry.name, "Lotus Inn");
        assert_eq!(entry.email, "b@x.com");
    }
}
