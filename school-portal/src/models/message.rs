use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::RoleKind;
use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub date: DateTime<Utc>,
    pub content: Option<String>,
    pub read: bool,
    pub kind: Option<String>,
}

impl MessageRecord {
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    pub fn is_unread_for(&self, user_id: &str) -> bool {
        self.receiver_id == user_id && !self.read
    }

    /// The participant on the other side from `user_id`.
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.sender_id == user_id {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

impl FromSheetRow for MessageRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            id: row.required("ID")?,
            sender_id: row.required("SenderID")?,
            receiver_id: row.required("ReceiverID")?,
            date: row.required_timestamp("Date")?,
            content: row.optional("Content"),
            read: row.flag("Read"),
            kind: row.optional("Type"),
        })
    }
}

/// A message a user wants to send.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub receiver_id: String,
    /// What the client thinks the recipient is. Checked against the rosters,
    /// never trusted.
    #[serde(default)]
    pub receiver_role: Option<RoleKind>,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub content: String,
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "message".to_string()
}
