use serde::{Deserialize, Serialize};

/// An authenticated principal as reported by the authentication platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    email: String,
    user_id: String,
}

impl Identity {
    /// Returns `None` when the email is blank after trimming.
    pub fn new(email: &str, user_id: impl Into<String>) -> Option<Self> {
        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_string(),
            user_id: user_id.into(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Lookup key: the email, lower-cased.
    pub fn folded_email(&self) -> String {
        self.email.to_lowercase()
    }

    /// Opaque platform user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
