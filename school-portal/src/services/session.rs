//! The logged-in user's resolved role, held in the HTTP session.

use chrono::{DateTime, Utc};
use school_core::error::AppError;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::{Identity, RoleAssignment};
use crate::services::access::Capabilities;
use crate::services::{RoleResolver, RosterError};

const SESSION_KEY: &str = "user_session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub identity: Identity,
    pub assignment: RoleAssignment,
    pub resolved_at: DateTime<Utc>,
}

impl UserSession {
    /// Resolve the identity's role for a fresh login.
    pub async fn establish(resolver: &RoleResolver, identity: Identity) -> Result<Self, RosterError> {
        let assignment = resolver.resolve_role(identity.email()).await?;
        Ok(Self {
            identity,
            assignment,
            resolved_at: Utc::now(),
        })
    }

    /// Re-resolve after roster changes. On failure the previous assignment
    /// is kept.
    pub async fn refresh(&mut self, resolver: &RoleResolver) -> Result<(), RosterError> {
        self.assignment = resolver.resolve_role(self.identity.email()).await?;
        self.resolved_at = Utc::now();
        Ok(())
    }

    /// Messaging id; `None` for unrecognised accounts.
    pub fn user_id(&self) -> Option<String> {
        self.assignment.user_id(&self.identity)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(&self.assignment)
    }

    pub async fn load(session: &Session) -> Result<Option<Self>, AppError> {
        session
            .get::<UserSession>(SESSION_KEY)
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
    }

    pub async fn store(&self, session: &Session) -> Result<(), AppError> {
        session
            .insert(SESSION_KEY, self)
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
    }

    /// Drop everything held for this browser session, store entry included.
    pub async fn discard(session: &Session) -> Result<(), AppError> {
        session
            .flush()
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
    }
}
