use anyhow::anyhow;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use school_core::error::AppError;
use tower_sessions::Session;

use crate::services::access::can_access_admin_area;
use crate::services::UserSession;

/// Any logged-in user, recognised or not.
pub struct CurrentUser(pub UserSession);

/// A user whose email matched the allow-list or a roster.
pub struct RecognizedUser(pub UserSession);

/// An admin or teacher.
pub struct StaffUser(pub UserSession);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalError(anyhow!(msg)))?;

        let user = UserSession::load(&session)
            .await?
            .ok_or_else(|| AppError::Unauthorized(anyhow!("No active session")))?;

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RecognizedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.assignment.is_recognized() {
            return Err(AppError::UnrecognizedAccount(user.identity.email().to_string()));
        }

        Ok(RecognizedUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RecognizedUser(user) = RecognizedUser::from_request_parts(parts, state).await?;

        if !can_access_admin_area(&user.assignment) {
            tracing::warn!(role = ?user.assignment.kind(), "Staff area denied");
            return Err(AppError::Forbidden(anyhow!("Staff area is restricted")));
        }

        Ok(StaffUser(user))
    }
}
