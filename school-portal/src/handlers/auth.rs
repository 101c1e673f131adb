use anyhow::anyhow;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use school_core::error::AppError;
use serde::Serialize;
use tower_sessions::Session;

use crate::middleware::CurrentUser;
use crate::models::{Identity, RoleAssignment, RoleKind};
use crate::services::access::Capabilities;
use crate::services::UserSession;
use crate::AppState;

/// Headers set by the authenticating proxy in front of the portal.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub platform_user_id: String,
    pub role: Option<RoleKind>,
    /// Id used as sender/receiver in messages.
    pub user_id: Option<String>,
    pub assignment: RoleAssignment,
    pub capabilities: Capabilities,
    pub resolved_at: DateTime<Utc>,
}

impl From<&UserSession> for MeResponse {
    fn from(user: &UserSession) -> Self {
        Self {
            email: user.identity.email().to_string(),
            platform_user_id: user.identity.user_id().to_string(),
            role: user.assignment.kind(),
            user_id: user.user_id(),
            assignment: user.assignment.clone(),
            capabilities: user.capabilities(),
            resolved_at: user.resolved_at,
        }
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// The identity the authentication platform vouched for. The platform id
/// falls back to the email when the header is absent.
fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, AppError> {
    let email = header_text(headers, USER_EMAIL_HEADER).unwrap_or_default();
    let user_id = header_text(headers, USER_ID_HEADER)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(email.trim());

    Identity::new(email, user_id)
        .ok_or_else(|| AppError::Unauthorized(anyhow!("No authenticated identity on request")))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let identity = identity_from_headers(&headers)?;
    let user = UserSession::establish(&state.resolver, identity).await?;

    // New id for the authenticated session; any earlier one is dropped.
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;
    user.store(&session).await?;

    if !user.assignment.is_recognized() {
        tracing::warn!(email = %user.identity.email(), "Login by unrecognized account");
        return Err(AppError::UnrecognizedAccount(
            user.identity.email().to_string(),
        ));
    }

    tracing::info!(
        email = %user.identity.email(),
        role = ?user.assignment.kind(),
        "User logged in successfully"
    );

    Ok(Json(MeResponse::from(&user)))
}

/// Re-resolve the role after roster changes. A failed lookup leaves the
/// stored session untouched.
pub async fn refresh_handler(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(mut user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.refresh(&state.resolver).await?;
    user.store(&session).await?;

    tracing::info!(
        email = %user.identity.email(),
        role = ?user.assignment.kind(),
        "Session role refreshed"
    );

    Ok(Json(MeResponse::from(&user)))
}

pub async fn logout_handler(session: Session) -> Result<impl IntoResponse, AppError> {
    UserSession::discard(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(MeResponse::from(&user))
}
