use axum::{extract::State, response::IntoResponse, Json};
use school_core::error::AppError;

use crate::middleware::RecognizedUser;
use crate::AppState;

pub async fn dashboard_handler(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = state
        .school
        .dashboard_for(&user, super::today())
        .await?
        .ok_or_else(|| AppError::UnrecognizedAccount(user.identity.email().to_string()))?;

    Ok(Json(dashboard))
}
