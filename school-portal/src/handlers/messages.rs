use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use school_core::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::RecognizedUser;
use crate::models::NewMessage;
use crate::services::access::can_message;
use crate::services::school::{DEFAULT_CONVERSATION_LIMIT, DEFAULT_MESSAGE_LIMIT};
use crate::services::UserSession;
use crate::AppState;

fn messaging_id(user: &UserSession) -> Result<String, AppError> {
    user.user_id()
        .ok_or_else(|| AppError::UnrecognizedAccount(user.identity.email().to_string()))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;
    let conversations = state.school.conversations(&me).await?;
    Ok(Json(conversations))
}

#[derive(Debug, Deserialize)]
pub struct RecentMessagesParams {
    pub limit: Option<usize>,
}

/// The user's messages in both directions, newest first.
pub async fn recent_messages(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Query(params): Query<RecentMessagesParams>,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;
    let limit = params.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
    let messages = state.school.messages_for_user(&me, limit).await?;
    Ok(Json(messages))
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub unread: usize,
}

pub async fn unread_messages(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;
    let unread = state.school.unread_count(&me).await?;
    Ok(Json(UnreadResponse { unread }))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Path(participant): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;
    let messages = state
        .school
        .conversation(&me, &participant, DEFAULT_CONVERSATION_LIMIT)
        .await?;
    Ok(Json(messages))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;
    let contacts = state.school.contacts(&user.assignment, &me).await?;
    Ok(Json(contacts))
}

/// The recipient's role comes from the rosters. A `receiver_role` sent by the
/// client must agree with it.
pub async fn send_message(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Json(payload): Json<NewMessage>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let recipient_role = state
        .resolver
        .role_of_user_id(&payload.receiver_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow!("Recipient {} not found", payload.receiver_id))
        })?;

    if !can_message(&user.assignment, recipient_role) {
        return Err(AppError::Forbidden(anyhow!(
            "Cannot send messages to a {}",
            recipient_role
        )));
    }

    if let Some(claimed) = payload.receiver_role {
        if claimed != recipient_role {
            return Err(AppError::BadRequest(anyhow!(
                "Recipient {} is a {}, not a {}",
                payload.receiver_id,
                recipient_role,
                claimed
            )));
        }
    }

    let me = messaging_id(&user)?;
    let message = state.school.roster().add_message(&me, &payload).await?;

    tracing::info!(message_id = %message.id, "Message sent");
    Ok((StatusCode::CREATED, Json(message)))
}

/// Only the receiver may mark a message read.
pub async fn mark_message_read(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let me = messaging_id(&user)?;

    let message = state
        .school
        .roster()
        .messages()
        .await?
        .into_iter()
        .find(|m| m.id == message_id)
        .ok_or_else(|| AppError::NotFound(anyhow!("Message {} not found", message_id)))?;

    if message.receiver_id != me {
        return Err(AppError::Forbidden(anyhow!(
            "Message {} was not sent to you",
            message_id
        )));
    }

    state.school.roster().mark_message_read(&message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
