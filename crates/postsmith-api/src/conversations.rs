//! Conversation and message handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use postsmith_core::db::{
    ListConversationsOptions, ListMessagesOptions, UpdateConversation, UpdateMessage,
};
use postsmith_core::models::{
    ConversationType, ConversationWithMessages, Message, Participant, ParticipantRole,
};

use crate::AppState;
use crate::error::ApiError;
use crate::identity::{Identity, lookup_user};

fn conversation_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("conversation '{id}'"))
}

fn message_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("message '{id}'"))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ConversationWithMessages>>, ApiError> {
    let kind = match params.kind.as_deref() {
        None => None,
        Some(raw) => match raw.to_uppercase().as_str() {
            "GENERATION" => Some(ConversationType::Generation),
            "CHAT" => Some(ConversationType::Chat),
            "VOICE" => Some(ConversationType::Voice),
            _ => {
                return Err(ApiError::Validation(format!(
                    "unknown conversation type '{raw}'"
                )));
            }
        },
    };

    // A caller with no user row has no conversations, not an error
    let Some(user) = lookup_user(&state, &identity).await? else {
        return Ok(Json(Vec::new()));
    };

    let convs = state
        .db
        .list_conversations(
            user.id,
            ListConversationsOptions {
                kind,
                limit: params.limit,
            },
        )
        .await?;
    Ok(Json(convs))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationWithMessages>, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    let conv = state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    Ok(Json(conv))
}

#[derive(Debug, Deserialize)]
pub struct UpdateConversationBody {
    pub title: Option<String>,
    pub meta: Option<serde_json::Value>,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConversationBody>,
) -> Result<Json<ConversationWithMessages>, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;

    state
        .db
        .update_conversation(
            id,
            UpdateConversation {
                title: body.title,
                last_message_at: None,
                meta: body.meta,
            },
        )
        .await?;

    let conv = state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    Ok(Json(conv))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state.db.soft_delete_conversation(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn archive(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state.db.archive_conversation(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;

    let messages = state
        .db
        .list_messages(
            id,
            ListMessagesOptions {
                limit: params.limit,
                offset: params.offset,
            },
        )
        .await?;
    Ok(Json(messages))
}

pub async fn participants(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;

    let participants = state.db.list_participants(id).await?;
    Ok(Json(participants))
}

#[derive(Debug, Deserialize)]
pub struct AddParticipantBody {
    pub user_id: Uuid,
    pub role: Option<ParticipantRole>,
}

pub async fn add_participant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddParticipantBody>,
) -> Result<StatusCode, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;

    state
        .db
        .get_user(body.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user '{}'", body.user_id)))?;

    state
        .db
        .add_participant(id, body.user_id, body.role.unwrap_or(ParticipantRole::Member))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_participant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;
    state
        .db
        .get_conversation(id, user.id)
        .await?
        .ok_or_else(|| conversation_not_found(id))?;

    state.db.remove_participant(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageBody {
    pub content: Option<String>,
    pub content_json: Option<serde_json::Value>,
}

pub async fn update_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMessageBody>,
) -> Result<Json<Message>, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    let msg = state
        .db
        .get_message(id)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    // Ownership runs through the parent conversation
    state
        .db
        .get_conversation(msg.conversation_id, user.id)
        .await?
        .ok_or_else(|| message_not_found(id))?;

    state
        .db
        .update_message(
            id,
            UpdateMessage {
                content: body.content,
                content_json: body.content_json,
                edited: Some(true),
            },
        )
        .await?;

    let updated = state
        .db
        .get_message(id)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    Ok(Json(updated))
}

pub async fn remove_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user = lookup_user(&state, &identity)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    let msg = state
        .db
        .get_message(id)
        .await?
        .ok_or_else(|| message_not_found(id))?;
    state
        .db
        .get_conversation(msg.conversation_id, user.id)
        .await?
        .ok_or_else(|| message_not_found(id))?;

    state.db.soft_delete_message(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
