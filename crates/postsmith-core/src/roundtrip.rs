//! Save-generation round-trips.
//!
//! Persists one prompt/output exchange as a conversation turn: resolves the
//! requesting user, finds or creates the owning conversation, and appends the
//! user and assistant messages in order.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Database, NewConversation, NewGenerationRecord, NewMessage};
use crate::error::{Error, Result};
use crate::models::{Conversation, ConversationType, Message, ParticipantRole, SenderType, User};

/// Maximum number of characters of the prompt used as a conversation title.
const TITLE_MAX_CHARS: usize = 50;

/// Generation settings carried alongside both messages of a round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMeta {
    pub platform: String,
    pub tone: String,
    pub length: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

/// Input for persisting one prompt/output exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveGeneration {
    pub external_user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub user_message: String,
    pub assistant_message: String,
    pub meta: GenerationMeta,
}

/// Result of a saved round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct SavedRoundTrip {
    pub conversation: Conversation,
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Persist a prompt/output exchange against a conversation.
///
/// Resolves the user by external id (creating them on first contact), then
/// either verifies the target conversation belongs to that user or creates a
/// new one titled from the prompt. The user message is appended before the
/// assistant message so readers see them in exchange order. Recording the
/// generation history entry is best-effort: a failure there is logged and
/// does not fail the save.
pub async fn save_round_trip(db: &Database, params: SaveGeneration) -> Result<SavedRoundTrip> {
    if params.user_message.trim().is_empty() {
        return Err(Error::Validation("user_message must not be empty".into()));
    }
    if params.assistant_message.trim().is_empty() {
        return Err(Error::Validation(
            "assistant_message must not be empty".into(),
        ));
    }

    let user = resolve_user(db, &params).await?;
    let meta_value = serde_json::to_value(&params.meta)?;

    let conversation = match params.conversation_id {
        Some(id) => {
            let existing = db.get_conversation(id, user.id).await?;
            match existing {
                Some(found) => found.conversation,
                None => return Err(Error::NotFound(format!("conversation '{id}'"))),
            }
        }
        None => {
            let created = db
                .create_conversation(NewConversation {
                    owner_id: user.id,
                    title: truncate_title(&params.user_message),
                    kind: ConversationType::Generation,
                    meta: meta_value.clone(),
                })
                .await?;
            db.add_participant(created.id, user.id, ParticipantRole::Owner)
                .await?;
            created
        }
    };

    let user_message = db
        .add_message(NewMessage {
            conversation_id: conversation.id,
            sender: SenderType::User,
            sender_user_id: Some(user.id),
            content: params.user_message.clone(),
            content_json: Some(meta_value.clone()),
        })
        .await?;

    let assistant_message = db
        .add_message(NewMessage {
            conversation_id: conversation.id,
            sender: SenderType::Assistant,
            sender_user_id: None,
            content: params.assistant_message.clone(),
            content_json: Some(meta_value),
        })
        .await?;

    let record = NewGenerationRecord {
        user_id: user.id,
        subject: params.user_message,
        content: params.assistant_message,
        platform: params.meta.platform.clone(),
        tone: params.meta.tone.clone(),
        length: params.meta.length.clone(),
        audience: params.meta.audience.clone(),
        metadata: serde_json::json!({ "conversation_id": conversation.id }),
    };
    if let Err(err) = db.record_generation(record).await {
        tracing::warn!(
            "failed to record generation history for user {}: {err}",
            user.id
        );
    }

    Ok(SavedRoundTrip {
        conversation,
        user_message,
        assistant_message,
    })
}

/// Look up the user by external id, creating them on first contact.
async fn resolve_user(db: &Database, params: &SaveGeneration) -> Result<User> {
    if let Some(existing) = db.get_user_by_external_id(&params.external_user_id).await? {
        return Ok(existing);
    }

    let user = User {
        id: Uuid::new_v4(),
        external_id: params.external_user_id.clone(),
        display_name: params.display_name.clone(),
        email: params.email.clone(),
        avatar_url: None,
        created_at: Utc::now(),
        updated_at: None,
        deleted_at: None,
    };
    db.upsert_user(&user).await?;
    Ok(user)
}

/// Derive a conversation title from the opening prompt.
fn truncate_title(subject: &str) -> String {
    let trimmed = subject.trim();
    let title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    title.trim_end().to_string()
}

#[cfg(test)]
#[path = "roundtrip_tests.rs"]
mod tests;
