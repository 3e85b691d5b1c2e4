//! Domain models for conversation and generation-history entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application user, keyed internally by UUID and externally by the
/// identity provider's subject id. Materialized lazily on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A conversation: a titled thread of messages owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub kind: ConversationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_message_at: DateTime<Utc>,
    pub meta: serde_json::Value,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Conversation kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationType {
    #[default]
    Generation,
    Chat,
    Voice,
}

impl std::fmt::Display for ConversationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationType::Generation => write!(f, "GENERATION"),
            ConversationType::Chat => write!(f, "CHAT"),
            ConversationType::Voice => write!(f, "VOICE"),
        }
    }
}

impl From<&str> for ConversationType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CHAT" => ConversationType::Chat,
            "VOICE" => ConversationType::Voice,
            _ => ConversationType::Generation,
        }
    }
}

/// A message within a conversation. `sender_user_id` is `None` for
/// assistant and system turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: SenderType,
    pub sender_user_id: Option<Uuid>,
    pub content: String,
    pub content_json: Option<serde_json::Value>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Who authored a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SenderType {
    User,
    Assistant,
    System,
    External,
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderType::User => write!(f, "USER"),
            SenderType::Assistant => write!(f, "ASSISTANT"),
            SenderType::System => write!(f, "SYSTEM"),
            SenderType::External => write!(f, "EXTERNAL"),
        }
    }
}

impl From<&str> for SenderType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "USER" => SenderType::User,
            "ASSISTANT" => SenderType::Assistant,
            "SYSTEM" => SenderType::System,
            _ => SenderType::External,
        }
    }
}

/// A user's membership in a conversation, with display fields joined from
/// the users table for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub role: ParticipantRole,
    pub added_at: DateTime<Utc>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Participant roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Owner,
    Member,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Owner => write!(f, "owner"),
            ParticipantRole::Member => write!(f, "member"),
        }
    }
}

impl From<&str> for ParticipantRole {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "owner" => ParticipantRole::Owner,
            _ => ParticipantRole::Member,
        }
    }
}

/// One row of the generation audit log, independent of any conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub content: String,
    pub platform: String,
    pub tone: String,
    pub length: String,
    pub audience: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Conversation with all its non-deleted messages (for full retrieval).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
