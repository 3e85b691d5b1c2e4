//! Database operations for postsmith.

use crate::error::{Error, Result};
use crate::models::*;
use crate::schema::SCHEMA;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Database handle for postsmith.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    pub async fn open(path: &Path) -> Result<Self> {
        let parent = path.parent().unwrap_or(Path::new("."));
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    /// Initialize schema.
    async fn init(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        self.ensure_conversations_archived_at_column().await?;
        Ok(())
    }

    // Databases created before the archive feature lack the column.
    async fn ensure_conversations_archived_at_column(&self) -> Result<()> {
        let rows = sqlx::query("PRAGMA table_info(conversations)")
            .fetch_all(&self.pool)
            .await?;

        let has_archived_at = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .any(|name| name == "archived_at");

        if !has_archived_at {
            sqlx::query("ALTER TABLE conversations ADD COLUMN archived_at INTEGER")
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database.
    pub async fn close(self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Upsert a user (keyed by internal id; mutable profile fields overwrite).
    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, external_id, display_name, email, avatar_url, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                avatar_url = excluded.avatar_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.external_id)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.avatar_url)
        .bind(user.created_at.timestamp_millis())
        .bind(user.updated_at.map(|dt| dt.timestamp_millis()))
        .bind(user.deleted_at.map(|dt| dt.timestamp_millis()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a user by internal id.
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Get a user by the identity provider's external id.
    pub async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Get user count.
    pub async fn count_users(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // =========================================================================
    // Conversations
    // =========================================================================

    /// Insert a new conversation. `last_message_at` starts at the creation time.
    pub async fn create_conversation(&self, new: NewConversation) -> Result<Conversation> {
        let now = now_millis();
        let conv = Conversation {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            title: new.title,
            kind: new.kind,
            created_at: now,
            updated_at: None,
            last_message_at: now,
            meta: new.meta,
            archived_at: None,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO conversations (id, owner_id, title, kind, created_at, last_message_at, meta)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(conv.id.to_string())
        .bind(conv.owner_id.to_string())
        .bind(&conv.title)
        .bind(conv.kind.to_string())
        .bind(conv.created_at.timestamp_millis())
        .bind(conv.last_message_at.timestamp_millis())
        .bind(conv.meta.to_string())
        .execute(&self.pool)
        .await?;

        Ok(conv)
    }

    /// Get a conversation with its non-deleted messages, scoped to an owner.
    ///
    /// Ownership is part of the lookup predicate: a missing conversation, a
    /// soft-deleted one, and somebody else's all answer `None`.
    pub async fn get_conversation(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<ConversationWithMessages>> {
        let row = sqlx::query(
            "SELECT * FROM conversations WHERE id = ? AND owner_id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let conversation = conversation_from_row(&row);
                let messages = self
                    .list_messages(conversation.id, ListMessagesOptions::default())
                    .await?;
                Ok(Some(ConversationWithMessages {
                    conversation,
                    messages,
                }))
            }
            None => Ok(None),
        }
    }

    /// List an owner's conversations, most recent activity first, each with
    /// its non-deleted messages.
    pub async fn list_conversations(
        &self,
        owner_id: Uuid,
        opts: ListConversationsOptions,
    ) -> Result<Vec<ConversationWithMessages>> {
        let mut sql =
            String::from("SELECT * FROM conversations WHERE owner_id = ? AND deleted_at IS NULL");

        if opts.kind.is_some() {
            sql.push_str(" AND kind = ?");
        }

        sql.push_str(" ORDER BY last_message_at DESC, rowid DESC");

        if let Some(limit) = opts.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut query = sqlx::query(&sql).bind(owner_id.to_string());
        if let Some(ref kind) = opts.kind {
            query = query.bind(kind.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut convs = Vec::new();
        for row in rows {
            let conversation = conversation_from_row(&row);
            let messages = self
                .list_messages(conversation.id, ListMessagesOptions::default())
                .await?;
            convs.push(ConversationWithMessages {
                conversation,
                messages,
            });
        }
        Ok(convs)
    }

    /// Partial update of a conversation; unset fields are preserved.
    pub async fn update_conversation(&self, id: Uuid, update: UpdateConversation) -> Result<()> {
        let mut sql = String::from("UPDATE conversations SET updated_at = ?");

        if update.title.is_some() {
            sql.push_str(", title = ?");
        }
        if update.last_message_at.is_some() {
            sql.push_str(", last_message_at = ?");
        }
        if update.meta.is_some() {
            sql.push_str(", meta = ?");
        }

        sql.push_str(" WHERE id = ? AND deleted_at IS NULL");

        let mut query = sqlx::query(&sql).bind(Utc::now().timestamp_millis());
        if let Some(ref title) = update.title {
            query = query.bind(title);
        }
        if let Some(last_message_at) = update.last_message_at {
            query = query.bind(last_message_at.timestamp_millis());
        }
        if let Some(ref meta) = update.meta {
            query = query.bind(meta.to_string());
        }

        let result = query
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("conversation '{id}'")));
        }
        Ok(())
    }

    /// Soft-delete a conversation, scoped to its owner.
    pub async fn soft_delete_conversation(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE conversations SET deleted_at = ?, updated_at = ?
            WHERE id = ? AND owner_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("conversation '{id}'")));
        }
        Ok(())
    }

    /// Archive a conversation, scoped to its owner.
    pub async fn archive_conversation(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            r#"
            UPDATE conversations SET archived_at = ?, updated_at = ?
            WHERE id = ? AND owner_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("conversation '{id}'")));
        }
        Ok(())
    }

    /// Get conversation count.
    pub async fn count_conversations(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Append a message, then bump the parent conversation's recency.
    ///
    /// The bump is a second independent write; when it fails the appended
    /// message is kept and the failure is only logged.
    pub async fn add_message(&self, new: NewMessage) -> Result<Message> {
        let msg = Message {
            id: Uuid::new_v4(),
            conversation_id: new.conversation_id,
            sender: new.sender,
            sender_user_id: new.sender_user_id,
            content: new.content,
            content_json: new.content_json,
            edited: false,
            created_at: now_millis(),
            updated_at: None,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender, sender_user_id, content, content_json, edited, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(msg.id.to_string())
        .bind(msg.conversation_id.to_string())
        .bind(msg.sender.to_string())
        .bind(msg.sender_user_id.map(|id| id.to_string()))
        .bind(&msg.content)
        .bind(msg.content_json.as_ref().map(ToString::to_string))
        .bind(msg.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let bump = sqlx::query(
            "UPDATE conversations SET last_message_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(msg.created_at.timestamp_millis())
        .bind(msg.created_at.timestamp_millis())
        .bind(msg.conversation_id.to_string())
        .execute(&self.pool)
        .await;

        if let Err(err) = bump {
            tracing::warn!(
                "failed to bump last_message_at for conversation {}: {err}",
                msg.conversation_id
            );
        }

        Ok(msg)
    }

    /// List a conversation's non-deleted messages, oldest first.
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        opts: ListMessagesOptions,
    ) -> Result<Vec<Message>> {
        let mut sql = String::from(
            "SELECT * FROM messages WHERE conversation_id = ? AND deleted_at IS NULL ORDER BY created_at, rowid",
        );

        match (opts.limit, opts.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let rows = sqlx::query(&sql)
            .bind(conversation_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(message_from_row(&row));
        }
        Ok(messages)
    }

    /// Get a non-deleted message by id.
    pub async fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ? AND deleted_at IS NULL")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| message_from_row(&row)))
    }

    /// Partial update of a message. Soft-deleted messages are immutable.
    pub async fn update_message(&self, id: Uuid, update: UpdateMessage) -> Result<()> {
        let mut sql = String::from("UPDATE messages SET updated_at = ?");

        if update.content.is_some() {
            sql.push_str(", content = ?");
        }
        if update.content_json.is_some() {
            sql.push_str(", content_json = ?");
        }
        if update.edited.is_some() {
            sql.push_str(", edited = ?");
        }

        sql.push_str(" WHERE id = ? AND deleted_at IS NULL");

        let mut query = sqlx::query(&sql).bind(Utc::now().timestamp_millis());
        if let Some(ref content) = update.content {
            query = query.bind(content);
        }
        if let Some(ref content_json) = update.content_json {
            query = query.bind(content_json.to_string());
        }
        if let Some(edited) = update.edited {
            query = query.bind(edited);
        }

        let result = query
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("message '{id}'")));
        }
        Ok(())
    }

    /// Soft-delete a message, excluding it from all subsequent reads.
    pub async fn soft_delete_message(&self, id: Uuid) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let result =
            sqlx::query("UPDATE messages SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(now)
                .bind(now)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("message '{id}'")));
        }
        Ok(())
    }

    /// Get message count.
    pub async fn count_messages(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Add a participant; re-adding the same user updates the role in place.
    pub async fn add_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        role: ParticipantRole,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id, role, added_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(conversation_id, user_id) DO UPDATE SET
                role = excluded.role
            "#,
        )
        .bind(conversation_id.to_string())
        .bind(user_id.to_string())
        .bind(role.to_string())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a participant from a conversation.
    pub async fn remove_participant(&self, conversation_id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM conversation_participants WHERE conversation_id = ? AND user_id = ?",
        )
        .bind(conversation_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "participant '{user_id}' in conversation '{conversation_id}'"
            )));
        }
        Ok(())
    }

    /// List a conversation's participants with their user display fields.
    pub async fn list_participants(&self, conversation_id: Uuid) -> Result<Vec<Participant>> {
        let rows = sqlx::query(
            r#"
            SELECT p.conversation_id, p.user_id, p.role, p.added_at,
                   u.display_name, u.email, u.avatar_url
            FROM conversation_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.conversation_id = ?
            ORDER BY p.added_at, p.user_id
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(participant_from_row(&row));
        }
        Ok(participants)
    }

    // =========================================================================
    // Generation history
    // =========================================================================

    /// Append one row to the generation audit log.
    pub async fn record_generation(&self, new: NewGenerationRecord) -> Result<GenerationRecord> {
        let record = GenerationRecord {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            subject: new.subject,
            content: new.content,
            platform: new.platform,
            tone: new.tone,
            length: new.length,
            audience: new.audience,
            metadata: new.metadata,
            created_at: now_millis(),
        };

        sqlx::query(
            r#"
            INSERT INTO generation_history (id, user_id, subject, content, platform, tone, length, audience, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(&record.subject)
        .bind(&record.content)
        .bind(&record.platform)
        .bind(&record.tone)
        .bind(&record.length)
        .bind(&record.audience)
        .bind(record.metadata.to_string())
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// List a user's generation records, newest first.
    pub async fn list_generations_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM generation_history
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::new();
        for row in rows {
            records.push(generation_from_row(&row));
        }
        Ok(records)
    }

    /// List generation records for a platform, newest first.
    pub async fn list_generations_by_platform(
        &self,
        platform: &str,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM generation_history
            WHERE platform = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(platform)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::new();
        for row in rows {
            records.push(generation_from_row(&row));
        }
        Ok(records)
    }
}

/// Fields for a new conversation.
#[derive(Debug)]
pub struct NewConversation {
    pub owner_id: Uuid,
    pub title: String,
    pub kind: ConversationType,
    pub meta: serde_json::Value,
}

/// Options for listing conversations.
#[derive(Debug, Default)]
pub struct ListConversationsOptions {
    pub kind: Option<ConversationType>,
    pub limit: Option<i64>,
}

/// Partial conversation update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateConversation {
    pub title: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub meta: Option<serde_json::Value>,
}

/// Fields for a new message.
#[derive(Debug)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender: SenderType,
    pub sender_user_id: Option<Uuid>,
    pub content: String,
    pub content_json: Option<serde_json::Value>,
}

/// Options for listing messages.
#[derive(Debug, Default)]
pub struct ListMessagesOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Partial message update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateMessage {
    pub content: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub edited: Option<bool>,
}

/// Fields for a new generation audit record.
#[derive(Debug)]
pub struct NewGenerationRecord {
    pub user_id: Uuid,
    pub subject: String,
    pub content: String,
    pub platform: String,
    pub tone: String,
    pub length: String,
    pub audience: Option<String>,
    pub metadata: serde_json::Value,
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: Uuid::parse_str(row.get::<&str, _>("id")).unwrap_or_default(),
        external_id: row.get("external_id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
        created_at: datetime_from_millis(row.get::<i64, _>("created_at")),
        updated_at: opt_datetime_from_millis(row.get("updated_at")),
        deleted_at: opt_datetime_from_millis(row.get("deleted_at")),
    }
}

fn conversation_from_row(row: &sqlx::sqlite::SqliteRow) -> Conversation {
    Conversation {
        id: Uuid::parse_str(row.get::<&str, _>("id")).unwrap_or_default(),
        owner_id: Uuid::parse_str(row.get::<&str, _>("owner_id")).unwrap_or_default(),
        title: row.get("title"),
        kind: ConversationType::from(row.get::<&str, _>("kind")),
        created_at: datetime_from_millis(row.get::<i64, _>("created_at")),
        updated_at: opt_datetime_from_millis(row.get("updated_at")),
        last_message_at: datetime_from_millis(row.get::<i64, _>("last_message_at")),
        meta: row
            .get::<Option<String>, _>("meta")
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        archived_at: opt_datetime_from_millis(row.get("archived_at")),
        deleted_at: opt_datetime_from_millis(row.get("deleted_at")),
    }
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Message {
    Message {
        id: Uuid::parse_str(row.get::<&str, _>("id")).unwrap_or_default(),
        conversation_id: Uuid::parse_str(row.get::<&str, _>("conversation_id")).unwrap_or_default(),
        sender: SenderType::from(row.get::<&str, _>("sender")),
        sender_user_id: row
            .get::<Option<String>, _>("sender_user_id")
            .and_then(|s| Uuid::parse_str(&s).ok()),
        content: row.get("content"),
        content_json: row
            .get::<Option<String>, _>("content_json")
            .and_then(|s| serde_json::from_str(&s).ok()),
        edited: row.get("edited"),
        created_at: datetime_from_millis(row.get::<i64, _>("created_at")),
        updated_at: opt_datetime_from_millis(row.get("updated_at")),
        deleted_at: opt_datetime_from_millis(row.get("deleted_at")),
    }
}

fn participant_from_row(row: &sqlx::sqlite::SqliteRow) -> Participant {
    Participant {
        conversation_id: Uuid::parse_str(row.get::<&str, _>("conversation_id"))
            .unwrap_or_default(),
        user_id: Uuid::parse_str(row.get::<&str, _>("user_id")).unwrap_or_default(),
        role: ParticipantRole::from(row.get::<&str, _>("role")),
        added_at: datetime_from_millis(row.get::<i64, _>("added_at")),
        display_name: row.get("display_name"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
    }
}

fn generation_from_row(row: &sqlx::sqlite::SqliteRow) -> GenerationRecord {
    GenerationRecord {
        id: Uuid::parse_str(row.get::<&str, _>("id")).unwrap_or_default(),
        user_id: Uuid::parse_str(row.get::<&str, _>("user_id")).unwrap_or_default(),
        subject: row.get("subject"),
        content: row.get("content"),
        platform: row.get("platform"),
        tone: row.get("tone"),
        length: row.get("length"),
        audience: row.get("audience"),
        metadata: row
            .get::<Option<String>, _>("metadata")
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        created_at: datetime_from_millis(row.get::<i64, _>("created_at")),
    }
}

// Stored timestamps are epoch milliseconds; returned structs carry the same
// resolution so a value read back compares equal to the one returned.
fn now_millis() -> DateTime<Utc> {
    datetime_from_millis(Utc::now().timestamp_millis())
}

fn datetime_from_millis(ts: i64) -> DateTime<Utc> {
    chrono::DateTime::from_timestamp_millis(ts).unwrap_or_default()
}

fn opt_datetime_from_millis(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(chrono::DateTime::from_timestamp_millis)
}
