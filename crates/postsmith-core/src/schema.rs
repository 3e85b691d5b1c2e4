//! Database schema for postsmith.

/// SQL schema, applied idempotently at startup. Timestamps are stored as
/// epoch milliseconds; UUIDs as TEXT.
pub const SCHEMA: &str = r#"
-- Application users, keyed internally by UUID and externally by the
-- identity provider's subject id. Soft-deleted, never removed.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    display_name TEXT,
    email TEXT,
    avatar_url TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    deleted_at INTEGER
);

-- Conversation threads. Every conversation has exactly one owner.
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'GENERATION',
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    last_message_at INTEGER NOT NULL,
    meta JSON NOT NULL DEFAULT '{}',
    archived_at INTEGER,
    deleted_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_conversations_owner
    ON conversations(owner_id, last_message_at DESC);

-- Message turns. sender_user_id is NULL for assistant/system turns.
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    sender TEXT NOT NULL,
    sender_user_id TEXT REFERENCES users(id),
    content TEXT NOT NULL,
    content_json JSON,
    edited INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    deleted_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages(conversation_id, created_at);

-- Membership roles, one row per (conversation, user) pair.
CREATE TABLE IF NOT EXISTS conversation_participants (
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id),
    role TEXT NOT NULL DEFAULT 'member',
    added_at INTEGER NOT NULL,
    PRIMARY KEY (conversation_id, user_id)
);

-- Flat audit log of generation calls, independent of conversations.
CREATE TABLE IF NOT EXISTS generation_history (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    content TEXT NOT NULL,
    platform TEXT NOT NULL,
    tone TEXT NOT NULL,
    length TEXT NOT NULL,
    audience TEXT,
    metadata JSON NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_generation_history_user
    ON generation_history(user_id, created_at DESC);

CREATE INDEX IF NOT EXISTS idx_generation_history_platform
    ON generation_history(platform, created_at DESC);
"#;
