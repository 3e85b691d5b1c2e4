//! postsmith-core: Conversation persistence for generated content
//!
//! This crate provides the core functionality for storing users,
//! conversations, messages, and generation history produced by the
//! content generator, plus the client that talks to the generator itself.

pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod models;
pub mod roundtrip;
pub mod schema;

pub use config::Config;
pub use db::Database;
pub use error::Error;
pub use error::Result;
pub use generator::GeneratorClient;

/// Application name used for config directories and paths.
pub const APP_NAME: &str = "postsmith";

/// Returns the environment variable prefix for this application.
pub fn env_prefix() -> String {
    "POSTSMITH".to_string()
}
