//! Conversation loader library.
//!
//! Rebuilds the conversation around a single status (its ancestors and
//! replies) on top of several microblog backends with different APIs.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod backend;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod filter;
pub mod models;

pub use conversation::ConversationLoader;
pub use error::{BackendError, ConversationError};
