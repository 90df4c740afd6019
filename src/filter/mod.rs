//! Status filtering.
//!
//! The conversation loader never filters on its own; whatever consumes its
//! results passes them through a [`StatusFilter`] before showing them.

mod rules;

use std::sync::Arc;

use tracing::debug;

use crate::models::{ConversationResult, Status};

pub use rules::{FilterRules, FilterRulesError, RuleStatusFilter};

/// Rule kinds a single check should skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterFlags {
    pub skip_users: bool,
    pub skip_keywords: bool,
    pub skip_sources: bool,
    pub skip_links: bool,
}

/// Decides whether a status is hidden.
///
/// Implementations may block (e.g. on a rule store), so async callers should
/// run them on a blocking thread as [`filter_conversation`] does.
pub trait StatusFilter: Send + Sync {
    fn is_filtered(&self, status: &Status, flags: FilterFlags) -> bool;
}

/// Filter that lets every status through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl StatusFilter for NoFilter {
    fn is_filtered(&self, _status: &Status, _flags: FilterFlags) -> bool {
        false
    }
}

/// Remove filtered statuses from a conversation, keeping its cursor and flags.
///
/// # Errors
///
/// Returns an error if the blocking filter task panics.
pub async fn filter_conversation(
    result: ConversationResult,
    filter: Arc<dyn StatusFilter>,
    flags: FilterFlags,
) -> Result<ConversationResult, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || {
        let before = result.statuses.len();
        let statuses: Vec<Status> = result
            .statuses
            .into_iter()
            .filter(|status| !filter.is_filtered(status, flags))
            .collect();
        debug!(removed = before - statuses.len(), "Filtered conversation");
        ConversationResult {
            statuses,
            ..result
        }
    })
    .await
}
