//! Conversation reconstruction for backends without a full-conversation API.
//!
//! Ancestors are found by walking the in-reply-to chain one status at a time.
//! Replies have no general API; on Twitter they are scraped from the web
//! status page on first load, elsewhere they are not loaded.

use tracing::{debug, warn};

use super::web_replies::load_web_replies;
use crate::backend::{MicroBlog, TwitterWeb};
use crate::constants::MAX_ANCESTOR_DEPTH;
use crate::error::BackendError;
use crate::models::{PaginationCursor, Status};

/// Load ancestors and, where possible, replies of `status`, ancestors first.
///
/// `web` is only given for Twitter, whose status pages list replies.
///
/// # Errors
///
/// Returns an error if fetching an ancestor fails. Reply scraping failures
/// are logged and leave the reply set empty.
pub async fn show_conversation_compat<A>(
    api: &A,
    web: Option<&dyn TwitterWeb>,
    status: &Status,
    cursor: Option<&PaginationCursor>,
    load_replies: bool,
) -> Result<Vec<Status>, BackendError>
where
    A: MicroBlog + ?Sized,
{
    let default_cursor = PaginationCursor::default();
    let cursor = cursor.unwrap_or(&default_cursor);
    let first_load = cursor.is_first_load();

    let mut statuses = Vec::new();

    let older_unseen = cursor.max_id.is_some() && cursor.max_sort_id_or_default() < status.sort_id;
    if older_unseen || first_load {
        let start = cursor
            .max_id
            .clone()
            .or_else(|| status.in_reply_to_status_id.clone());
        statuses.extend(walk_ancestors(api, start).await?);
    }

    let newer_unseen =
        cursor.since_id.is_some() && cursor.since_sort_id_or_default() > status.sort_id;
    if load_replies || first_load || newer_unseen {
        let mut replies_loaded = false;
        if let Some(web) = web {
            if first_load {
                match load_web_replies(api, web, status).await {
                    Ok(replies) => {
                        statuses.extend(replies);
                        replies_loaded = true;
                    }
                    Err(e) => {
                        warn!(status_id = %status.id, error = %e, "Failed to load replies from status page");
                    }
                }
            } else {
                replies_loaded = true;
            }
        }
        if !replies_loaded {
            // Mention search used to fill in replies here; it stays disabled.
            debug!(status_id = %status.id, "Replies not loaded for this conversation");
        }
    }

    Ok(statuses)
}

/// Follow the in-reply-to chain from `start`, fetching at most
/// [`MAX_ANCESTOR_DEPTH`] statuses.
async fn walk_ancestors<A>(api: &A, start: Option<String>) -> Result<Vec<Status>, BackendError>
where
    A: MicroBlog + ?Sized,
{
    let mut ancestors = Vec::new();
    let mut next_id = start;

    while let Some(id) = next_id {
        if ancestors.len() >= MAX_ANCESTOR_DEPTH {
            debug!(depth = ancestors.len(), "Ancestor walk reached depth limit");
            break;
        }
        let item = api.show_status(&id).await?;
        next_id = item.in_reply_to_status_id.clone();
        ancestors.push(item);
    }

    Ok(ancestors)
}
