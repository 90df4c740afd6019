//! Conversation reconstruction.
//!
//! Picks a strategy per platform: native thread APIs where the backend has
//! them, the ancestor walk plus reply scraping otherwise.

mod compat;
pub mod web_replies;

use std::sync::Arc;

use tracing::debug;

use crate::backend::{Backend, BackendProvider};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::ConversationError;
use crate::models::{Account, ConversationResult, Page, PaginationCursor, Paging, Status};

pub use compat::show_conversation_compat;

/// Loads the conversation surrounding a status.
///
/// Holds no per-call state; one loader can serve concurrent loads.
#[derive(Clone)]
pub struct ConversationLoader {
    provider: Arc<dyn BackendProvider>,
    page_size: u32,
}

impl ConversationLoader {
    #[must_use]
    pub fn new(provider: Arc<dyn BackendProvider>) -> Self {
        Self {
            provider,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Number of statuses requested from paged conversation endpoints.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Load one page of the conversation around `status`.
    ///
    /// Retweets are resolved to the original status first. `cursor` is the
    /// `next_cursor` of a previous result, or `None` on first load.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::UnsupportedPlatform`] if the account's
    /// platform has no backend, or a backend error if a required request fails.
    pub async fn load(
        &self,
        account: &Account,
        status: &Status,
        cursor: Option<&PaginationCursor>,
        load_replies: bool,
    ) -> Result<ConversationResult, ConversationError> {
        let backend = self.provider.backend_for(account)?;
        let status = status.original();

        debug!(
            account = %account.key,
            platform = %backend.platform(),
            status_id = %status.id,
            first_load = cursor.map_or(true, PaginationCursor::is_first_load),
            "Loading conversation"
        );

        let paging = Paging::from_cursor(cursor, self.page_size);

        match backend {
            Backend::Mastodon(api) => {
                let context = api.status_context(&status.id).await?;
                let mut statuses = context.ancestors;
                statuses.extend(context.descendants);
                Ok(ConversationResult {
                    statuses,
                    next_cursor: None,
                    can_load_all_replies: true,
                })
            }
            Backend::Twitter {
                api,
                official: true,
                ..
            } => {
                let page = api.show_conversation(&status.id, &paging).await?;
                Ok(from_page(page))
            }
            Backend::Twitter { api, web, .. } => {
                let statuses = show_conversation_compat(
                    api.as_ref(),
                    Some(web.as_ref()),
                    &status,
                    cursor,
                    load_replies,
                )
                .await?;
                Ok(ConversationResult {
                    statuses,
                    next_cursor: None,
                    can_load_all_replies: false,
                })
            }
            Backend::StatusNet(api) => {
                if let Some(conversation_id) = &status.extras.statusnet_conversation_id {
                    let page = api.conversation(conversation_id, &paging).await?;
                    return Ok(from_page(page));
                }
                // Without a conversation id only the ancestor walk is left, but
                // the result is still reported as complete.
                debug!(status_id = %status.id, "No StatusNet conversation id, walking ancestors");
                let statuses =
                    show_conversation_compat(api.as_ref(), None, &status, cursor, load_replies)
                        .await?;
                Ok(ConversationResult {
                    statuses,
                    next_cursor: None,
                    can_load_all_replies: true,
                })
            }
            Backend::Fanfou(api) => {
                let page = api.context_timeline(&status.id, &paging).await?;
                Ok(from_page(page))
            }
        }
    }
}

fn from_page(page: Page<Status>) -> ConversationResult {
    ConversationResult {
        statuses: page.items,
        next_cursor: page.next_cursor,
        can_load_all_replies: true,
    }
}
