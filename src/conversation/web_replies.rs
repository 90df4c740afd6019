//! Reply discovery by scraping Twitter's legacy status page.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::debug;

use crate::backend::{MicroBlog, TwitterWeb};
use crate::error::BackendError;
use crate::models::Status;

const REPLIES_SELECTOR: &str = r#"[data-component-context="replies"]"#;
const REPLY_ITEM_SELECTOR: &str = r#"[data-item-type="tweet"][data-item-id]"#;

/// Extract reply status ids from a status page, in document order.
///
/// Only the first element marked as the replies region is searched.
///
/// # Errors
///
/// Returns [`BackendError::NoRepliesSection`] if the page has no replies
/// region and [`BackendError::InvalidResponse`] if the region lists no tweets.
pub fn extract_reply_ids(html: &str) -> Result<Vec<String>, BackendError> {
    let replies_selector = parse_selector(REPLIES_SELECTOR)?;
    let item_selector = parse_selector(REPLY_ITEM_SELECTOR)?;

    let document = Html::parse_document(html);
    let replies = document
        .select(&replies_selector)
        .next()
        .ok_or(BackendError::NoRepliesSection)?;

    let ids: Vec<String> = replies
        .select(&item_selector)
        .filter_map(|item| item.value().attr("data-item-id"))
        .map(String::from)
        .collect();

    if ids.is_empty() {
        return Err(BackendError::InvalidResponse(
            "replies section lists no tweets".to_string(),
        ));
    }
    Ok(ids)
}

/// Drop repeated ids, keeping the first occurrence of each.
#[must_use]
pub fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Scrape the replies to `status` and resolve them through `api`.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched or parsed, or the lookup fails.
pub async fn load_web_replies<A>(
    api: &A,
    web: &dyn TwitterWeb,
    status: &Status,
) -> Result<Vec<Status>, BackendError>
where
    A: MicroBlog + ?Sized,
{
    let page = web.status_page(&status.user_screen_name, &status.id).await?;
    let ids = dedup_ids(extract_reply_ids(&page)?);

    debug!(status_id = %status.id, replies = ids.len(), "Found replies on status page");

    api.lookup_statuses(&ids).await
}

fn parse_selector(selector: &str) -> Result<Selector, BackendError> {
    Selector::parse(selector).map_err(|e| BackendError::Markup(format!("{selector}: {e}")))
}
