use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{Page, Paging, Status, StatusContext};

/// Primitives every microblog-style backend offers.
#[async_trait]
pub trait MicroBlog: Send + Sync {
    /// Fetch a single status by id.
    async fn show_status(&self, id: &str) -> Result<Status, BackendError>;

    /// Fetch several statuses by id in one request.
    ///
    /// The response order is the backend's; missing statuses are skipped.
    async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Status>, BackendError>;
}

/// Twitter REST API.
#[async_trait]
pub trait TwitterApi: MicroBlog {
    /// Full conversation of a status. Only available to official clients.
    async fn show_conversation(
        &self,
        status_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError>;
}

/// Twitter's legacy web frontend.
#[async_trait]
pub trait TwitterWeb: Send + Sync {
    /// Raw HTML of a status page.
    async fn status_page(&self, screen_name: &str, status_id: &str)
        -> Result<String, BackendError>;
}

/// StatusNet (GNU social) API.
#[async_trait]
pub trait StatusNetApi: MicroBlog {
    async fn conversation(
        &self,
        conversation_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError>;
}

/// Fanfou API.
#[async_trait]
pub trait FanfouApi: MicroBlog {
    async fn context_timeline(
        &self,
        status_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError>;
}

/// Mastodon API.
#[async_trait]
pub trait MastodonApi: Send + Sync {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError>;

    /// Ancestors and descendants of a status in one call.
    async fn status_context(&self, id: &str) -> Result<StatusContext, BackendError>;
}
