use async_trait::async_trait;

use super::wire::MicroBlogStatus;
use super::ApiClient;
use crate::backend::{MicroBlog, TwitterApi, TwitterWeb};
use crate::error::BackendError;
use crate::models::{Page, Paging, Status};

/// Twitter v1.1 REST client.
pub struct TwitterClient {
    api: ApiClient,
    account_key: String,
}

impl TwitterClient {
    #[must_use]
    pub fn new(api: ApiClient, account_key: &str) -> Self {
        Self {
            api,
            account_key: account_key.to_string(),
        }
    }

    fn convert(&self, statuses: Vec<MicroBlogStatus>) -> Vec<Status> {
        statuses
            .into_iter()
            .map(|s| s.into_status(&self.account_key))
            .collect()
    }
}

#[async_trait]
impl MicroBlog for TwitterClient {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        let status: MicroBlogStatus = self
            .api
            .get_json(
                "statuses/show.json",
                &[("id", id.to_string()), ("tweet_mode", "extended".to_string())],
            )
            .await?;
        Ok(status.into_status(&self.account_key))
    }

    async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Status>, BackendError> {
        let statuses: Vec<MicroBlogStatus> = self
            .api
            .get_json(
                "statuses/lookup.json",
                &[("id", ids.join(",")), ("tweet_mode", "extended".to_string())],
            )
            .await?;
        Ok(self.convert(statuses))
    }
}

#[async_trait]
impl TwitterApi for TwitterClient {
    async fn show_conversation(
        &self,
        status_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        let mut query = vec![("id", status_id.to_string())];
        query.extend(paging.query_pairs());
        let statuses: Vec<MicroBlogStatus> =
            self.api.get_json("conversation/show.json", &query).await?;
        Ok(Page::with_max_id_cursor(self.convert(statuses)))
    }
}

/// Client for Twitter's legacy web status pages.
pub struct TwitterWebClient {
    web: ApiClient,
}

impl TwitterWebClient {
    #[must_use]
    pub fn new(web: ApiClient) -> Self {
        Self { web }
    }
}

#[async_trait]
impl TwitterWeb for TwitterWebClient {
    async fn status_page(
        &self,
        screen_name: &str,
        status_id: &str,
    ) -> Result<String, BackendError> {
        let path = format!(
            "{}/status/{}",
            urlencoding::encode(screen_name),
            urlencoding::encode(status_id)
        );
        self.web.get_text(&path).await
    }
}
