use async_trait::async_trait;

use super::wire::MicroBlogStatus;
use super::ApiClient;
use crate::backend::{FanfouApi, MicroBlog};
use crate::error::BackendError;
use crate::models::{Page, Paging, Status};

pub struct FanfouClient {
    api: ApiClient,
    account_key: String,
}

impl FanfouClient {
    #[must_use]
    pub fn new(api: ApiClient, account_key: &str) -> Self {
        Self {
            api,
            account_key: account_key.to_string(),
        }
    }
}

#[async_trait]
impl MicroBlog for FanfouClient {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        let status: MicroBlogStatus = self
            .api
            .get_json("statuses/show.json", &[("id", id.to_string())])
            .await?;
        Ok(status.into_status(&self.account_key))
    }

    async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Status>, BackendError> {
        let mut statuses = Vec::with_capacity(ids.len());
        for id in ids {
            statuses.push(self.show_status(id).await?);
        }
        Ok(statuses)
    }
}

#[async_trait]
impl FanfouApi for FanfouClient {
    async fn context_timeline(
        &self,
        status_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        let mut query = vec![("id", status_id.to_string())];
        query.extend(paging.query_pairs());
        let statuses: Vec<MicroBlogStatus> = self
            .api
            .get_json("statuses/context_timeline.json", &query)
            .await?;
        Ok(Page::with_max_id_cursor(
            statuses
                .into_iter()
                .map(|s| s.into_status(&self.account_key))
                .collect(),
        ))
    }
}
