use async_trait::async_trait;

use super::wire::MicroBlogStatus;
use super::ApiClient;
use crate::backend::{MicroBlog, StatusNetApi};
use crate::error::BackendError;
use crate::models::{Page, Paging, Status};

/// StatusNet / GNU social client.
pub struct StatusNetClient {
    api: ApiClient,
    account_key: String,
}

impl StatusNetClient {
    #[must_use]
    pub fn new(api: ApiClient, account_key: &str) -> Self {
        Self {
            api,
            account_key: account_key.to_string(),
        }
    }
}

#[async_trait]
impl MicroBlog for StatusNetClient {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        let path = format!("statuses/show/{}.json", urlencoding::encode(id));
        let status: MicroBlogStatus = self.api.get_json(&path, &[]).await?;
        Ok(status.into_status(&self.account_key))
    }

    // No bulk lookup endpoint; fetch one by one.
    async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Status>, BackendError> {
        let mut statuses = Vec::with_capacity(ids.len());
        for id in ids {
            statuses.push(self.show_status(id).await?);
        }
        Ok(statuses)
    }
}

#[async_trait]
impl StatusNetApi for StatusNetClient {
    async fn conversation(
        &self,
        conversation_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        let path = format!(
            "statusnet/conversation/{}.json",
            urlencoding::encode(conversation_id)
        );
        let statuses: Vec<MicroBlogStatus> =
            self.api.get_json(&path, &paging.query_pairs()).await?;
        Ok(Page::with_max_id_cursor(
            statuses
                .into_iter()
                .map(|s| s.into_status(&self.account_key))
                .collect(),
        ))
    }
}
