use async_trait::async_trait;

use super::wire::{MastodonContext, MastodonStatus};
use super::ApiClient;
use crate::backend::MastodonApi;
use crate::error::BackendError;
use crate::models::{Status, StatusContext};

pub struct MastodonClient {
    api: ApiClient,
    account_key: String,
}

impl MastodonClient {
    #[must_use]
    pub fn new(api: ApiClient, account_key: &str) -> Self {
        Self {
            api,
            account_key: account_key.to_string(),
        }
    }
}

#[async_trait]
impl MastodonApi for MastodonClient {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        let path = format!("api/v1/statuses/{}", urlencoding::encode(id));
        let status: MastodonStatus = self.api.get_json(&path, &[]).await?;
        Ok(status.into_status(&self.account_key))
    }

    async fn status_context(&self, id: &str) -> Result<StatusContext, BackendError> {
        let path = format!("api/v1/statuses/{}/context", urlencoding::encode(id));
        let context: MastodonContext = self.api.get_json(&path, &[]).await?;
        Ok(context.into_context(&self.account_key))
    }
}
