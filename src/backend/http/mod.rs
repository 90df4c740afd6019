//! HTTP implementations of the backend traits.

mod fanfou;
mod mastodon;
mod statusnet;
mod twitter;
pub mod wire;

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{Backend, BackendProvider};
use crate::config::Config;
use crate::constants::DEFAULT_TWITTER_WEB_BASE_URL;
use crate::error::{BackendError, ConversationError};
use crate::models::{Account, Platform};

pub use fanfou::FanfouClient;
pub use mastodon::MastodonClient;
pub use statusnet::StatusNetClient;
pub use twitter::{TwitterClient, TwitterWebClient};

/// Thin GET-only client bound to one API base URL and credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn new(
        client: Client,
        base_url: &str,
        access_token: Option<String>,
    ) -> Result<Self, BackendError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        // Url::join drops the last path segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(String, reqwest::Response), BackendError> {
        let url = self.url(path)?;
        let url_str = url.to_string();

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        debug!(url = %url_str, "Backend request");

        let response = request.send().await.map_err(|source| BackendError::Request {
            url: url_str.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        Ok((url_str, response))
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an undecodable body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let (url, response) = self.send(path, query).await?;
        response
            .json()
            .await
            .map_err(|source| BackendError::Decode { url, source })
    }

    /// GET `path` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn get_text(&self, path: &str) -> Result<String, BackendError> {
        let (url, response) = self.send(path, &[]).await?;
        response
            .text()
            .await
            .map_err(|source| BackendError::Decode { url, source })
    }
}

/// Builds HTTP clients for an account's platform.
pub struct HttpBackendProvider {
    client: Client,
}

impl HttpBackendProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self { client })
    }

    fn api_client(&self, account: &Account) -> Result<ApiClient, BackendError> {
        ApiClient::new(
            self.client.clone(),
            &account.api_base_url,
            account.access_token.clone(),
        )
    }
}

impl BackendProvider for HttpBackendProvider {
    fn backend_for(&self, account: &Account) -> Result<Backend, ConversationError> {
        let key = account.key.as_str();
        let backend = match &account.platform {
            Platform::Twitter => {
                let web_base_url = account
                    .web_base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_TWITTER_WEB_BASE_URL);
                let web = ApiClient::new(self.client.clone(), web_base_url, None)?;
                Backend::Twitter {
                    api: Arc::new(TwitterClient::new(self.api_client(account)?, key)),
                    web: Arc::new(TwitterWebClient::new(web)),
                    official: account.is_official,
                }
            }
            Platform::StatusNet => {
                Backend::StatusNet(Arc::new(StatusNetClient::new(self.api_client(account)?, key)))
            }
            Platform::Fanfou => {
                Backend::Fanfou(Arc::new(FanfouClient::new(self.api_client(account)?, key)))
            }
            Platform::Mastodon => {
                Backend::Mastodon(Arc::new(MastodonClient::new(self.api_client(account)?, key)))
            }
            Platform::Other(id) => return Err(ConversationError::UnsupportedPlatform(id.clone())),
        };
        Ok(backend)
    }
}
