//! Backend capability adapters.
//!
//! Each platform exposes a different set of conversation primitives. An
//! [`Account`] is mapped onto a [`Backend`] variant holding clients for
//! exactly the primitives that platform supports.

pub mod http;
mod traits;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{BackendError, ConversationError};
use crate::models::{Account, Platform, Status};

pub use http::HttpBackendProvider;
pub use traits::{FanfouApi, MastodonApi, MicroBlog, StatusNetApi, TwitterApi, TwitterWeb};

/// Clients for one account, tagged by platform.
#[derive(Clone)]
pub enum Backend {
    Twitter {
        api: Arc<dyn TwitterApi>,
        web: Arc<dyn TwitterWeb>,
        /// Whether the account uses an official client key.
        official: bool,
    },
    StatusNet(Arc<dyn StatusNetApi>),
    Fanfou(Arc<dyn FanfouApi>),
    Mastodon(Arc<dyn MastodonApi>),
}

impl Backend {
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::Twitter { .. } => Platform::Twitter,
            Self::StatusNet(_) => Platform::StatusNet,
            Self::Fanfou(_) => Platform::Fanfou,
            Self::Mastodon(_) => Platform::Mastodon,
        }
    }

    /// Fetch a single status by id through whichever API the platform has.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        match self {
            Self::Twitter { api, .. } => api.show_status(id).await,
            Self::StatusNet(api) => api.show_status(id).await,
            Self::Fanfou(api) => api.show_status(id).await,
            Self::Mastodon(api) => api.show_status(id).await,
        }
    }
}

/// Resolves the backend clients for an account.
pub trait BackendProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ConversationError::UnsupportedPlatform`] if the account's
    /// platform has no backend, or a backend error if clients cannot be built.
    fn backend_for(&self, account: &Account) -> Result<Backend, ConversationError>;
}

/// Build the default HTTP provider from configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn http_provider(config: &Config) -> Result<Arc<dyn BackendProvider>, BackendError> {
    Ok(Arc::new(HttpBackendProvider::new(config)?))
}
