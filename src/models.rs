use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform-agnostic status (a single timeline message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    /// Key of the account this status was loaded through.
    pub account_key: String,
    /// Platform-assigned ordering value, only comparable within one account's stream.
    pub sort_id: i64,
    pub in_reply_to_status_id: Option<String>,
    pub user_screen_name: String,
    pub user_key: Option<String>,
    pub text: String,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub retweeted_status: Option<Box<Status>>,
    #[serde(default)]
    pub extras: StatusExtras,
}

/// Platform-specific extra fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusExtras {
    pub statusnet_conversation_id: Option<String>,
}

impl Status {
    /// The status a conversation should be built around.
    ///
    /// Retweets resolve to the retweeted status, keeping this status's account key.
    #[must_use]
    pub fn original(&self) -> Status {
        match &self.retweeted_status {
            Some(retweeted) => Status {
                account_key: self.account_key.clone(),
                ..retweeted.original()
            },
            None => self.clone(),
        }
    }
}

/// Platform an account lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Platform {
    Twitter,
    StatusNet,
    Fanfou,
    Mastodon,
    /// A platform without any backend implementation.
    Other(String),
}

impl Platform {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Twitter => "twitter",
            Self::StatusNet => "statusnet",
            Self::Fanfou => "fanfou",
            Self::Mastodon => "mastodon",
            Self::Other(id) => id,
        }
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "twitter" => Self::Twitter,
            "statusnet" => Self::StatusNet,
            "fanfou" => Self::Fanfou,
            "mastodon" => Self::Mastodon,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(platform) => platform,
            Err(never) => match never {},
        }
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account a conversation is loaded through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub key: String,
    pub platform: Platform,
    /// Base URL of the platform's REST API.
    pub api_base_url: String,
    /// Base URL of the legacy web frontend (Twitter only).
    pub web_base_url: Option<String>,
    pub access_token: Option<String>,
    /// Whether the account uses a privileged (official) client.
    pub is_official: bool,
}

/// Pagination boundary handed from one conversation load to the next.
///
/// `since_id` is the lower bound and `max_id` the upper bound. The sort ids
/// shadow them so already-fetched segments can be skipped without comparing
/// id strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub since_id: Option<String>,
    pub max_id: Option<String>,
    pub since_sort_id: Option<i64>,
    pub max_sort_id: Option<i64>,
}

impl PaginationCursor {
    #[must_use]
    pub fn max_id(id: impl Into<String>, sort_id: i64) -> Self {
        Self {
            max_id: Some(id.into()),
            max_sort_id: Some(sort_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn since_id(id: impl Into<String>, sort_id: i64) -> Self {
        Self {
            since_id: Some(id.into()),
            since_sort_id: Some(sort_id),
            ..Self::default()
        }
    }

    /// Whether neither bound is set, i.e. the conversation is loaded for the first time.
    #[must_use]
    pub fn is_first_load(&self) -> bool {
        self.since_id.is_none() && self.max_id.is_none()
    }

    /// Lower-bound sort id, `-1` when unknown.
    #[must_use]
    pub fn since_sort_id_or_default(&self) -> i64 {
        self.since_sort_id.unwrap_or(-1)
    }

    /// Upper-bound sort id, `-1` when unknown.
    #[must_use]
    pub fn max_sort_id_or_default(&self) -> i64 {
        self.max_sort_id.unwrap_or(-1)
    }
}

/// Request parameters for paged backend endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub since_id: Option<String>,
    pub max_id: Option<String>,
    pub count: Option<u32>,
}

impl Paging {
    #[must_use]
    pub fn from_cursor(cursor: Option<&PaginationCursor>, count: u32) -> Self {
        Self {
            since_id: cursor.and_then(|c| c.since_id.clone()),
            max_id: cursor.and_then(|c| c.max_id.clone()),
            count: Some(count),
        }
    }

    /// Query parameters for this paging, skipping unset fields.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(since_id) = &self.since_id {
            pairs.push(("since_id", since_id.clone()));
        }
        if let Some(max_id) = &self.max_id {
            pairs.push(("max_id", max_id.clone()));
        }
        if let Some(count) = self.count {
            pairs.push(("count", count.to_string()));
        }
        pairs
    }
}

/// One page of a paged backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<PaginationCursor>,
}

impl Page<Status> {
    /// Build a page whose next cursor continues below its last (oldest) status.
    #[must_use]
    pub fn with_max_id_cursor(items: Vec<Status>) -> Self {
        let next_cursor = items
            .last()
            .map(|last| PaginationCursor::max_id(last.id.clone(), last.sort_id));
        Self { items, next_cursor }
    }
}

/// Ancestors and descendants of a status, as returned by thread-context APIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusContext {
    pub ancestors: Vec<Status>,
    pub descendants: Vec<Status>,
}

/// Result of a single conversation load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationResult {
    /// Statuses in discovery order (not necessarily chronological).
    pub statuses: Vec<Status>,
    pub next_cursor: Option<PaginationCursor>,
    /// Whether the strategy used is known to return every reply.
    pub can_load_all_replies: bool,
}
