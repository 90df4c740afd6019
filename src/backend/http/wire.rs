//! JSON shapes returned by the platform APIs and their conversion into [`Status`].

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Status, StatusContext, StatusExtras};

/// `created_at` format used by Twitter-compatible APIs.
const MICROBLOG_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Status in the Twitter v1.1 dialect, shared by StatusNet and Fanfou.
#[derive(Debug, Deserialize)]
pub struct MicroBlogStatus {
    #[serde(default)]
    pub id: Value,
    pub id_str: Option<String>,
    /// Fanfou's numeric id; its `id` field is an opaque string.
    pub rawid: Option<i64>,
    pub text: Option<String>,
    pub full_text: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub in_reply_to_status_id: Value,
    pub in_reply_to_status_id_str: Option<String>,
    pub user: Option<MicroBlogUser>,
    pub retweeted_status: Option<Box<MicroBlogStatus>>,
    #[serde(default)]
    pub statusnet_conversation_id: Value,
}

#[derive(Debug, Deserialize)]
pub struct MicroBlogUser {
    #[serde(default)]
    pub id: Value,
    pub id_str: Option<String>,
    pub screen_name: Option<String>,
}

impl MicroBlogStatus {
    #[must_use]
    pub fn into_status(self, account_key: &str) -> Status {
        let id = non_empty(self.id_str).or_else(|| value_to_id(&self.id)).unwrap_or_default();
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_str(s, MICROBLOG_DATE_FORMAT).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let sort_id = self
            .rawid
            .unwrap_or_else(|| sort_id_for(&id, created_at.as_ref()));
        let (user_screen_name, user_key) = self.user.map_or((String::new(), None), |user| {
            let key = non_empty(user.id_str).or_else(|| value_to_id(&user.id));
            (user.screen_name.unwrap_or_default(), key)
        });

        Status {
            id,
            account_key: account_key.to_string(),
            sort_id,
            in_reply_to_status_id: non_empty(self.in_reply_to_status_id_str)
                .or_else(|| value_to_id(&self.in_reply_to_status_id)),
            user_screen_name,
            user_key,
            text: self.full_text.or(self.text).unwrap_or_default(),
            source: self.source,
            created_at,
            retweeted_status: self
                .retweeted_status
                .map(|rt| Box::new(rt.into_status(account_key))),
            extras: StatusExtras {
                statusnet_conversation_id: value_to_id(&self.statusnet_conversation_id),
            },
        }
    }
}

/// Mastodon status entity.
#[derive(Debug, Deserialize)]
pub struct MastodonStatus {
    pub id: String,
    pub in_reply_to_id: Option<String>,
    pub account: MastodonAccount,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<String>,
    pub application: Option<MastodonApplication>,
    pub reblog: Option<Box<MastodonStatus>>,
}

#[derive(Debug, Deserialize)]
pub struct MastodonAccount {
    pub id: String,
    pub acct: String,
}

#[derive(Debug, Deserialize)]
pub struct MastodonApplication {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MastodonContext {
    #[serde(default)]
    pub ancestors: Vec<MastodonStatus>,
    #[serde(default)]
    pub descendants: Vec<MastodonStatus>,
}

impl MastodonStatus {
    #[must_use]
    pub fn into_status(self, account_key: &str) -> Status {
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Status {
            sort_id: sort_id_for(&self.id, created_at.as_ref()),
            id: self.id,
            account_key: account_key.to_string(),
            in_reply_to_status_id: self.in_reply_to_id,
            user_screen_name: self.account.acct,
            user_key: Some(self.account.id),
            text: html_to_text(&self.content),
            source: self.application.map(|app| app.name),
            created_at,
            retweeted_status: self.reblog.map(|rb| Box::new(rb.into_status(account_key))),
            extras: StatusExtras::default(),
        }
    }
}

impl MastodonContext {
    #[must_use]
    pub fn into_context(self, account_key: &str) -> StatusContext {
        StatusContext {
            ancestors: self
                .ancestors
                .into_iter()
                .map(|s| s.into_status(account_key))
                .collect(),
            descendants: self
                .descendants
                .into_iter()
                .map(|s| s.into_status(account_key))
                .collect(),
        }
    }
}

/// Numeric ids sort by value; anything else falls back to creation time.
fn sort_id_for(id: &str, created_at: Option<&DateTime<Utc>>) -> i64 {
    id.parse::<i64>()
        .ok()
        .or_else(|| created_at.map(DateTime::timestamp_millis))
        .unwrap_or(0)
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}
