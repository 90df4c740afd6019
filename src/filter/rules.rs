use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::{FilterFlags, StatusFilter};
use crate::models::Status;

static URL_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());

#[derive(Debug, Error)]
pub enum FilterRulesError {
    #[error("failed to read filter rules from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse filter rules: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Persisted filter rules.
///
/// ```toml
/// users = ["spammer"]
/// keywords = ["giveaway"]
/// sources = ["AutoPoster"]
/// links = ["spam.example"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Screen names, matched case-insensitively.
    pub users: Vec<String>,
    /// Case-insensitive substrings of the status text.
    pub keywords: Vec<String>,
    /// Substrings of the posting client's name.
    pub sources: Vec<String>,
    /// Substrings of URLs in the status text.
    pub links: Vec<String>,
}

impl FilterRules {
    /// Load rules from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, FilterRulesError> {
        let content = std::fs::read_to_string(path).map_err(|source| FilterRulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML.
    pub fn parse(content: &str) -> Result<Self, FilterRulesError> {
        Ok(toml::from_str(content)?)
    }

    fn matches(&self, status: &Status, flags: FilterFlags) -> bool {
        if !flags.skip_users
            && self
                .users
                .iter()
                .any(|u| u.eq_ignore_ascii_case(&status.user_screen_name))
        {
            return true;
        }

        if !flags.skip_keywords && !self.keywords.is_empty() {
            let text = status.text.to_lowercase();
            if self
                .keywords
                .iter()
                .any(|k| text.contains(&k.to_lowercase()))
            {
                return true;
            }
        }

        if !flags.skip_sources {
            if let Some(source) = &status.source {
                if self.sources.iter().any(|s| source.contains(s.as_str())) {
                    return true;
                }
            }
        }

        if !flags.skip_links && !self.links.is_empty() {
            let hit = URL_PATTERN
                .find_iter(&status.text)
                .any(|url| self.links.iter().any(|l| url.as_str().contains(l.as_str())));
            if hit {
                return true;
            }
        }

        false
    }
}

/// [`StatusFilter`] backed by a fixed rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleStatusFilter {
    rules: FilterRules,
}

impl RuleStatusFilter {
    #[must_use]
    pub fn new(rules: FilterRules) -> Self {
        Self { rules }
    }
}

impl StatusFilter for RuleStatusFilter {
    fn is_filtered(&self, status: &Status, flags: FilterFlags) -> bool {
        self.rules.matches(status, flags)
            || status
                .retweeted_status
                .as_deref()
                .is_some_and(|rt| self.rules.matches(rt, flags))
    }
}
