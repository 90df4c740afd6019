//! Shared constants used across the crate.

/// User agent string sent with backend requests unless overridden by `USER_AGENT`.
pub const DEFAULT_USER_AGENT: &str = concat!("conversation-loader/", env!("CARGO_PKG_VERSION"));

/// Maximum number of statuses fetched while walking a reply chain upwards.
///
/// Deeper (or cyclic) chains are cut off here; callers continue with a new cursor.
pub const MAX_ANCESTOR_DEPTH: usize = 10;

/// Default number of statuses requested from paged conversation endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Web frontend used for status pages when an account doesn't configure one.
pub const DEFAULT_TWITTER_WEB_BASE_URL: &str = "https://twitter.com";
