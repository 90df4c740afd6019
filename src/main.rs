use std::sync::Arc;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conversation_loader::backend::{self, BackendProvider};
use conversation_loader::config::{AccountConfig, Config};
use conversation_loader::filter::{
    filter_conversation, FilterFlags, FilterRules, NoFilter, RuleStatusFilter, StatusFilter,
};
use conversation_loader::ConversationLoader;

/// Pattern to extract the status id from a status URL.
static STATUS_URL_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^https?://[^/]+/(?:@?[^/]+/)?(?:status(?:es)?/)?([A-Za-z0-9_-]+)/?$").unwrap()
});

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let target = std::env::args()
        .nth(1)
        .context("usage: conversation-loader <status-id-or-url>")?;
    let status_id = parse_status_id(&target)
        .with_context(|| format!("Not a status id or URL: {target}"))?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let account = AccountConfig::from_env().context("Failed to load account configuration")?;

    info!(account = %account.key, platform = %account.platform, status_id = %status_id, "Loading conversation");

    let provider = backend::http_provider(&config).context("Failed to build backend")?;
    let status = provider
        .backend_for(&account)?
        .show_status(&status_id)
        .await
        .context("Failed to fetch target status")?;

    let loader = ConversationLoader::new(provider).with_page_size(config.page_size);
    let result = loader
        .load(&account, &status, None, true)
        .await
        .context("Failed to load conversation")?;

    let filter: Arc<dyn StatusFilter> = match &config.filter_rules_path {
        Some(path) => Arc::new(RuleStatusFilter::new(
            FilterRules::load(path).context("Failed to load filter rules")?,
        )),
        None => Arc::new(NoFilter),
    };
    let result = filter_conversation(result, filter, FilterFlags::default())
        .await
        .context("Filter task panicked")?;

    info!(
        statuses = result.statuses.len(),
        can_load_all_replies = result.can_load_all_replies,
        "Conversation loaded"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to serialize conversation")?
    );

    Ok(())
}

/// Accept a bare status id or a status URL such as
/// `https://twitter.com/user/status/123` or `https://mastodon.social/@user/123`.
fn parse_status_id(input: &str) -> Option<String> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return STATUS_URL_PATTERN
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
    }
    let id = input.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,conversation_loader=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Logs go to stderr so stdout carries only the conversation JSON
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
