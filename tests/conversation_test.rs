//! Integration tests for conversation reconstruction against in-memory backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use conversation_loader::backend::{
    Backend, BackendProvider, FanfouApi, MastodonApi, MicroBlog, StatusNetApi, TwitterApi,
    TwitterWeb,
};
use conversation_loader::models::{
    Account, Page, PaginationCursor, Paging, Platform, Status, StatusContext, StatusExtras,
};
use conversation_loader::{BackendError, ConversationError, ConversationLoader};

fn status(id: &str, in_reply_to: Option<&str>) -> Status {
    Status {
        id: id.to_string(),
        account_key: "acct".to_string(),
        sort_id: id.parse().unwrap_or(0),
        in_reply_to_status_id: in_reply_to.map(String::from),
        user_screen_name: "alice".to_string(),
        user_key: None,
        text: format!("status {id}"),
        source: None,
        created_at: None,
        retweeted_status: None,
        extras: StatusExtras::default(),
    }
}

fn account(platform: Platform, is_official: bool) -> Account {
    Account {
        key: "acct".to_string(),
        platform,
        api_base_url: "https://api.example.com/".to_string(),
        web_base_url: None,
        access_token: None,
        is_official,
    }
}

fn ids(statuses: &[Status]) -> Vec<&str> {
    statuses.iter().map(|s| s.id.as_str()).collect()
}

/// One fake implementing every platform API, recording each call.
#[derive(Default)]
struct FakeApi {
    statuses: HashMap<String, Status>,
    native: Vec<Status>,
    context: StatusContext,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn with_statuses(statuses: Vec<Status>) -> Self {
        Self {
            statuses: statuses.into_iter().map(|s| (s.id.clone(), s)).collect(),
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn native_page(&self) -> Page<Status> {
        Page::with_max_id_cursor(self.native.clone())
    }

    fn get(&self, id: &str) -> Result<Status, BackendError> {
        self.statuses
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                url: format!("fake://statuses/{id}"),
                status: 404,
            })
    }
}

#[async_trait]
impl MicroBlog for FakeApi {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        self.record(format!("show:{id}"));
        self.get(id)
    }

    async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Status>, BackendError> {
        self.record(format!("lookup:{}", ids.join(",")));
        Ok(ids.iter().filter_map(|id| self.get(id).ok()).collect())
    }
}

#[async_trait]
impl TwitterApi for FakeApi {
    async fn show_conversation(
        &self,
        status_id: &str,
        paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        self.record(format!("conversation:{status_id}:{:?}", paging.max_id));
        Ok(self.native_page())
    }
}

#[async_trait]
impl StatusNetApi for FakeApi {
    async fn conversation(
        &self,
        conversation_id: &str,
        _paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        self.record(format!("statusnet_conversation:{conversation_id}"));
        Ok(self.native_page())
    }
}

#[async_trait]
impl FanfouApi for FakeApi {
    async fn context_timeline(
        &self,
        status_id: &str,
        _paging: &Paging,
    ) -> Result<Page<Status>, BackendError> {
        self.record(format!("context_timeline:{status_id}"));
        Ok(self.native_page())
    }
}

#[async_trait]
impl MastodonApi for FakeApi {
    async fn show_status(&self, id: &str) -> Result<Status, BackendError> {
        self.record(format!("show:{id}"));
        self.get(id)
    }

    async fn status_context(&self, id: &str) -> Result<StatusContext, BackendError> {
        self.record(format!("context:{id}"));
        Ok(self.context.clone())
    }
}

struct FakeWeb {
    page: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn serving(page: &str) -> Self {
        Self {
            page: Some(page.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            page: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TwitterWeb for FakeWeb {
    async fn status_page(&self, screen_name: &str, status_id: &str) -> Result<String, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{screen_name}/{status_id}"));
        self.page.clone().ok_or_else(|| BackendError::Status {
            url: format!("fake://web/{screen_name}/status/{status_id}"),
            status: 503,
        })
    }
}

struct FakeProvider {
    api: Arc<FakeApi>,
    web: Arc<FakeWeb>,
}

impl BackendProvider for FakeProvider {
    fn backend_for(&self, account: &Account) -> Result<Backend, ConversationError> {
        let api = self.api.clone();
        Ok(match &account.platform {
            Platform::Twitter => Backend::Twitter {
                api,
                web: self.web.clone(),
                official: account.is_official,
            },
            Platform::StatusNet => Backend::StatusNet(api),
            Platform::Fanfou => Backend::Fanfou(api),
            Platform::Mastodon => Backend::Mastodon(api),
            Platform::Other(id) => return Err(ConversationError::UnsupportedPlatform(id.clone())),
        })
    }
}

fn loader(api: &Arc<FakeApi>, web: &Arc<FakeWeb>) -> ConversationLoader {
    ConversationLoader::new(Arc::new(FakeProvider {
        api: api.clone(),
        web: web.clone(),
    }))
}

/// A reply chain `1 <- 2 <- ... <- len`, each status replying to the previous one.
fn chain(len: u32) -> Vec<Status> {
    (1..=len)
        .map(|i| {
            let parent = (i > 1).then(|| (i - 1).to_string());
            status(&i.to_string(), parent.as_deref())
        })
        .collect()
}

fn replies_page(reply_ids: &[&str]) -> String {
    let items: String = reply_ids
        .iter()
        .map(|id| format!(r#"<li data-item-type="tweet" data-item-id="{id}"></li>"#))
        .collect();
    format!(r#"<html><body><ol data-component-context="replies">{items}</ol></body></html>"#)
}

#[tokio::test]
async fn test_mastodon_returns_ancestors_then_descendants() {
    let api = Arc::new(FakeApi {
        context: StatusContext {
            ancestors: vec![status("1", None), status("2", Some("1"))],
            descendants: vec![status("4", Some("3")), status("5", Some("3"))],
        },
        ..FakeApi::default()
    });
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Mastodon, false), &status("3", Some("2")), None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["1", "2", "4", "5"]);
    assert!(result.can_load_all_replies);
    assert_eq!(result.next_cursor, None);
    assert_eq!(api.calls(), vec!["context:3"]);
}

#[tokio::test]
async fn test_ancestor_walk_is_capped_at_ten_fetches() {
    let mut statuses = chain(30);
    let target = statuses.pop().unwrap();
    let api = Arc::new(FakeApi::with_statuses(statuses));
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &target, None, false)
        .await
        .unwrap();

    let shows = api.calls().iter().filter(|c| c.starts_with("show:")).count();
    assert_eq!(shows, 10);
    assert_eq!(result.statuses.len(), 10);
    assert_eq!(result.statuses[0].id, "29");
    assert_eq!(result.statuses[9].id, "20");
    assert!(!result.can_load_all_replies);
}

#[tokio::test]
async fn test_ancestor_walk_terminates_on_cycle() {
    let api = Arc::new(FakeApi::with_statuses(vec![
        status("1", Some("2")),
        status("2", Some("1")),
    ]));
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &status("3", Some("2")), None, false)
        .await
        .unwrap();

    assert_eq!(api.calls().len(), 10);
    assert_eq!(result.statuses.len(), 10);
}

#[tokio::test]
async fn test_walk_skipped_when_upper_bound_already_seen() {
    let api = Arc::new(FakeApi::with_statuses(chain(5)));
    let web = Arc::new(FakeWeb::serving(&replies_page(&["6"])));
    let target = status("5", Some("4"));
    let cursor = PaginationCursor::max_id("5", 5);

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &target, Some(&cursor), false)
        .await
        .unwrap();

    assert!(result.statuses.is_empty());
    assert!(api.calls().is_empty());
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_walk_resumes_from_upper_bound() {
    let api = Arc::new(FakeApi::with_statuses(chain(5)));
    let web = Arc::new(FakeWeb::failing());
    let target = status("9", Some("8"));
    let cursor = PaginationCursor::max_id("3", 3);

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &target, Some(&cursor), false)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["3", "2", "1"]);
    assert_eq!(api.calls(), vec!["show:3", "show:2", "show:1"]);
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_first_load_scrapes_and_dedups_replies() {
    let mut statuses = chain(3);
    statuses.extend([
        status("10", Some("3")),
        status("11", Some("3")),
        status("12", Some("3")),
    ]);
    let api = Arc::new(FakeApi::with_statuses(statuses));
    let web = Arc::new(FakeWeb::serving(&replies_page(&["10", "11", "10", "12"])));
    let target = status("3", Some("2"));

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &target, None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["2", "1", "10", "11", "12"]);
    let lookups: Vec<String> = api
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("lookup:"))
        .collect();
    assert_eq!(lookups, vec!["lookup:10,11,12"]);
    assert_eq!(web.calls(), 1);
    assert!(!result.can_load_all_replies);
    assert_eq!(result.next_cursor, None);
}

#[tokio::test]
async fn test_failed_scrape_returns_only_ancestors() {
    let api = Arc::new(FakeApi::with_statuses(chain(3)));
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &status("4", Some("3")), None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["3", "2", "1"]);
    assert_eq!(web.calls(), 1);
    assert!(!api.calls().iter().any(|c| c.starts_with("lookup:")));
}

#[tokio::test]
async fn test_page_without_replies_section_is_swallowed() {
    let api = Arc::new(FakeApi::with_statuses(chain(2)));
    let web = Arc::new(FakeWeb::serving("<html><body><p>Log in</p></body></html>"));

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &status("3", Some("2")), None, false)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["2", "1"]);
}

#[tokio::test]
async fn test_replies_not_scraped_after_first_load() {
    let api = Arc::new(FakeApi::with_statuses(chain(3)));
    let web = Arc::new(FakeWeb::serving(&replies_page(&["10"])));
    let cursor = PaginationCursor::since_id("20", 20);

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &status("3", Some("2")), Some(&cursor), true)
        .await
        .unwrap();

    assert!(result.statuses.is_empty());
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_ancestor_error_propagates() {
    let api = Arc::new(FakeApi::with_statuses(vec![status("2", Some("1"))]));
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &status("3", Some("2")), None, false)
        .await;

    assert!(matches!(
        result,
        Err(ConversationError::Backend(BackendError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_unsupported_platform_makes_no_calls() {
    let api = Arc::new(FakeApi::with_statuses(chain(3)));
    let web = Arc::new(FakeWeb::serving(&replies_page(&["1"])));

    let result = loader(&api, &web)
        .load(
            &account(Platform::Other("pleroma-legacy".to_string()), false),
            &status("3", Some("2")),
            None,
            true,
        )
        .await;

    assert!(matches!(
        result,
        Err(ConversationError::UnsupportedPlatform(ref id)) if id == "pleroma-legacy"
    ));
    assert!(api.calls().is_empty());
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_official_twitter_uses_native_conversation() {
    let api = Arc::new(FakeApi {
        native: vec![status("7", None), status("5", None)],
        ..FakeApi::default()
    });
    let web = Arc::new(FakeWeb::failing());
    let cursor = PaginationCursor::max_id("9", 9);

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, true), &status("8", Some("7")), Some(&cursor), true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["7", "5"]);
    assert!(result.can_load_all_replies);
    assert_eq!(result.next_cursor, Some(PaginationCursor::max_id("5", 5)));
    assert_eq!(api.calls(), vec!["conversation:8:Some(\"9\")"]);
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_statusnet_with_conversation_id() {
    let api = Arc::new(FakeApi {
        native: vec![status("2", None), status("1", None)],
        ..FakeApi::default()
    });
    let web = Arc::new(FakeWeb::failing());
    let mut target = status("3", Some("2"));
    target.extras.statusnet_conversation_id = Some("77".to_string());

    let result = loader(&api, &web)
        .load(&account(Platform::StatusNet, false), &target, None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["2", "1"]);
    assert!(result.can_load_all_replies);
    assert_eq!(api.calls(), vec!["statusnet_conversation:77"]);
}

/// StatusNet statuses without a conversation id fall through to the ancestor
/// walk; replies are not loaded, yet the result still claims to be complete.
#[tokio::test]
async fn test_statusnet_without_conversation_id_falls_through() {
    let api = Arc::new(FakeApi::with_statuses(chain(3)));
    let web = Arc::new(FakeWeb::serving(&replies_page(&["10"])));

    let result = loader(&api, &web)
        .load(&account(Platform::StatusNet, false), &status("4", Some("3")), None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["3", "2", "1"]);
    assert!(result.can_load_all_replies);
    assert_eq!(api.calls(), vec!["show:3", "show:2", "show:1"]);
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_fanfou_uses_context_timeline() {
    let api = Arc::new(FakeApi {
        native: vec![status("2", None)],
        ..FakeApi::default()
    });
    let web = Arc::new(FakeWeb::failing());

    let result = loader(&api, &web)
        .load(&account(Platform::Fanfou, false), &status("3", Some("2")), None, true)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["2"]);
    assert!(result.can_load_all_replies);
    assert_eq!(api.calls(), vec!["context_timeline:3"]);
}

#[tokio::test]
async fn test_retweet_loads_conversation_of_original() {
    let api = Arc::new(FakeApi::with_statuses(chain(2)));
    let web = Arc::new(FakeWeb::failing());
    let mut retweet = status("50", None);
    retweet.retweeted_status = Some(Box::new(status("3", Some("2"))));

    let result = loader(&api, &web)
        .load(&account(Platform::Twitter, false), &retweet, None, false)
        .await
        .unwrap();

    assert_eq!(ids(&result.statuses), vec!["2", "1"]);
    assert_eq!(web.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_loads_do_not_share_state() {
    let api = Arc::new(FakeApi {
        native: vec![status("1", None)],
        ..FakeApi::with_statuses(chain(2))
    });
    let web = Arc::new(FakeWeb::failing());
    let loader = loader(&api, &web);
    let official = account(Platform::Twitter, true);
    let compat = account(Platform::Twitter, false);
    let target = status("3", Some("2"));

    let (native, walked) = tokio::join!(
        loader.load(&official, &target, None, true),
        loader.load(&compat, &target, None, true),
    );

    assert!(native.unwrap().can_load_all_replies);
    assert!(!walked.unwrap().can_load_all_replies);
}
