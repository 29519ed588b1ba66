//! Paginated retrieval of user timelines and status threads.
//!
//! Requests are strictly sequential: one page is fetched, charged against
//! the budget and handed to the caller before the continuation link is
//! examined and the next page requested.

use serde_json::Value;
use url::Url;

use crate::app::{FedicatError, Result};
use crate::fetcher::budget::FetchBudget;
use crate::fetcher::link_header;
use crate::fetcher::Fetcher;

/// What to fetch for a user timeline.
#[derive(Debug, Clone)]
pub struct TimelineRequest {
    pub domain: String,
    pub account: String,
    /// Include replies (ignored when `media` is set).
    pub replies: bool,
    /// Only statuses with media attachments.
    pub media: bool,
    pub budget: FetchBudget,
}

/// One batch of statuses handed to the caller.
#[derive(Debug, Clone)]
pub struct Page {
    pub pinned: bool,
    pub posts: Vec<Value>,
}

enum Stage {
    Pinned,
    Fetch(String),
    Follow(Option<String>),
    Done,
}

/// Incremental walk over a user's statuses: pinned statuses first, then
/// the regular timeline page by page.
pub struct Timeline<'f> {
    fetcher: &'f (dyn Fetcher + Send + Sync),
    request: TimelineRequest,
    statuses_url: String,
    budget: FetchBudget,
    stage: Stage,
}

impl<'f> Timeline<'f> {
    /// Resolve the account and prepare the walk. No statuses are fetched yet.
    pub async fn open(
        fetcher: &'f (dyn Fetcher + Send + Sync),
        request: TimelineRequest,
    ) -> Result<Self> {
        let account_id = lookup_account(fetcher, &request.domain, &request.account).await?;
        // Servers send continuation links with a lowercase host.
        let statuses_url = format!(
            "https://{}/api/v1/accounts/{}/statuses",
            request.domain.to_ascii_lowercase(),
            account_id
        );
        tracing::debug!("resolved {} to {}", request.account, statuses_url);

        Ok(Self {
            fetcher,
            budget: request.budget,
            request,
            statuses_url,
            stage: Stage::Pinned,
        })
    }

    pub fn budget(&self) -> FetchBudget {
        self.budget
    }

    /// Fetch the next page, or `None` once the budget is spent or the
    /// server offers no continuation.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        loop {
            match std::mem::replace(&mut self.stage, Stage::Done) {
                Stage::Done => return Ok(None),
                Stage::Pinned => {
                    let url = format!("{}?pinned=true", self.statuses_url);
                    let response = self.fetcher.get(&url).await?;
                    let posts = self.budget.take(response.records()?);
                    tracing::info!("{} pinned statuses", posts.len());

                    if !self.budget.is_exhausted() {
                        self.stage = Stage::Fetch(self.first_page_url());
                    }
                    return Ok(Some(Page { pinned: true, posts }));
                }
                Stage::Fetch(url) => {
                    let response = self.fetcher.get(&url).await?;
                    let posts = self.budget.take(response.records()?);
                    tracing::info!(
                        "{} statuses, {:?} remaining",
                        posts.len(),
                        self.budget.remaining()
                    );

                    if !self.budget.is_exhausted() {
                        self.stage =
                            Stage::Follow(response.header("link").map(String::from));
                    }
                    return Ok(Some(Page {
                        pinned: false,
                        posts,
                    }));
                }
                Stage::Follow(header) => {
                    let links = link_header::parse(header.as_deref().unwrap_or(""))?;
                    match links.get("next") {
                        Some(next) => self.stage = Stage::Fetch(self.continuation(next)?),
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    fn first_page_url(&self) -> String {
        let filter = if self.request.media {
            "only_media=true".to_string()
        } else {
            format!("exclude_replies={}", !self.request.replies)
        };
        format!(
            "{}?{}&limit={}",
            self.statuses_url,
            filter,
            self.budget.page_size()
        )
    }

    /// Check that `next` stays on this account's statuses endpoint and
    /// resize it to what the budget still allows.
    fn continuation(&self, next: &str) -> Result<String> {
        let expected = format!("{}?", self.statuses_url);
        if !next.starts_with(&expected) {
            return Err(FedicatError::SuspiciousContinuation(next.to_string()));
        }

        let mut url = Url::parse(next)?;
        let limit = self.budget.page_size().to_string();
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        match pairs.iter_mut().find(|(k, _)| k == "limit") {
            Some((_, value)) => *value = limit,
            None => pairs.push(("limit".to_string(), limit)),
        }
        url.query_pairs_mut().clear().extend_pairs(pairs);

        Ok(url.to_string())
    }
}

async fn lookup_account(
    fetcher: &(dyn Fetcher + Send + Sync),
    domain: &str,
    account: &str,
) -> Result<String> {
    let url = Url::parse_with_params(
        &format!("https://{domain}/api/v1/accounts/lookup"),
        &[("acct", account)],
    )?;
    let response = fetcher.get(url.as_str()).await?;
    let account = response.json()?;

    account
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| FedicatError::UnexpectedResponse {
            url: url.to_string(),
            reason: "account record without an id".into(),
        })
}

/// A status and, when requested, its descendants.
#[derive(Debug, Clone)]
pub struct StatusThread {
    pub status: Value,
    pub descendants: Option<Vec<Value>>,
}

/// Fetch one status, plus its replies when `include_context` is set.
/// Descendants come back from a single context call, never paginated.
pub async fn fetch_status_thread(
    fetcher: &(dyn Fetcher + Send + Sync),
    domain: &str,
    ident: &str,
    include_context: bool,
) -> Result<StatusThread> {
    let url = format!("https://{domain}/api/v1/statuses/{ident}");
    let status = fetcher.get(&url).await?.json()?;

    if !include_context {
        return Ok(StatusThread {
            status,
            descendants: None,
        });
    }

    let context_url = format!("{url}/context");
    let mut context = fetcher.get(&context_url).await?.json()?;
    let descendants = match context.get_mut("descendants").map(Value::take) {
        Some(Value::Array(posts)) => posts,
        _ => {
            return Err(FedicatError::UnexpectedResponse {
                url: context_url,
                reason: "context without descendants".into(),
            })
        }
    };

    Ok(StatusThread {
        status,
        descendants: Some(descendants),
    })
}
