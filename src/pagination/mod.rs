//! Pagination for the search API.

use crate::errors::{GitHubError, GitHubResult};
use crate::services::ApiSession;
use crate::types::IssueHit;
use futures::stream::{self, Stream};
use reqwest::header::HeaderMap;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// GitHub search never serves results past this many hits.
pub const MAX_SEARCH_RESULTS: usize = 1000;

/// Link relations parsed from a `Link` header (RFC 8288).
///
/// The parser is lenient: segments without a `<url>` or a `rel` are dropped
/// instead of failing the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    links: HashMap<String, String>,
}

impl LinkRelations {
    /// Parses a `Link` header value.
    pub fn from_header(header_value: &str) -> Self {
        let mut links = HashMap::new();

        for part in header_value.split(',') {
            let part = part.trim();
            let (Some(start), Some(end)) = (part.find('<'), part.find('>')) else {
                continue;
            };
            if end <= start + 1 {
                continue;
            }
            let url = part[start + 1..end].trim();

            let rels = part[end + 1..]
                .split(';')
                .map(str::trim)
                .filter_map(|param| {
                    let (key, value) = param.split_once('=')?;
                    key.trim()
                        .eq_ignore_ascii_case("rel")
                        .then(|| value.trim().trim_matches('"').to_string())
                })
                .next();

            if let Some(rels) = rels {
                for rel in rels.split_whitespace() {
                    links.insert(rel.to_lowercase(), url.to_string());
                }
            }
        }

        Self { links }
    }

    /// Parses the `Link` header from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// URL for a relation.
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(String::as_str)
    }

    /// URL for the next page.
    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    /// Page number of the `last` relation.
    pub fn last_page(&self) -> Option<u32> {
        self.get("last").and_then(extract_page_number)
    }

    /// Returns true if no relation was parsed.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Extracts the `page` query parameter from a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

/// What a finished walk produced.
#[derive(Debug)]
pub struct WalkOutcome {
    /// Every hit yielded, in server order.
    pub hits: Vec<IssueHit>,
    /// `total_count` reported by the first page, if one arrived.
    pub total_count: Option<u64>,
    /// The error that stopped the walk early, if any.
    pub error: Option<GitHubError>,
}

/// Drives `/search/issues` page by page and yields hits one at a time.
///
/// The walk is finite and cannot be restarted: once it ends, by exhaustion
/// or by error, `next` keeps returning `Ok(None)`.
pub struct SearchWalker<'s> {
    session: &'s mut ApiSession,
    query: String,
    per_page: u32,
    limit: usize,
    next_page: u32,
    accepted: usize,
    total_count: Option<u64>,
    buffer: VecDeque<IssueHit>,
    done: bool,
}

impl<'s> SearchWalker<'s> {
    /// Creates a walker; nothing is fetched until the first `next`.
    pub fn new(session: &'s mut ApiSession, query: impl Into<String>, per_page: u32, limit: usize) -> Self {
        Self {
            session,
            query: query.into(),
            per_page: per_page.clamp(1, 100),
            limit: limit.min(MAX_SEARCH_RESULTS),
            next_page: 1,
            accepted: 0,
            total_count: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// `total_count` from the first page.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Yields the next hit, fetching a page when the buffer runs dry.
    pub async fn next(&mut self) -> GitHubResult<Option<IssueHit>> {
        loop {
            if let Some(hit) = self.buffer.pop_front() {
                return Ok(Some(hit));
            }
            if self.done {
                return Ok(None);
            }
            if let Err(e) = self.fetch_page().await {
                self.done = true;
                return Err(e);
            }
        }
    }

    /// Drains the walk, keeping the hits gathered before any error.
    pub async fn collect_all(mut self) -> WalkOutcome {
        let mut hits = Vec::new();
        let error = loop {
            match self.next().await {
                Ok(Some(hit)) => hits.push(hit),
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };

        WalkOutcome {
            hits,
            total_count: self.total_count,
            error,
        }
    }

    /// Adapts the walker into a stream of hits.
    pub fn into_stream(self) -> impl Stream<Item = GitHubResult<IssueHit>> + 's {
        stream::unfold(self, |mut walker| async move {
            match walker.next().await {
                Ok(Some(hit)) => Some((Ok(hit), walker)),
                Ok(None) => None,
                Err(e) => Some((Err(e), walker)),
            }
        })
    }

    async fn fetch_page(&mut self) -> GitHubResult<()> {
        let page_number = self.next_page;
        if page_number > 1 {
            self.session.governor().pace_search(page_number).await?;
        }

        let (page, links) = self
            .session
            .search()
            .issues_page(&self.query, page_number, self.per_page)
            .await?;

        let total_count = *self.total_count.get_or_insert(page.total_count);
        let page_len = page.items.len();
        let room = self.limit.saturating_sub(self.accepted);
        let accepted_now = page_len.min(room);
        self.buffer.extend(page.items.into_iter().take(accepted_now));
        self.accepted += accepted_now;
        self.next_page += 1;

        debug!(
            page = page_number,
            items = page_len,
            accepted = self.accepted,
            total_count = total_count,
            incomplete = page.incomplete,
            last_page = ?links.last_page(),
            "Fetched search page"
        );

        self.done = page_len < self.per_page as usize
            || self.accepted >= self.limit
            || self.accepted as u64 >= total_count
            || (!links.is_empty() && links.next().is_none());

        Ok(())
    }
}
