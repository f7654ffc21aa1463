use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::feed::parse_feed;
use super::types::{PaperRecord, SortBy};

const API_URL: &str = "https://export.arxiv.org/api/query";
/// Largest page the export API serves in one response.
const MAX_PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SearchProviderError {
    #[error("arXiv API rate limit exceeded")]
    RateLimited,

    #[error("arXiv API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Failed to parse arXiv response: {0}")]
    Parse(String),

    #[error("Invalid arXiv API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Academic paper search.
/// Implemented by `ArxivClient` for production; mock implementations used in tests.
///
/// Results are produced lazily; an error item ends the useful part of the stream.
pub trait PaperSource {
    fn results<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
        sort_by: SortBy,
    ) -> BoxStream<'a, Result<PaperRecord, SearchProviderError>>;
}

/// One fetched page plus the offset of the next one, if the feed may continue.
type Page = (Vec<PaperRecord>, Option<usize>);

#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    api_url: String,
}

impl ArxivClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            api_url: API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_api_url(http: Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
        }
    }

    fn page_url(
        &self,
        query: &str,
        start: usize,
        size: usize,
        sort_by: SortBy,
    ) -> Result<Url, SearchProviderError> {
        let start = start.to_string();
        let size = size.to_string();
        let url = Url::parse_with_params(
            &self.api_url,
            &[
                ("search_query", query),
                ("start", start.as_str()),
                ("max_results", size.as_str()),
                ("sortBy", sort_by.as_api_str()),
                ("sortOrder", "descending"),
            ],
        )?;
        Ok(url)
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        size: usize,
        sort_by: SortBy,
    ) -> Result<Vec<PaperRecord>, SearchProviderError> {
        let url = self.page_url(query, start, size, sort_by)?;
        debug!(%url, "arXiv page request");

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(status = %status, "arXiv API throttled the request");
            return Err(SearchProviderError::RateLimited);
        }

        let body = response.text().await?;
        if !status.is_success() {
            // Query errors still come back as an Atom feed with a descriptive entry.
            if let Err(err @ SearchProviderError::Api { .. }) = parse_feed(&body) {
                return Err(err);
            }
            warn!(status = %status, "arXiv API error");
            return Err(SearchProviderError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}"),
            });
        }

        parse_feed(&body)
    }

    async fn next_page(
        &self,
        query: &str,
        start: Option<usize>,
        limit: usize,
        sort_by: SortBy,
    ) -> Result<Option<Page>, SearchProviderError> {
        let Some(start) = start.filter(|&s| s < limit) else {
            return Ok(None);
        };
        let size = (limit - start).min(MAX_PAGE_SIZE);
        let papers = self.fetch_page(query, start, size, sort_by).await?;
        debug!(start, received = papers.len(), "arXiv page received");
        let next = (papers.len() == size).then_some(start + size);
        Ok(Some((papers, next)))
    }
}

impl PaperSource for ArxivClient {
    fn results<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
        sort_by: SortBy,
    ) -> BoxStream<'a, Result<PaperRecord, SearchProviderError>> {
        stream::try_unfold(Some(0), move |start| {
            self.next_page(query, start, limit, sort_by)
        })
        .map_ok(|papers| stream::iter(papers.into_iter().map(Ok::<_, SearchProviderError>)))
        .try_flatten()
        .boxed()
    }
}
