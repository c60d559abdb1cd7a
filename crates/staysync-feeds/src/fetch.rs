//! Feed fetching.
//!
//! [`FeedFetcher`] is the seam between the sync engine and the network. The
//! engine only needs "give me the bytes at this URL"; [`HttpFeedFetcher`] is
//! the production implementation on top of `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{FeedError, FeedResult};

/// A boxed future, so the fetcher trait stays object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the raw bytes of a calendar feed.
pub trait FeedFetcher: Send + Sync {
    /// Fetches the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedError`] on network failure, timeout or an HTTP error
    /// status.
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, FeedResult<Vec<u8>>>;
}

/// HTTP client settings for [`HttpFeedFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("staysync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpFetcherConfig {
    /// Builder: set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches feeds over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(config: HttpFetcherConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                FeedError::internal(format!("failed to create HTTP client: {}", e)).with_cause(e)
            })?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> FeedResult<Vec<u8>> {
        let url = http_url(url)?;
        trace!(url = %url, "Fetching feed");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let err = if e.is_timeout() {
                FeedError::timeout(format!("request timed out: {}", e))
            } else {
                FeedError::network(format!("request failed: {}", e))
            };
            err.with_cause(e)
        })?;

        let status = response.status();
        if let Some(err) = status_error(status) {
            warn!(url = %url, status = %status, "Feed request rejected");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::network(format!("failed to read response: {}", e)).with_cause(e))?;
        debug!(url = %url, bytes = body.len(), "Fetched feed");
        Ok(body.to_vec())
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, FeedResult<Vec<u8>>> {
        Box::pin(self.get(url))
    }
}

/// Rewrites `webcal://` subscription links to `https://`.
fn http_url(url: &Url) -> FeedResult<Url> {
    match url.scheme() {
        "http" | "https" => Ok(url.clone()),
        "webcal" | "webcals" => {
            let rest = &url.as_str()[url.scheme().len()..];
            Url::parse(&format!("https{}", rest))
                .map_err(|e| FeedError::configuration(format!("invalid feed URL: {}", e)))
        }
        other => Err(FeedError::configuration(format!(
            "unsupported feed URL scheme: {}",
            other
        ))),
    }
}

/// Maps a non-success HTTP status to a feed error.
fn status_error(status: StatusCode) -> Option<FeedError> {
    match status {
        s if s.is_success() => None,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(FeedError::access_denied(
            format!("feed access denied ({})", status),
        )),
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            Some(FeedError::not_found(format!("feed not found ({})", status)))
        }
        StatusCode::TOO_MANY_REQUESTS => Some(FeedError::rate_limited("too many requests")),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Some(FeedError::timeout(format!("upstream timeout ({})", status)))
        }
        s if s.is_server_error() => Some(FeedError::server(format!("server error ({})", s))),
        s => Some(FeedError::invalid_response(format!(
            "unexpected status {}",
            s
        ))),
    }
}
