//! Feed configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use staysync_core::BookingSource;
use url::Url;

use crate::error::{FeedError, FeedResult};

/// One channel's calendar export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// The channel this feed belongs to.
    pub source: BookingSource,
    /// Export URL (`https://` or `webcal://`).
    pub url: Url,
}

impl FeedConfig {
    pub fn new(source: BookingSource, url: Url) -> Self {
        Self { source, url }
    }

    /// Parses `url` and builds a feed config.
    pub fn parse(source: BookingSource, url: &str) -> FeedResult<Self> {
        let url = Url::parse(url).map_err(|e| {
            FeedError::configuration(format!("invalid feed URL {:?}: {}", url, e))
                .with_source_tag(source)
        })?;
        Ok(Self::new(source, url))
    }
}

/// Checks a list of feeds: channel sources only, each at most once, and a
/// fetchable URL scheme.
pub fn validate_feeds(feeds: &[FeedConfig]) -> FeedResult<()> {
    let mut seen = HashSet::new();
    for feed in feeds {
        if !feed.source.is_external() {
            return Err(FeedError::configuration(
                "manual bookings cannot be configured as a feed",
            ));
        }
        if !seen.insert(feed.source) {
            return Err(FeedError::configuration(format!(
                "source {} is configured more than once",
                feed.source
            ))
            .with_source_tag(feed.source));
        }
        if !matches!(feed.url.scheme(), "http" | "https" | "webcal" | "webcals") {
            return Err(FeedError::configuration(format!(
                "unsupported URL scheme {:?}",
                feed.url.scheme()
            ))
            .with_source_tag(feed.source));
        }
    }
    Ok(())
}
