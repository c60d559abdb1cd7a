//! Channel calendar feeds: configuration, fetching and parsing.
//!
//! ```text
//! FeedConfig ──► FeedFetcher::fetch() ──► bytes ──► parse_feed() ──► Vec<ExternalEvent>
//! ```
//!
//! - [`FeedFetcher`] - object-safe fetch seam, [`HttpFeedFetcher`] in production
//! - [`parse_feed`] - pure iCalendar to [`ExternalEvent`] conversion
//! - [`FeedError`] - transport and parse failures, tagged with their source
//!
//! [`ExternalEvent`]: staysync_core::ExternalEvent

pub mod config;
pub mod error;
pub mod fetch;
pub mod ics;

pub use config::{FeedConfig, validate_feeds};
pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use fetch::{BoxFuture, FeedFetcher, HttpFeedFetcher, HttpFetcherConfig};
pub use ics::parse_feed;
