//! Feed synchronization.
//!
//! Every configured feed is fetched, parsed and written to its own cache
//! partition concurrently. A feed that cannot be fetched, parsed or written
//! is recorded as a failure and its previously cached rows stay in place.
//! The run itself fails only when the cache cannot be pruned or read back.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use staysync_core::{BookingSource, Reservation};
use staysync_feeds::{FeedConfig, FeedError, FeedFetcher, parse_feed, validate_feeds};

use crate::error::{EngineError, EngineResult};
use crate::reconcile::RoomMapping;
use crate::store::Store;

/// Default per-feed fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to one source during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The source's partition now holds exactly `count` bookings.
    Success { count: usize },
    /// The source was left untouched.
    Failure { reason: String },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of a completed sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// One entry per configured source.
    pub outcomes: BTreeMap<BookingSource, SyncOutcome>,
    /// Every cached external booking after the run, projected to
    /// reservations, latest check-in first.
    pub reservations: Vec<Reservation>,
}

impl SyncReport {
    /// Sources that synced successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = BookingSource> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .map(|(source, _)| *source)
    }

    /// Sources that failed, with their reasons.
    pub fn failed(&self) -> impl Iterator<Item = (BookingSource, &str)> + '_ {
        self.outcomes.iter().filter_map(|(source, outcome)| match outcome {
            SyncOutcome::Failure { reason } => Some((*source, reason.as_str())),
            SyncOutcome::Success { .. } => None,
        })
    }

    /// Returns true if every configured source synced.
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(SyncOutcome::is_success)
    }
}

/// Runs feed syncs against the booking cache.
#[derive(Clone)]
pub struct SyncOrchestrator {
    store: Store,
    fetcher: Arc<dyn FeedFetcher>,
    mapping: RoomMapping,
    fetch_timeout: Duration,
}

impl SyncOrchestrator {
    pub fn new(store: Store, fetcher: Arc<dyn FeedFetcher>, mapping: RoomMapping) -> Self {
        Self {
            store,
            fetcher,
            mapping,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Builder: set the per-feed fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sync every feed in `feeds`, then prune sources no longer configured.
    ///
    /// # Errors
    ///
    /// Fails only when `feeds` is invalid or the store cannot be pruned or
    /// read after the per-feed writes. Per-feed fetch, parse and write errors
    /// are reported in [`SyncReport::outcomes`].
    pub async fn sync_all(&self, feeds: &[FeedConfig]) -> EngineResult<SyncReport> {
        validate_feeds(feeds).map_err(|e| EngineError::validation(e.to_string()))?;
        tracing::info!(feeds = feeds.len(), "Starting feed sync");

        let results = join_all(feeds.iter().map(|feed| self.sync_feed(feed))).await;

        let mut outcomes = BTreeMap::new();
        for (source, result) in results {
            let outcome = match result {
                Ok(count) => SyncOutcome::Success { count },
                Err(err) if err.is_feed_error() => {
                    let reason = feed_reason(&err);
                    tracing::warn!(source = %source, error = %reason, "Feed sync failed, keeping cached bookings");
                    SyncOutcome::Failure { reason }
                }
                Err(EngineError::Store(message)) => {
                    tracing::error!(source = %source, error = %message, "Could not store feed, keeping cached bookings");
                    SyncOutcome::Failure {
                        reason: format!("[{}] store error: {}", source, message),
                    }
                }
                Err(err) => {
                    tracing::error!(source = %source, error = %err, "Sync aborted");
                    return Err(err);
                }
            };
            outcomes.insert(source, outcome);
        }

        let configured: Vec<BookingSource> = feeds.iter().map(|f| f.source).collect();
        self.store.retain_sources(&configured).await?;

        let reservations = self
            .store
            .list_external()
            .await?
            .iter()
            .map(|booking| Reservation::from_external(booking, self.mapping.room_for(booking.source())))
            .collect();

        let report = SyncReport {
            outcomes,
            reservations,
        };
        tracing::info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            bookings = report.reservations.len(),
            "Feed sync finished"
        );
        Ok(report)
    }

    async fn sync_feed(&self, feed: &FeedConfig) -> (BookingSource, EngineResult<usize>) {
        (feed.source, self.fetch_parse_store(feed).await)
    }

    async fn fetch_parse_store(&self, feed: &FeedConfig) -> EngineResult<usize> {
        let source = feed.source;
        let raw = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&feed.url))
            .await
            .map_err(|_| {
                FeedError::timeout(format!("timed out after {:?}", self.fetch_timeout))
            })
            .and_then(|fetched| fetched)
            .map_err(|e| tag(e, source))?;

        let events = parse_feed(source, &raw).map_err(|e| tag(e, source))?;
        let count = self.store.replace_source(source, &events).await?;
        tracing::info!(source = %source, count, "Synced feed");
        Ok(count)
    }
}

fn tag(err: FeedError, source: BookingSource) -> FeedError {
    if err.source_tag().is_some() {
        err
    } else {
        err.with_source_tag(source)
    }
}

fn feed_reason(err: &EngineError) -> String {
    match err {
        EngineError::Fetch(e) | EngineError::Parse(e) => e.to_string(),
        other => other.to_string(),
    }
}
