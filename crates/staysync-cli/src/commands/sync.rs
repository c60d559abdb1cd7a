//! `staysync sync`

use std::sync::Arc;

use staysync_engine::{EngineError, SyncOrchestrator};
use staysync_feeds::{FeedFetcher, HttpFeedFetcher, HttpFetcherConfig};

use super::Context;
use crate::error::CliResult;
use crate::render;

/// Sync every configured feed over HTTP.
pub async fn run(ctx: &Context) -> CliResult<String> {
    let fetcher = HttpFeedFetcher::new(
        HttpFetcherConfig::default().with_timeout(ctx.config.fetch_timeout()),
    )
    .map_err(EngineError::from)?;
    run_with(ctx, Arc::new(fetcher)).await
}

/// Sync every configured feed through `fetcher`.
pub async fn run_with(ctx: &Context, fetcher: Arc<dyn FeedFetcher>) -> CliResult<String> {
    if ctx.config.feeds.is_empty() {
        tracing::warn!("No feeds configured; only pruning the cache");
    }

    let report = SyncOrchestrator::new(ctx.store.clone(), fetcher, ctx.config.room_mapping())
        .with_fetch_timeout(ctx.config.fetch_timeout())
        .sync_all(&ctx.config.feeds)
        .await?;

    for (source, reason) in report.failed() {
        tracing::warn!(source = %source, reason, "Feed kept its previous bookings");
    }
    ctx.output(&report, render::render_sync_report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use staysync_core::BookingSource;
    use staysync_feeds::{BoxFuture, FeedConfig, FeedError, FeedResult};
    use url::Url;

    struct FixedFetcher;

    impl FeedFetcher for FixedFetcher {
        fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, FeedResult<Vec<u8>>> {
            let host = url.host_str().unwrap_or_default().to_string();
            Box::pin(async move {
                if host == "down.example" {
                    return Err(FeedError::network("connection refused"));
                }
                Ok(concat!(
                    "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\n",
                    "BEGIN:VEVENT\r\nUID:abc@airbnb\r\nSUMMARY:Reserved\r\n",
                    "DTSTART;VALUE=DATE:20240510\r\nDTEND;VALUE=DATE:20240512\r\nEND:VEVENT\r\n",
                    "END:VCALENDAR\r\n",
                )
                .as_bytes()
                .to_vec())
            })
        }
    }

    #[tokio::test]
    async fn reports_each_source() {
        let mut ctx = testing::context();
        ctx.config.feeds = vec![
            FeedConfig::parse(BookingSource::Airbnb, "https://up.example/a.ics").unwrap(),
            FeedConfig::parse(BookingSource::Vrbo, "https://down.example/v.ics").unwrap(),
        ];

        let text = run_with(&ctx, Arc::new(FixedFetcher)).await.unwrap();

        insta::assert_snapshot!(text, @r"
        airbnb       ok      1 bookings
        vrbo         failed  [vrbo] network_error: connection refused
        1 channel bookings cached
        ");
    }

    #[tokio::test]
    async fn json_output_carries_outcomes() {
        let mut ctx = testing::context();
        ctx.json = true;
        ctx.config.feeds =
            vec![FeedConfig::parse(BookingSource::Airbnb, "https://up.example/a.ics").unwrap()];

        let text = run_with(&ctx, Arc::new(FixedFetcher)).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["outcomes"]["airbnb"]["outcome"], "success");
        assert_eq!(value["outcomes"]["airbnb"]["count"], 1);
        assert_eq!(value["reservations"][0]["id"], "abc@airbnb");
        assert_eq!(value["reservations"][0]["room"], "garden");
    }
}
