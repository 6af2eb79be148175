use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ingestion::fetch::{FeedSource, HttpFetcher};
use crate::ingestion::{self, IngestError};
use crate::store::{FeedStore, PgStore};
use crate::telemetry::{self};
use crate::util::time::parse_interval;

/// gator agg <interval>
#[derive(Args, Debug, Clone, PartialEq)]
pub struct AggArgs {
    /// Time between fetch cycles, e.g. 30s, 1m, 1h30m
    pub interval: String,
}

/// Run ingestion cycles until `ct` is cancelled: one immediately, then one per
/// tick. Cycles never overlap and a failed cycle never stops the loop.
/// Returns how many cycles ran.
pub async fn run<S, F>(store: &S, source: &F, every: Duration, ct: &CancellationToken) -> u64
where
    S: FeedStore + ?Sized,
    F: FeedSource + ?Sized,
{
    let log = telemetry::agg();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cycles = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = ct.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match ingestion::run_once(store, source, ct).await {
            Ok(_) => {}
            Err(IngestError::NoFeeds) => log.info("ℹ️  No feeds to fetch. Add one with `addfeed <name> <url>`."),
            Err(IngestError::Fetch(ingestion::fetch::FetchError::Cancelled)) => log.info("⏹️  Fetch cancelled"),
            Err(e) => log.error(format!("❌ Cycle failed: {e}")),
        }
        cycles += 1;
    }
    log.info(format!("⏹️  Scheduler stopped after {cycles} cycle(s)"));
    cycles
}

pub async fn agg(store: &PgStore, args: AggArgs) -> Result<()> {
    let every = parse_interval(&args.interval)?;
    let log = telemetry::agg();
    let _g = log.root_span_kv([("interval", format!("{every:?}"))]).entered();
    log.info(format!("🔁 Collecting feeds every {}", args.interval));

    let source = HttpFetcher::new().context("building HTTP client")?;
    let ct = CancellationToken::new();
    let shutdown = ct.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    run(store, &source, every, &ct).await;
    Ok(())
}
