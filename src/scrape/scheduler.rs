use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use crate::error::Result;
use crate::observability::metrics;
use crate::scrape::reconciler::reconcile;
use crate::scrape::sources::QuoteSource;
use crate::scrape::RawQuotes;
use crate::store::Store;

/// Drives the scrape -> reconcile -> persist pipeline on a fixed interval.
///
/// Runs as its own tokio task, independent of request handling; the store is
/// the only shared state. A failed tick is logged and the loop keeps going —
/// the next tick is the retry policy.
pub struct ScrapeTicker {
    vbr: Box<dyn QuoteSource>,
    investing: Box<dyn QuoteSource>,
    bitinfo: Box<dyn QuoteSource>,
    store: Store,
    interval: Duration,
}

impl ScrapeTicker {
    pub fn new(
        vbr: Box<dyn QuoteSource>,
        investing: Box<dyn QuoteSource>,
        bitinfo: Box<dyn QuoteSource>,
        store: Store,
        interval: Duration,
    ) -> Self {
        ScrapeTicker {
            vbr,
            investing,
            bitinfo,
            store,
            interval,
        }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.interval);

        loop {
            ticker.tick().await;

            match self.run_once().await {
                Ok(0) => warn!("Ingestion tick persisted nothing"),
                Ok(count) => info!("Ingestion tick persisted {count} currencies"),
                Err(e) => tracing::error!("Ingestion tick failed: {e}"),
            }
        }
    }

    /// One tick: fetch the three sources concurrently, reconcile, commit the
    /// batch. A source that fails or times out contributes no data this tick
    /// and the tick proceeds with whatever intersection remains.
    pub async fn run_once(&self) -> Result<usize> {
        let (vbr, investing, bitinfo) = tokio::join!(
            fetch_or_empty(self.vbr.as_ref()),
            fetch_or_empty(self.investing.as_ref()),
            fetch_or_empty(self.bitinfo.as_ref()),
        );

        let records = reconcile(&vbr, &investing, &bitinfo);
        if records.is_empty() {
            return Ok(0);
        }

        self.store.upsert_tick(&records)?;
        metrics::SCRAPE_TICKS.inc();
        metrics::QUOTES_UPSERTED.inc_by(records.len() as f64);
        Ok(records.len())
    }
}

async fn fetch_or_empty(source: &dyn QuoteSource) -> RawQuotes {
    match source.fetch().await {
        Ok(quotes) => {
            info!("{} returned {} quotes", source.source(), quotes.len());
            quotes
        }
        Err(e) => {
            warn!("{e}");
            metrics::SCRAPE_FETCH_FAILURES.inc();
            RawQuotes::new()
        }
    }
}
