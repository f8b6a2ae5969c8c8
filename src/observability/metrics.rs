use lazy_static::lazy_static;
use prometheus::{Counter, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ingestion metrics
    pub static ref SCRAPE_TICKS: Counter = Counter::new(
        "scrape_ticks_total",
        "Total number of ingestion ticks that committed a batch"
    ).unwrap();

    pub static ref SCRAPE_FETCH_FAILURES: Counter = Counter::new(
        "scrape_fetch_failures_total",
        "Total number of source fetches that failed or timed out"
    ).unwrap();

    pub static ref PRICE_PARSE_REJECTS: Counter = Counter::new(
        "price_parse_rejects_total",
        "Total number of combined records dropped for unparseable prices"
    ).unwrap();

    pub static ref QUOTES_UPSERTED: Counter = Counter::new(
        "quotes_upserted_total",
        "Total number of combined records written to the store"
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(SCRAPE_TICKS.clone())).unwrap();
    REGISTRY.register(Box::new(SCRAPE_FETCH_FAILURES.clone())).unwrap();
    REGISTRY.register(Box::new(PRICE_PARSE_REJECTS.clone())).unwrap();
    REGISTRY.register(Box::new(QUOTES_UPSERTED.clone())).unwrap();
}
