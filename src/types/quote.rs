use serde::Serialize;
use crate::types::source::Source;

/// One persisted quote row from a single source table.
#[derive(Clone, Debug, Serialize)]
pub struct PriceQuote {
    pub currency: String,
    pub price: f64,
    /// Unix seconds of the ingestion tick that last wrote this row.
    pub timestamp: i64,
}

/// One currency's reconciled prices across all three sources, produced once
/// per ingestion tick. Never persisted as-is; the store splits it into the
/// per-source tables.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedRecord {
    pub currency: String,
    pub vbr: f64,
    pub investing: f64,
    pub bitinfo: f64,
}

impl CombinedRecord {
    pub fn price(&self, source: Source) -> f64 {
        match source {
            Source::Vbr => self.vbr,
            Source::Investing => self.investing,
            Source::BitInfo => self.bitinfo,
        }
    }
}
