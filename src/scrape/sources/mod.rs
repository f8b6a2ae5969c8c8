pub mod vbr;
pub mod investing;
pub mod bitinfo;

use async_trait::async_trait;
use crate::error::Result;
use crate::scrape::RawQuotes;
use crate::types::source::Source;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the source's price page and extract its quote table. Individual
    /// malformed rows are skipped; only transport-level failures error.
    async fn fetch(&self) -> Result<RawQuotes>;
    fn source(&self) -> Source;
}
