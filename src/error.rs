use thiserror::Error;
use crate::types::source::Source;

#[derive(Error, Debug)]
pub enum Error {
    // Scrape Errors
    #[error("Upstream fetch failed for {source}: {reason}")]
    UpstreamFetch {
        source: Source,
        reason: String,
    },

    #[error("Unparseable price {raw:?} for {currency}")]
    PriceParse {
        currency: String,
        raw: String,
    },

    // Store Errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Query Errors
    #[error("Invalid source: {0}. Valid sources: VBR, Investing, BitInfo")]
    InvalidSource(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Currency {0} not found in any source")]
    CurrencyNotFound(String),

    #[error("No quote for {currency} from {source}")]
    SourceQuoteMissing {
        source: Source,
        currency: String,
    },

    #[error("No results found in the specified price range")]
    EmptyRange,

    // Auth Errors
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    TokenRejected,

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
