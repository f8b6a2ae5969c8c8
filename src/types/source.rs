use std::fmt;
use std::str::FromStr;
use crate::error::Error;

/// The three quote providers. Every persisted price row belongs to exactly
/// one of these; the order of `ALL` is the tie-break priority for max/min.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Vbr,
    Investing,
    BitInfo,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Vbr, Source::Investing, Source::BitInfo];

    /// Canonical display name, as accepted in filter requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Vbr => "VBR",
            Source::Investing => "Investing",
            Source::BitInfo => "BitInfo",
        }
    }

    /// Lowercase key used in URL paths and compare-response objects.
    pub fn key(&self) -> &'static str {
        match self {
            Source::Vbr => "vbr",
            Source::Investing => "investing",
            Source::BitInfo => "bitinfo",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Source::Vbr => "vbr_prices",
            Source::Investing => "investing_prices",
            Source::BitInfo => "bitinfo_prices",
        }
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for source in Source::ALL {
            if s.eq_ignore_ascii_case(source.key()) {
                return Ok(source);
            }
        }
        Err(Error::InvalidSource(s.to_string()))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// `Source` appears in the `source:` field of several `Error` variants, which
// makes thiserror treat it as the error source and require this bound.
impl std::error::Error for Source {}
