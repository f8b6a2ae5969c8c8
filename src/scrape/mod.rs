pub mod sources;
pub mod reconciler;
pub mod scheduler;

use std::collections::HashMap;

/// Raw scrape output of one source: currency symbol -> price string exactly
/// as displayed on the page (locale separators and all). Normalization
/// happens in the reconciler.
pub type RawQuotes = HashMap<String, String>;
