//! Merges the three raw scrape maps into ordered combined records.
//!
//! A currency makes it into a tick's batch only when every source quoted it
//! and every one of the three price strings normalizes to a positive number.
//! Sources disagree on locale formatting (comma decimals, space or dot
//! thousands separators), so normalization happens here, in one place,
//! rather than per adapter.

use tracing::warn;
use crate::error::{Error, Result};
use crate::scrape::RawQuotes;
use crate::types::quote::CombinedRecord;

/// Display order of the supported currencies. Anything a source quotes
/// outside this list is dropped before persistence.
pub const CURRENCY_ORDER: [&str; 9] = [
    "SOL", "BTC", "LINK", "DOGE", "ADA", "BNB", "LTC", "ETH", "XRP",
];

/// Reduce a scraped price string to a number. Whitespace (including NBSP
/// thousands separators) is stripped, a comma decimal becomes a dot, and
/// when dots are left doing double duty as thousands separators only the
/// rightmost survives as the decimal point.
pub fn normalize_price(currency: &str, raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace(',', ".");

    let cleaned = match cleaned.rfind('.') {
        Some(last) => cleaned
            .char_indices()
            .filter(|&(i, c)| c != '.' || i == last)
            .map(|(_, c)| c)
            .collect(),
        None => cleaned,
    };

    let parse_error = || Error::PriceParse {
        currency: currency.to_string(),
        raw: raw.to_string(),
    };

    let price: f64 = cleaned.parse().map_err(|_| parse_error())?;
    if !price.is_finite() || price <= 0.0 {
        return Err(parse_error());
    }
    Ok(price)
}

/// Combine the three raw maps into one record per currency quoted by all
/// three sources, in `CURRENCY_ORDER`. A record whose prices do not all
/// normalize is dropped with a warning; the rest of the batch is unaffected.
pub fn reconcile(vbr: &RawQuotes, investing: &RawQuotes, bitinfo: &RawQuotes) -> Vec<CombinedRecord> {
    let mut records = Vec::new();

    for &currency in CURRENCY_ORDER.iter() {
        let (Some(raw_vbr), Some(raw_investing), Some(raw_bitinfo)) = (
            vbr.get(currency),
            investing.get(currency),
            bitinfo.get(currency),
        ) else {
            continue;
        };

        let normalized = normalize_price(currency, raw_vbr).and_then(|vbr_price| {
            let investing_price = normalize_price(currency, raw_investing)?;
            let bitinfo_price = normalize_price(currency, raw_bitinfo)?;
            Ok(CombinedRecord {
                currency: currency.to_string(),
                vbr: vbr_price,
                investing: investing_price,
                bitinfo: bitinfo_price,
            })
        });

        match normalized {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Dropping {currency} from this tick: {e}");
                crate::observability::metrics::PRICE_PARSE_REJECTS.inc();
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn quotes(pairs: &[(&str, &str)]) -> RawQuotes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn normalizes_locale_separators() {
        assert_eq!(normalize_price("BTC", "95 657,46").unwrap(), 95657.46);
        assert_eq!(normalize_price("BTC", "95.657,5").unwrap(), 95657.5);
        assert_eq!(normalize_price("BTC", "1.234.567.89").unwrap(), 1234567.89);
        assert_eq!(normalize_price("DOGE", "0.31").unwrap(), 0.31);
        assert_eq!(normalize_price("ADA", "42").unwrap(), 42.0);
    }

    #[test]
    fn rejects_garbage_and_non_positive_prices() {
        assert!(normalize_price("BTC", "n/a").is_err());
        assert!(normalize_price("BTC", "").is_err());
        assert!(normalize_price("BTC", "-5,0").is_err());
        assert!(normalize_price("BTC", "0").is_err());
    }

    #[test]
    fn keeps_only_currencies_present_in_all_sources() {
        let vbr = quotes(&[("BTC", "100,0"), ("ETH", "10,0"), ("SOL", "1,0")]);
        let investing = quotes(&[("BTC", "101,0"), ("SOL", "1,1")]);
        let bitinfo = quotes(&[("BTC", "99.0"), ("SOL", "0.9"), ("XRP", "2.0")]);

        let records = reconcile(&vbr, &investing, &bitinfo);
        let currencies: Vec<_> = records.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(currencies, vec!["SOL", "BTC"]);
    }

    #[test]
    fn output_follows_fixed_priority_order() {
        let all = quotes(&[
            ("XRP", "1"), ("ETH", "2"), ("BTC", "3"), ("SOL", "4"), ("ADA", "5"),
        ]);
        let records = reconcile(&all, &all, &all);
        let currencies: Vec<_> = records.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(currencies, vec!["SOL", "BTC", "ADA", "ETH", "XRP"]);
    }

    #[test]
    fn drops_currencies_outside_the_priority_list() {
        let all = quotes(&[("TRX", "1,0"), ("BTC", "2,0")]);
        let records = reconcile(&all, &all, &all);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].currency, "BTC");
    }

    #[test]
    fn a_bad_price_drops_one_record_not_the_batch() {
        let vbr = quotes(&[("BTC", "100,0"), ("ETH", "broken")]);
        let investing = quotes(&[("BTC", "101,0"), ("ETH", "11,0")]);
        let bitinfo = quotes(&[("BTC", "99.0"), ("ETH", "9.0")]);

        let records = reconcile(&vbr, &investing, &bitinfo);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].currency, "BTC");
        assert_eq!(records[0].investing, 101.0);
    }

    #[test]
    fn empty_source_yields_empty_batch() {
        let full = quotes(&[("BTC", "100,0")]);
        let empty = HashMap::new();
        assert!(reconcile(&full, &empty, &full).is_empty());
    }
}
