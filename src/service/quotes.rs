//! Read-only aggregation operations over the per-source price tables.
//!
//! All currency matching is case-insensitive. Results come from whatever the
//! last committed ingestion tick left in the store; nothing here writes.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::quote::PriceQuote;
use crate::types::source::Source;

/// Precision for conversion results. The stored quotes only carry a few
/// significant decimals, so 8 places keeps round-trips stable without
/// implying accuracy that is not there.
const CONVERSION_DECIMALS: i32 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub currency: String,
    pub vbr: Option<f64>,
    pub investing: Option<f64>,
    pub bitinfo: Option<f64>,
}

impl Comparison {
    fn price(&self, source: Source) -> Option<f64> {
        match source {
            Source::Vbr => self.vbr,
            Source::Investing => self.investing,
            Source::BitInfo => self.bitinfo,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceExtreme {
    pub currency: String,
    pub price: f64,
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub converted_price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilteredQuote {
    pub currency: String,
    pub price: f64,
    pub source: Source,
}

#[derive(Clone)]
pub struct QuoteService {
    store: Store,
}

impl QuoteService {
    pub fn new(store: Store) -> Self {
        QuoteService { store }
    }

    /// All stored rows of one source table.
    pub fn prices_by_source(&self, source: Source) -> Result<Vec<PriceQuote>> {
        self.store.list_quotes(source)
    }

    /// Latest price per source for one currency. Sources without a row come
    /// back as `None`; only a currency absent from every source is an error.
    pub fn compare(&self, currency: &str) -> Result<Comparison> {
        let comparison = Comparison {
            currency: currency.to_uppercase(),
            vbr: self.latest_price(Source::Vbr, currency)?,
            investing: self.latest_price(Source::Investing, currency)?,
            bitinfo: self.latest_price(Source::BitInfo, currency)?,
        };

        if comparison.vbr.is_none() && comparison.investing.is_none() && comparison.bitinfo.is_none() {
            return Err(Error::CurrencyNotFound(currency.to_uppercase()));
        }
        Ok(comparison)
    }

    /// Highest price across sources; on a tie the earlier source in
    /// `Source::ALL` wins the attribution.
    pub fn max_price(&self, currency: &str) -> Result<PriceExtreme> {
        self.extreme(currency, |candidate, best| candidate > best)
    }

    /// Lowest price across sources, tie-broken like `max_price`.
    pub fn min_price(&self, currency: &str) -> Result<PriceExtreme> {
        self.extreme(currency, |candidate, best| candidate < best)
    }

    /// Convert `amount` between two currencies using one source's quotes for
    /// both sides. Rate and result are rounded to `CONVERSION_DECIMALS`.
    pub fn convert(
        &self,
        from_currency: &str,
        to_currency: &str,
        amount: f64,
        source: Source,
    ) -> Result<Conversion> {
        let from_price = self
            .latest_price(source, from_currency)?
            .ok_or_else(|| Error::SourceQuoteMissing {
                source,
                currency: from_currency.to_uppercase(),
            })?;
        let to_price = self
            .latest_price(source, to_currency)?
            .ok_or_else(|| Error::SourceQuoteMissing {
                source,
                currency: to_currency.to_uppercase(),
            })?;

        let rate = from_price / to_price;
        Ok(Conversion {
            from_currency: from_currency.to_uppercase(),
            to_currency: to_currency.to_uppercase(),
            rate: round_to(rate, CONVERSION_DECIMALS),
            converted_price: round_to(amount * rate, CONVERSION_DECIMALS),
        })
    }

    /// Rows with min <= price <= max across the selected source table, or the
    /// union of all three when no source is given.
    pub fn filter_by_range(
        &self,
        min_price: f64,
        max_price: f64,
        source: Option<&str>,
    ) -> Result<Vec<FilteredQuote>> {
        if min_price > max_price {
            return Err(Error::InvalidRequest(
                "min_price must not exceed max_price".to_string(),
            ));
        }

        let sources: Vec<Source> = match source {
            Some(name) => vec![name.parse()?],
            None => Source::ALL.to_vec(),
        };

        let mut quotes = Vec::new();
        for source in sources {
            for (currency, price) in self.store.quotes_in_range(source, min_price, max_price)? {
                quotes.push(FilteredQuote {
                    currency,
                    price,
                    source,
                });
            }
        }

        if quotes.is_empty() {
            return Err(Error::EmptyRange);
        }
        Ok(quotes)
    }

    /// The `limit` highest-priced rows across all sources combined,
    /// descending. A currency can appear once per source.
    pub fn top_n(&self, limit: usize) -> Result<Vec<FilteredQuote>> {
        Ok(self
            .store
            .top_quotes(limit)?
            .into_iter()
            .map(|(currency, price, source)| FilteredQuote {
                currency,
                price,
                source,
            })
            .collect())
    }

    fn latest_price(&self, source: Source, currency: &str) -> Result<Option<f64>> {
        Ok(self.store.latest_quote(source, currency)?.map(|q| q.price))
    }

    fn extreme(&self, currency: &str, better: fn(f64, f64) -> bool) -> Result<PriceExtreme> {
        let comparison = self.compare(currency)?;

        let mut best: Option<(f64, Source)> = None;
        for source in Source::ALL {
            if let Some(price) = comparison.price(source) {
                match best {
                    Some((best_price, _)) if !better(price, best_price) => {}
                    _ => best = Some((price, source)),
                }
            }
        }

        // compare() already guaranteed at least one source has a row.
        let (price, source) = best.expect("at least one price");
        Ok(PriceExtreme {
            currency: comparison.currency,
            price,
            source,
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::quote::CombinedRecord;

    fn seeded_service() -> QuoteService {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_tick(&[
                CombinedRecord {
                    currency: "BTC".to_string(),
                    vbr: 100.0,
                    investing: 105.0,
                    bitinfo: 95.0,
                },
                CombinedRecord {
                    currency: "ETH".to_string(),
                    vbr: 10.0,
                    investing: 10.5,
                    bitinfo: 9.5,
                },
            ])
            .unwrap();
        QuoteService::new(store)
    }

    #[test]
    fn compare_is_case_insensitive_and_reports_gaps() {
        let service = seeded_service();

        let comparison = service.compare("btc").unwrap();
        assert_eq!(comparison.currency, "BTC");
        assert_eq!(comparison.vbr, Some(100.0));
        assert_eq!(comparison.investing, Some(105.0));
        assert_eq!(comparison.bitinfo, Some(95.0));

        assert!(matches!(
            service.compare("XRP"),
            Err(Error::CurrencyNotFound(c)) if c == "XRP"
        ));
    }

    #[test]
    fn compare_returns_none_for_sources_without_a_row() {
        let store = Store::open_in_memory().unwrap();
        // Seed only the Investing table.
        store
            .conn()
            .execute(
                "INSERT INTO investing_prices (currency, price, timestamp) VALUES ('ADA', 1.5, 0)",
                [],
            )
            .unwrap();

        let service = QuoteService::new(store);
        let comparison = service.compare("ADA").unwrap();
        assert_eq!(comparison.vbr, None);
        assert_eq!(comparison.investing, Some(1.5));
        assert_eq!(comparison.bitinfo, None);
    }

    #[test]
    fn max_and_min_attribute_the_source() {
        let service = seeded_service();

        let max = service.max_price("BTC").unwrap();
        assert_eq!(max.price, 105.0);
        assert_eq!(max.source, Source::Investing);

        let min = service.min_price("BTC").unwrap();
        assert_eq!(min.price, 95.0);
        assert_eq!(min.source, Source::BitInfo);
    }

    #[test]
    fn extremes_tie_break_by_source_priority() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_tick(&[CombinedRecord {
                currency: "LTC".to_string(),
                vbr: 50.0,
                investing: 50.0,
                bitinfo: 50.0,
            }])
            .unwrap();
        let service = QuoteService::new(store);

        assert_eq!(service.max_price("LTC").unwrap().source, Source::Vbr);
        assert_eq!(service.min_price("LTC").unwrap().source, Source::Vbr);
    }

    #[test]
    fn convert_round_trips_within_rounding_tolerance() {
        let service = seeded_service();

        let there = service.convert("BTC", "ETH", 2.0, Source::Vbr).unwrap();
        assert_eq!(there.rate, 10.0);
        assert_eq!(there.converted_price, 20.0);

        let back = service
            .convert("ETH", "BTC", there.converted_price, Source::Vbr)
            .unwrap();
        assert!((back.converted_price - 2.0).abs() < 1e-6);
    }

    #[test]
    fn convert_requires_both_quotes_under_the_same_source() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO vbr_prices (currency, price, timestamp) VALUES ('BTC', 100.0, 0)",
                [],
            )
            .unwrap();
        let service = QuoteService::new(store);

        assert!(matches!(
            service.convert("BTC", "ETH", 1.0, Source::Vbr),
            Err(Error::SourceQuoteMissing { source: Source::Vbr, currency }) if currency == "ETH"
        ));
    }

    #[test]
    fn filter_unions_all_sources_when_none_is_given() {
        let service = seeded_service();

        let quotes = service.filter_by_range(90.0, 110.0, None).unwrap();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.iter().all(|q| q.currency == "BTC"));

        let sources: Vec<_> = quotes.iter().map(|q| q.source).collect();
        assert!(sources.contains(&Source::Vbr));
        assert!(sources.contains(&Source::Investing));
        assert!(sources.contains(&Source::BitInfo));
    }

    #[test]
    fn filter_validates_the_source_name() {
        let service = seeded_service();
        assert!(matches!(
            service.filter_by_range(50.0, 150.0, Some("Unknown")),
            Err(Error::InvalidSource(s)) if s == "Unknown"
        ));
        // Case-insensitive on valid names.
        let quotes = service.filter_by_range(90.0, 110.0, Some("VBR")).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, Source::Vbr);
    }

    #[test]
    fn filter_with_no_matches_is_not_found() {
        let service = seeded_service();
        assert!(matches!(
            service.filter_by_range(1000.0, 2000.0, None),
            Err(Error::EmptyRange)
        ));
    }

    #[test]
    fn top_n_is_descending_and_truncated() {
        let service = seeded_service();
        let top = service.top_n(3).unwrap();
        let prices: Vec<_> = top.iter().map(|q| q.price).collect();
        assert_eq!(prices, vec![105.0, 100.0, 95.0]);
    }
}
