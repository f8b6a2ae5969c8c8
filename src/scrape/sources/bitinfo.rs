use async_trait::async_trait;
use scraper::{Html, Selector};
use crate::error::{Error, Result};
use crate::scrape::sources::QuoteSource;
use crate::scrape::RawQuotes;
use crate::types::source::Source;

/// BitInfo's first cell holds "SYMBOL Full Name"; the symbol is the first
/// word. Prices are links with currency signs and thin spaces mixed in, so
/// everything but digits and dots is dropped here.
pub struct BitInfoSource {
    client: reqwest::Client,
    url: String,
}

impl BitInfoSource {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        BitInfoSource {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for BitInfoSource {
    async fn fetch(&self) -> Result<RawQuotes> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::UpstreamFetch {
                source: Source::BitInfo,
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::UpstreamFetch {
                source: Source::BitInfo,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| Error::UpstreamFetch {
            source: Source::BitInfo,
            reason: e.to_string(),
        })?;

        Ok(parse_quote_table(&body))
    }

    fn source(&self) -> Source {
        Source::BitInfo
    }
}

fn parse_quote_table(html: &str) -> RawQuotes {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr").unwrap();
    let name_selector = Selector::parse("td:nth-of-type(1)").unwrap();
    let price_selector = Selector::parse("td:nth-of-type(2) a").unwrap();

    let mut quotes = RawQuotes::new();
    for row in document.select(&row_selector) {
        let name = row.select(&name_selector).next();
        let price = row.select(&price_selector).next();
        if let (Some(name), Some(price)) = (name, price) {
            let name = name.text().collect::<String>();
            let Some(symbol) = name.split_whitespace().next() else {
                continue;
            };
            let price: String = price
                .text()
                .collect::<String>()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            quotes.insert(symbol.to_string(), price);
        }
    }
    quotes
}
