use async_trait::async_trait;
use scraper::{Html, Selector};
use crate::error::{Error, Result};
use crate::scrape::sources::QuoteSource;
use crate::scrape::RawQuotes;
use crate::types::source::Source;

/// Investing buries its quote table a few container divs deep; the selector
/// chain below pins the first table of the second content column. Symbol is
/// the third cell, price the span inside the fourth.
pub struct InvestingSource {
    client: reqwest::Client,
    url: String,
}

impl InvestingSource {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        InvestingSource {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for InvestingSource {
    async fn fetch(&self) -> Result<RawQuotes> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::UpstreamFetch {
                source: Source::Investing,
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::UpstreamFetch {
                source: Source::Investing,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| Error::UpstreamFetch {
            source: Source::Investing,
            reason: e.to_string(),
        })?;

        Ok(parse_quote_table(&body))
    }

    fn source(&self) -> Source {
        Source::Investing
    }
}

fn parse_quote_table(html: &str) -> RawQuotes {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse(
        "div:nth-of-type(5) > div > div:nth-of-type(2) > div:nth-of-type(1) > table > tbody > tr",
    )
    .unwrap();
    let name_selector = Selector::parse("td:nth-of-type(3)").unwrap();
    let price_selector = Selector::parse("td:nth-of-type(4) > span").unwrap();

    let mut quotes = RawQuotes::new();
    for row in document.select(&row_selector) {
        let name = row.select(&name_selector).next();
        let price = row.select(&price_selector).next();
        if let (Some(name), Some(price)) = (name, price) {
            let name = name.text().collect::<String>().trim().to_string();
            let price = price.text().collect::<String>().trim().to_string();
            if !name.is_empty() {
                quotes.insert(name, price);
            }
        }
    }
    quotes
}
