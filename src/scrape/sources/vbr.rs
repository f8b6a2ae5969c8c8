use async_trait::async_trait;
use scraper::{Html, Selector};
use crate::error::{Error, Result};
use crate::scrape::sources::QuoteSource;
use crate::scrape::RawQuotes;
use crate::types::source::Source;

/// VBR lists quotes in a plain table: symbol in the first cell, dollar price
/// in the third with a trailing " $".
pub struct VbrSource {
    client: reqwest::Client,
    url: String,
}

impl VbrSource {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        VbrSource {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for VbrSource {
    async fn fetch(&self) -> Result<RawQuotes> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::UpstreamFetch {
                source: Source::Vbr,
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::UpstreamFetch {
                source: Source::Vbr,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| Error::UpstreamFetch {
            source: Source::Vbr,
            reason: e.to_string(),
        })?;

        Ok(parse_quote_table(&body))
    }

    fn source(&self) -> Source {
        Source::Vbr
    }
}

fn parse_quote_table(html: &str) -> RawQuotes {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr").unwrap();
    let name_selector = Selector::parse("td:nth-child(1) span").unwrap();
    let price_selector = Selector::parse("td:nth-child(3) div").unwrap();

    let mut quotes = RawQuotes::new();
    for row in document.select(&row_selector) {
        let name = row.select(&name_selector).next();
        let price = row.select(&price_selector).next();
        if let (Some(name), Some(price)) = (name, price) {
            let name = name.text().collect::<String>().trim().to_string();
            let price = price
                .text()
                .collect::<String>()
                .replace(" $", "")
                .trim()
                .to_string();
            if !name.is_empty() {
                quotes.insert(name, price);
            }
        }
    }
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body><table><tbody>
            <tr>
                <td><span>BTC</span></td><td>Bitcoin</td><td><div>95 657,46 $</div></td>
            </tr>
            <tr>
                <td><span>ETH</span></td><td>Ethereum</td><td><div>3 322,11 $</div></td>
            </tr>
            <tr>
                <td>no span here</td><td>broken</td><td>row</td>
            </tr>
        </tbody></table></body></html>"#;

    #[test]
    fn parses_rows_and_skips_malformed_ones() {
        let quotes = parse_quote_table(PAGE);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["BTC"], "95 657,46");
        assert_eq!(quotes["ETH"], "3 322,11");
    }

    #[tokio::test]
    async fn fetches_and_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let source = VbrSource::new(reqwest::Client::new(), &server.uri());
        let quotes = source.fetch().await.unwrap();
        assert_eq!(quotes["BTC"], "95 657,46");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = VbrSource::new(reqwest::Client::new(), &server.uri());
        assert!(matches!(
            source.fetch().await,
            Err(Error::UpstreamFetch { source: Source::Vbr, .. })
        ));
    }
}
