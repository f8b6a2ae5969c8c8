use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use CoinScope::api::auth::JwtAuth;
use CoinScope::api::rest::{create_router, ApiState};
use CoinScope::config::AppConfig;
use CoinScope::observability::metrics;
use CoinScope::scrape::scheduler::ScrapeTicker;
use CoinScope::scrape::sources::bitinfo::BitInfoSource;
use CoinScope::scrape::sources::investing::InvestingSource;
use CoinScope::scrape::sources::vbr::VbrSource;
use CoinScope::service::accounts::AccountService;
use CoinScope::service::quotes::QuoteService;
use CoinScope::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    metrics::register_metrics();

    let store = Store::open(&config.database.path).context("opening store")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.scrape.fetch_timeout_secs))
        .build()
        .context("building scrape client")?;

    let ticker = ScrapeTicker::new(
        Box::new(VbrSource::new(client.clone(), &config.scrape.vbr_url)),
        Box::new(InvestingSource::new(client.clone(), &config.scrape.investing_url)),
        Box::new(BitInfoSource::new(client, &config.scrape.bitinfo_url)),
        store.clone(),
        Duration::from_secs(config.scrape.interval_secs),
    );
    tokio::spawn(ticker.run());

    let state = Arc::new(ApiState {
        quotes: QuoteService::new(store.clone()),
        accounts: AccountService::new(store),
        jwt: JwtAuth::new(&config.auth.secret, &config.auth.algorithm)?,
        token_ttl_secs: config.auth.token_ttl_secs,
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
