use serde::Deserialize;

pub mod loader;

pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "coinscope.db".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            secret: "change_me_in_production".to_string(),
            algorithm: "HS256".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScrapeConfig {
    pub interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub vbr_url: String,
    pub investing_url: String,
    pub bitinfo_url: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            interval_secs: 120,
            fetch_timeout_secs: 15,
            vbr_url: "https://www.vbr.ru/crypto/".to_string(),
            investing_url: "https://ru.investing.com/crypto".to_string(),
            bitinfo_url: "https://bitinfocharts.com/ru/crypto-kurs/".to_string(),
        }
    }
}
