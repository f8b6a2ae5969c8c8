use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::api::auth::{require_auth, JwtAuth};
use crate::error::Error;
use crate::observability::metrics::REGISTRY;
use crate::service::accounts::AccountService;
use crate::service::quotes::QuoteService;
use crate::types::source::Source;

pub struct ApiState {
    pub quotes: QuoteService,
    pub accounts: AccountService,
    pub jwt: JwtAuth,
    pub token_ttl_secs: u64,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    let protected = Router::new()
        .route("/prices/top", get(top_prices))
        .route("/prices/compare/:currency", get(compare_prices))
        .route("/prices/max/:currency", get(max_price))
        .route("/prices/min/:currency", get(min_price))
        .route("/prices/filter", post(filter_prices))
        .route("/prices/:source", get(prices_by_source))
        .route("/convert", post(convert_currency))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidSource(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::TokenRejected | Error::AuthenticationError(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::EmailTaken => StatusCode::CONFLICT,
            Error::CurrencyNotFound(_) | Error::SourceQuoteMissing { .. } | Error::EmptyRange => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error serving request: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_metrics() -> std::result::Result<String, StatusCode> {
    prometheus::TextEncoder::new()
        .encode_to_string(&REGISTRY.gather())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn register(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, Error> {
    state.accounts.register(&req.username, &req.email, &req.password)?;
    Ok(Json(MessageResponse {
        message: "Registration successful".to_string(),
    }))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

async fn login(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, Error> {
    let token = state
        .accounts
        .login(&state.jwt, state.token_ttl_secs, &req.email, &req.password)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Serialize)]
struct PriceResponse {
    currency: String,
    price: f64,
    timestamp: String,
}

async fn prices_by_source(
    State(state): State<Arc<ApiState>>,
    Path(source): Path<String>,
) -> Result<Json<Vec<PriceResponse>>, Error> {
    let source: Source = source.parse()?;
    let quotes = state.quotes.prices_by_source(source)?;

    Ok(Json(
        quotes
            .into_iter()
            .map(|q| PriceResponse {
                currency: q.currency,
                price: q.price,
                timestamp: render_timestamp(q.timestamp),
            })
            .collect(),
    ))
}

#[derive(Serialize)]
struct CompareResponse {
    currency: String,
    prices: ComparePrices,
}

#[derive(Serialize)]
struct ComparePrices {
    vbr: Option<f64>,
    investing: Option<f64>,
    bitinfo: Option<f64>,
}

async fn compare_prices(
    State(state): State<Arc<ApiState>>,
    Path(currency): Path<String>,
) -> Result<Json<CompareResponse>, Error> {
    let comparison = state.quotes.compare(&currency)?;
    Ok(Json(CompareResponse {
        currency: comparison.currency,
        prices: ComparePrices {
            vbr: comparison.vbr,
            investing: comparison.investing,
            bitinfo: comparison.bitinfo,
        },
    }))
}

#[derive(Serialize)]
struct MaxPriceResponse {
    currency: String,
    max_price: f64,
    source: String,
}

async fn max_price(
    State(state): State<Arc<ApiState>>,
    Path(currency): Path<String>,
) -> Result<Json<MaxPriceResponse>, Error> {
    let extreme = state.quotes.max_price(&currency)?;
    Ok(Json(MaxPriceResponse {
        currency: extreme.currency,
        max_price: extreme.price,
        source: extreme.source.to_string(),
    }))
}

#[derive(Serialize)]
struct MinPriceResponse {
    currency: String,
    min_price: f64,
    source: String,
}

async fn min_price(
    State(state): State<Arc<ApiState>>,
    Path(currency): Path<String>,
) -> Result<Json<MinPriceResponse>, Error> {
    let extreme = state.quotes.min_price(&currency)?;
    Ok(Json(MinPriceResponse {
        currency: extreme.currency,
        min_price: extreme.price,
        source: extreme.source.to_string(),
    }))
}

#[derive(Deserialize)]
struct FilterRequest {
    min_price: f64,
    max_price: f64,
    source: Option<String>,
}

#[derive(Serialize)]
struct QuoteRow {
    currency: String,
    price: f64,
    source: String,
}

async fn filter_prices(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<Vec<QuoteRow>>, Error> {
    let quotes = state
        .quotes
        .filter_by_range(req.min_price, req.max_price, req.source.as_deref())?;
    Ok(Json(quotes.into_iter().map(quote_row).collect()))
}

#[derive(Deserialize)]
struct TopParams {
    limit: Option<usize>,
}

async fn top_prices(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TopParams>,
) -> Result<Json<Vec<QuoteRow>>, Error> {
    let quotes = state.quotes.top_n(params.limit.unwrap_or(3))?;
    Ok(Json(quotes.into_iter().map(quote_row).collect()))
}

#[derive(Deserialize)]
struct ConvertRequest {
    from_currency: String,
    to_currency: String,
    amount: f64,
    source: String,
}

#[derive(Serialize)]
struct ConvertResponse {
    from_currency: String,
    to_currency: String,
    rate: f64,
    converted_price: f64,
}

async fn convert_currency(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, Error> {
    let source: Source = req.source.parse()?;
    let conversion = state
        .quotes
        .convert(&req.from_currency, &req.to_currency, req.amount, source)?;
    Ok(Json(ConvertResponse {
        from_currency: conversion.from_currency,
        to_currency: conversion.to_currency,
        rate: conversion.rate,
        converted_price: conversion.converted_price,
    }))
}

fn quote_row(quote: crate::service::quotes::FilteredQuote) -> QuoteRow {
    QuoteRow {
        currency: quote.currency,
        price: quote.price,
        source: quote.source.to_string(),
    }
}

fn render_timestamp(unix_secs: i64) -> String {
    chrono::DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
