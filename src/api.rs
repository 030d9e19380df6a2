//! HTTP surface: price history API, liveness probe and static frontend.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path as FsPath;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, instrument, warn};

use crate::core::{Asset, Currency, HistoryError, LookbackYears, PricePoint};
use crate::history::HistoryAssembler;

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        let status = match &self {
            HistoryError::InvalidQuery(_) | HistoryError::InvalidYears(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            HistoryError::UnsupportedAsset(_) | HistoryError::UnsupportedCurrency(_) => {
                StatusCode::BAD_REQUEST
            }
            HistoryError::UpstreamUnavailable { symbol, reason } => {
                warn!(%symbol, %reason, "Upstream fetch failed");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    /// Lookback window in years (1-10)
    #[serde(default = "default_years")]
    pub years: u32,

    /// Display currency key: usd or jpy
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_years() -> u32 {
    1
}

fn default_currency() -> String {
    Currency::BASE.key().to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceHistoryResponse {
    pub asset: String,
    pub symbol: String,
    pub years: u32,
    pub currency: String,
    pub prices: Vec<PricePoint>,
}

/// GET /health - Liveness probe, never touches the upstream
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/prices/{asset}?years=1&currency=usd
#[instrument(skip_all, fields(asset = %asset))]
async fn get_prices_handler(
    State(assembler): State<HistoryAssembler>,
    Path(asset): Path<String>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> Result<Json<PriceHistoryResponse>, HistoryError> {
    let Query(params) = query.map_err(|e| HistoryError::InvalidQuery(e.body_text()))?;
    let years = LookbackYears::try_from(params.years)?;
    let asset: Asset = asset.parse()?;
    let currency: Currency = params.currency.parse()?;

    let prices = assembler
        .assemble(asset.symbol(), years, currency)
        .await?;
    info!(
        %asset,
        currency = currency.code(),
        points = prices.len(),
        "Served price history"
    );

    Ok(Json(PriceHistoryResponse {
        asset: asset.key().to_string(),
        symbol: asset.symbol().to_string(),
        years: years.get(),
        currency: currency.key().to_string(),
        prices,
    }))
}

/// Builds the application router. The frontend is mounted at `/` only when
/// `frontend_dir` exists.
pub fn create_router(assembler: HistoryAssembler, frontend_dir: Option<&FsPath>) -> Router {
    let api = Router::new().route("/prices/{asset}", get(get_prices_handler));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(assembler);

    match frontend_dir {
        Some(dir) if dir.is_dir() => {
            info!("Serving frontend from {}", dir.display());
            router = router
                .fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => info!("No frontend at {}, serving API only", dir.display()),
        None => {}
    }

    router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
