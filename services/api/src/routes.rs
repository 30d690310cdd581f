use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use realty_market::listings::query::{Band, SortOption, AREA_BANDS, LAND_AREA_BANDS, PRICE_BANDS};
use serde::Serialize;
use serde_json::json;

/// Option lists the browse page renders its filter dropdowns from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilterOptions {
    pub(crate) price: Vec<&'static str>,
    pub(crate) area: Vec<&'static str>,
    pub(crate) land_area: Vec<&'static str>,
    pub(crate) sort: Vec<&'static str>,
}

pub(crate) fn with_service_routes(router: Router) -> Router {
    router
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/filters", get(filter_options_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn band_labels(bands: &[(&'static str, Band)]) -> Vec<&'static str> {
    bands.iter().map(|(label, _)| *label).collect()
}

pub(crate) async fn filter_options_endpoint() -> Json<FilterOptions> {
    Json(FilterOptions {
        price: band_labels(&PRICE_BANDS),
        area: band_labels(&AREA_BANDS),
        land_area: band_labels(&LAND_AREA_BANDS),
        sort: SortOption::ordered()
            .into_iter()
            .filter_map(SortOption::label)
            .collect(),
    })
}
