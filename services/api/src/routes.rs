use crate::infra::{write_orders_csv, AppState};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use nexgen_dispatch::dispatch::router::OrderFilterQuery;
use nexgen_dispatch::dispatch::{dispatch_router, DispatchService};
use nexgen_dispatch::error::AppError;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes(service: Arc<DispatchService>) -> axum::Router {
    dispatch_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/dispatch/orders/export",
            axum::routing::get(export_orders_endpoint),
        )
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
        json!({
            "status": "ready",
            "reference": state.service.reference_summary(),
        })
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

/// The filtered order table as a CSV attachment.
pub(crate) async fn export_orders_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<OrderFilterQuery>,
) -> Result<Response, AppError> {
    let priority = match query.parse_priority() {
        Ok(priority) => priority,
        Err(error) => {
            return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response())
        }
    };

    let table = state.service.orders(query.category(), priority);
    let body = write_orders_csv(&table, Vec::new())?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"filtered_orders.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
