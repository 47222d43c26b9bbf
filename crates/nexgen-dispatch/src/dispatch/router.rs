use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::Priority;
use super::scoring::WeightInput;
use super::service::DispatchService;
use super::RecommendationError;
use crate::reference::DataLoadError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub order_id: String,
    pub weights: WeightInput,
}

/// Sidebar filters shared by the order table and dashboard endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilterQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl OrderFilterQuery {
    pub fn parse_priority(&self) -> Result<Option<Priority>, String> {
        self.priority
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<Priority>)
            .transpose()
    }

    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }
}

/// Router exposing recommendation, filtering, dashboard and reload endpoints.
pub fn dispatch_router(service: Arc<DispatchService>) -> Router {
    Router::new()
        .route("/api/v1/dispatch/recommendations", post(recommend_handler))
        .route("/api/v1/dispatch/orders", get(orders_handler))
        .route("/api/v1/dispatch/dashboard", get(dashboard_handler))
        .route("/api/v1/dispatch/reference", get(reference_handler))
        .route("/api/v1/dispatch/reference/reload", post(reload_handler))
        .with_state(service)
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<DispatchService>>,
    axum::Json(request): axum::Json<RecommendationRequest>,
) -> Response {
    match service.recommend(&request.order_id, request.weights) {
        Ok(recommendation) => (StatusCode::OK, axum::Json(recommendation)).into_response(),
        Err(error @ RecommendationError::UnknownOrder(_)) => {
            error_response(StatusCode::NOT_FOUND, error.to_string())
        }
        Err(
            error @ (RecommendationError::InvalidWeights(_)
            | RecommendationError::RouteUnavailable(_)),
        ) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

pub(crate) async fn orders_handler(
    State(service): State<Arc<DispatchService>>,
    Query(query): Query<OrderFilterQuery>,
) -> Response {
    match query.parse_priority() {
        Ok(priority) => {
            let table = service.orders(query.category(), priority);
            (StatusCode::OK, axum::Json(table)).into_response()
        }
        Err(error) => error_response(StatusCode::BAD_REQUEST, error),
    }
}

pub(crate) async fn dashboard_handler(
    State(service): State<Arc<DispatchService>>,
    Query(query): Query<OrderFilterQuery>,
) -> Response {
    match query.parse_priority() {
        Ok(priority) => {
            let summary = service.dashboard(query.category(), priority);
            (StatusCode::OK, axum::Json(summary)).into_response()
        }
        Err(error) => error_response(StatusCode::BAD_REQUEST, error),
    }
}

pub(crate) async fn reference_handler(State(service): State<Arc<DispatchService>>) -> Response {
    (StatusCode::OK, axum::Json(service.reference_summary())).into_response()
}

pub(crate) async fn reload_handler(State(service): State<Arc<DispatchService>>) -> Response {
    match service.reload() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error @ DataLoadError::NotReloadable) => {
            error_response(StatusCode::CONFLICT, error.to_string())
        }
        Err(error) => error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
