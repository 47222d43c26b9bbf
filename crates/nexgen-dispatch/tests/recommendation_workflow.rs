use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use nexgen_dispatch::dispatch::domain::VehicleId;
use nexgen_dispatch::dispatch::{
    dispatch_router, DispatchConfig, DispatchService, Priority, WeightInput,
};
use nexgen_dispatch::reference::{ReferenceLoader, ReferenceStore};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn service() -> DispatchService {
    let config = DispatchConfig::default();
    let store = ReferenceStore::open(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/reference"),
        ReferenceLoader::from_config(&config),
    )
    .expect("fixtures load");
    DispatchService::new(Arc::new(store), config)
}

fn balanced() -> WeightInput {
    WeightInput {
        cost: 0.5,
        speed: 0.3,
        sustainability: 0.2,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn perishable_order_is_routed_to_refrigerated_fleet() {
    let service = service();

    let ranked = service.recommend("ORD001", balanced()).expect("recommendation");

    assert_eq!(
        ranked.vehicle_ids(),
        vec![&VehicleId::from("VEH002"), &VehicleId::from("VEH001")]
    );
    let best = ranked.best().expect("best vehicle");
    let time_hours = 148.0 / 50.0 + 0.5;
    let overhead = 12.0 + 6.5 + 8.0 + 3.0 + 1.5;
    assert_close(best.predicted_time_hours, time_hours);
    assert_close(
        best.predicted_cost,
        148.0 / 7.2 * 1.5 + time_hours * 20.0 + 180.0 + overhead,
    );
    assert_close(best.predicted_co2_kg, 148.0 * 0.33);
    assert!(ranked.summary().starts_with("VEH002 (Refrigerated Unit) recommended for ORD001"));
}

#[test]
fn weights_reorder_standard_candidates() {
    let service = service();

    let by_cost = service
        .recommend(
            "ORD002",
            WeightInput {
                cost: 1.0,
                speed: 0.0,
                sustainability: 0.0,
            },
        )
        .expect("recommendation");
    assert_eq!(by_cost.best().map(|b| &b.vehicle_id), Some(&VehicleId::from("VEH003")));

    let ranked = service.recommend("ORD002", balanced()).expect("recommendation");
    assert_eq!(ranked.entries.len(), 2);
    assert!(ranked.entries[0].score >= ranked.entries[1].score);
}

#[test]
fn only_candidate_scores_midpoint() {
    let service = service();

    let ranked = service.recommend("ORD004", balanced()).expect("recommendation");

    assert_eq!(ranked.entries.len(), 1);
    assert_close(ranked.entries[0].score, 0.5);
}

#[test]
fn order_on_unrouted_lane_uses_median_route() {
    let service = service();

    let ranked = service
        .recommend("ORD006", balanced())
        .expect("median route for Kolkata-Hyderabad");

    let ids: Vec<&str> = ranked
        .entries
        .iter()
        .map(|entry| entry.vehicle_id.0.as_str())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|id| ["VEH003", "VEH004", "VEH005"].contains(id)));
    assert!(ranked.entries.iter().all(|entry| entry.distance_km == 280.0));
}

#[test]
fn order_filters_and_dashboard_agree() {
    let service = service();

    let express = service.orders(None, Some(Priority::High));
    assert_eq!(express.len(), 2);

    let dashboard = service.dashboard(None, None);
    assert_eq!(dashboard.order_count, 6);
    let low = dashboard
        .delay_by_priority
        .iter()
        .find(|entry| entry.priority == Priority::Low)
        .expect("economy orders delivered");
    assert_eq!(low.average_delay_hours, 48.0);
    let speedy = dashboard
        .cost_by_carrier
        .iter()
        .find(|entry| entry.carrier == "SpeedyLogistics")
        .expect("carrier present");
    assert_eq!(speedy.deliveries, 2);
    assert_eq!(speedy.median, 176.0);
    assert_eq!(dashboard.fleet_efficiency.len(), 7);
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn http_recommendation_matches_service() {
    let router = dispatch_router(Arc::new(service()));
    let payload = json!({
        "order_id": "ORD005",
        "weights": { "cost": 0.2, "speed": 0.2, "sustainability": 0.6 },
    });

    let response = router
        .oneshot(
            Request::post("/api/v1/dispatch/recommendations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["category"], "Refrigerated");
    assert_eq!(body["entries"][0]["vehicle_id"], "VEH002");
    assert_eq!(body["entries"].as_array().map(Vec::len), Some(2));
}
