use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::dispatch::domain::{
    CategorySupport, CostRecord, Order, OrderId, PerformanceRecord, Priority, RouteRecord,
    Vehicle, VehicleId, REFRIGERATED_CATEGORY, STANDARD_CATEGORY,
};
use crate::dispatch::estimate::{Candidate, TripEstimate};
use crate::dispatch::{DispatchConfig, DispatchService, ScoreWeights};
use crate::reference::{ReferenceData, ReferenceLoader, ReferenceStore};

pub(super) fn order(id: &str, category: &str, required_capacity_kg: f64) -> Order {
    Order {
        order_id: OrderId::from(id),
        category: category.to_string(),
        product_category: if category == REFRIGERATED_CATEGORY {
            "Food & Beverage".to_string()
        } else {
            "Electronics".to_string()
        },
        priority: Priority::Medium,
        required_capacity_kg,
        origin: "Mumbai".to_string(),
        destination: "Pune".to_string(),
        special_handling: None,
        customer_segment: Some("SMB".to_string()),
        order_value: Some(1200.0),
        order_date: None,
    }
}

pub(super) fn routed_order(
    id: &str,
    category: &str,
    required_capacity_kg: f64,
    origin: &str,
    destination: &str,
) -> Order {
    Order {
        origin: origin.to_string(),
        destination: destination.to_string(),
        ..order(id, category, required_capacity_kg)
    }
}

pub(super) fn vehicle(
    id: &str,
    vehicle_type: &str,
    capacity_kg: f64,
    fuel_efficiency_km_per_l: f64,
    co2_emissions_kg_per_km: f64,
) -> Vehicle {
    Vehicle {
        vehicle_id: VehicleId::from(id),
        vehicle_type: vehicle_type.to_string(),
        capacity_kg,
        fuel_efficiency_km_per_l,
        co2_emissions_kg_per_km,
        status: "Available".to_string(),
        available: true,
        categories: CategorySupport::for_vehicle_type(vehicle_type),
        current_location: Some("Mumbai".to_string()),
        age_years: Some(3.0),
    }
}

pub(super) fn unavailable(mut vehicle: Vehicle, status: &str) -> Vehicle {
    vehicle.status = status.to_string();
    vehicle.available = false;
    vehicle
}

pub(super) fn route(order_id: &str, distance_km: f64, delay_hours: f64, tolls: f64) -> RouteRecord {
    RouteRecord {
        order_id: OrderId::from(order_id),
        route: Some("Mumbai-Pune".to_string()),
        distance_km,
        traffic_delay_hours: delay_hours,
        toll_charges: tolls,
        fuel_consumption_l: None,
        weather_impact: None,
    }
}

pub(super) fn trip(cost: f64, time_hours: f64, co2_kg: f64) -> TripEstimate {
    TripEstimate {
        distance_km: 100.0,
        avg_speed_kmh: 50.0,
        time_hours,
        fuel_liters: 10.0,
        cost,
        co2_kg,
    }
}

pub(super) fn candidates<'a>(
    order: &'a Order,
    fleet: &'a [(Vehicle, TripEstimate)],
) -> Vec<Candidate<'a>> {
    fleet
        .iter()
        .map(|(vehicle, trip)| Candidate {
            order,
            vehicle,
            trip: *trip,
        })
        .collect()
}

pub(super) fn weights(cost: f64, speed: f64, sustainability: f64) -> ScoreWeights {
    ScoreWeights::new(cost, speed, sustainability).expect("valid weights")
}

/// Fleet of seven vehicles:
/// - `VH-01`, `VH-02`: refrigerated, available
/// - `VH-03`: refrigerated, too small for cold-chain orders
/// - `VH-04` van, `VH-05` truck: standard, available
/// - `VH-06`: express bike, 30 kg
/// - `VH-07`: van in transit
pub(super) fn fleet() -> Vec<Vehicle> {
    vec![
        vehicle("VH-01", "Refrigerated Unit", 600.0, 7.0, 0.32),
        vehicle("VH-02", "Refrigerated Unit", 900.0, 5.0, 0.40),
        vehicle("VH-03", "Refrigerated Unit", 400.0, 8.0, 0.28),
        vehicle("VH-04", "Van", 1000.0, 12.0, 0.22),
        vehicle("VH-05", "Truck", 3000.0, 4.0, 0.90),
        vehicle("VH-06", "Express Bike", 30.0, 40.0, 0.05),
        unavailable(vehicle("VH-07", "Van", 1000.0, 12.0, 0.22), "In Transit"),
    ]
}

/// Orders:
/// - `ORD-100`: 500 kg cold chain with its own Mumbai to Pune route
/// - `ORD-101`: 200 kg standard on the same lane without a route row
/// - `ORD-102`: 5000 kg, heavier than every vehicle
/// - `ORD-103`: standard on a lane with no route data, so it gets the median route
pub(super) fn reference_data() -> ReferenceData {
    let orders = vec![
        order("ORD-100", REFRIGERATED_CATEGORY, 500.0),
        Order {
            priority: Priority::High,
            ..order("ORD-101", STANDARD_CATEGORY, 200.0)
        },
        routed_order("ORD-102", STANDARD_CATEGORY, 5000.0, "Delhi", "Jaipur"),
        routed_order("ORD-103", STANDARD_CATEGORY, 100.0, "Kolkata", "Chennai"),
    ];
    let routes = vec![route("ORD-100", 150.0, 0.5, 20.0)];
    let costs = vec![CostRecord {
        order_id: OrderId::from("ORD-101"),
        vehicle_id: Some(VehicleId::from("VH-04")),
        fuel_cost: 25.0,
        labor_cost: 60.0,
        vehicle_maintenance: 4.0,
        insurance: 3.0,
        packaging_cost: 2.0,
        technology_platform_fee: 1.0,
        other_overhead: 0.0,
    }];
    let performance = vec![PerformanceRecord {
        order_id: OrderId::from("ORD-100"),
        vehicle_id: Some(VehicleId::from("VH-01")),
        carrier: Some("SpeedyLogistics".to_string()),
        delivery_status: Some("On-Time".to_string()),
        quality_issue: None,
        customer_rating: Some(4.0),
        delivery_cost: Some(130.0),
        delivery_delay_hours: Some(0.0),
    }];

    ReferenceData::from_parts(orders, fleet(), routes, costs, performance)
        .expect("fixture tables join")
}

/// A single standard order and the fleet, with an empty route table.
pub(super) fn unrouted_reference_data() -> ReferenceData {
    let orders = vec![routed_order(
        "ORD-103",
        STANDARD_CATEGORY,
        100.0,
        "Kolkata",
        "Chennai",
    )];
    ReferenceData::from_parts(orders, fleet(), Vec::new(), Vec::new(), Vec::new())
        .expect("tables join without routes")
}

pub(super) fn service() -> Arc<DispatchService> {
    service_over(reference_data())
}

pub(super) fn service_over(data: ReferenceData) -> Arc<DispatchService> {
    let store = ReferenceStore::from_data(data, ReferenceLoader::default());
    Arc::new(DispatchService::new(
        Arc::new(store),
        DispatchConfig::default(),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
