use super::config::DispatchConfig;
use super::domain::{Order, RouteRecord, Vehicle};
use crate::reference::normalizer::normalize_label;
use serde::Serialize;

/// Raw trip metrics for one (order, vehicle) pair. Lower is better for all
/// three of cost, time and CO2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripEstimate {
    pub distance_km: f64,
    pub avg_speed_kmh: f64,
    pub time_hours: f64,
    pub fuel_liters: f64,
    pub cost: f64,
    pub co2_kg: f64,
}

/// An eligible vehicle paired with the order it would serve.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub order: &'a Order,
    pub vehicle: &'a Vehicle,
    pub trip: TripEstimate,
}

pub fn average_speed_kmh(vehicle_type: &str) -> f64 {
    match normalize_label(vehicle_type).as_str() {
        "express bike" | "van" => 60.0,
        "truck" => 45.0,
        _ => 50.0,
    }
}

/// Estimate a trip. `fixed_overhead` is the vehicle-independent share of
/// the order's recorded cost breakdown.
pub fn estimate_trip(
    route: &RouteRecord,
    vehicle: &Vehicle,
    fixed_overhead: f64,
    config: &DispatchConfig,
) -> TripEstimate {
    let distance_km = route.distance_km;
    let avg_speed_kmh = average_speed_kmh(&vehicle.vehicle_type);
    // Traffic delay observed on the route is carried into every vehicle's time.
    let time_hours = distance_km / avg_speed_kmh + route.traffic_delay_hours;
    let fuel_liters = distance_km / vehicle.fuel_efficiency_km_per_l;

    let fuel_cost = fuel_liters * config.fuel_price_per_liter;
    let labor_cost = time_hours * config.labor_cost_per_hour;
    let cost = fuel_cost + labor_cost + route.toll_charges + fixed_overhead;

    TripEstimate {
        distance_km,
        avg_speed_kmh,
        time_hours,
        fuel_liters,
        cost,
        co2_kg: distance_km * vehicle.co2_emissions_kg_per_km,
    }
}
