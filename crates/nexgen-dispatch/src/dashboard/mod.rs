//! Descriptive views over the reference tables for the dashboard sidebar
//! and charts. Independent of the scoring engine.

mod insights;

pub use insights::{
    CarrierCostEntry, CategoryShareEntry, DashboardSummary, FleetEfficiencyPoint,
    PriorityDelayEntry,
};

use crate::dispatch::domain::{Order, Priority};
use crate::reference::normalizer::normalize_label;
use crate::reference::ReferenceData;
use serde::Serialize;

/// One order joined with its route, cost and delivery records. Flat so it
/// serializes to a single CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub order_id: String,
    pub order_date: Option<String>,
    pub customer_segment: Option<String>,
    pub product_category: String,
    pub priority: &'static str,
    pub category: String,
    pub origin: String,
    pub destination: String,
    pub special_handling: Option<String>,
    pub weight_kg: f64,
    pub order_value: Option<f64>,
    pub carrier: Option<String>,
    pub delivery_status: Option<String>,
    pub distance_km: Option<f64>,
    pub traffic_delay_hours: Option<f64>,
    pub toll_charges: Option<f64>,
    pub recorded_cost: Option<f64>,
    pub delivery_cost: Option<f64>,
    pub customer_rating: Option<f64>,
    pub delivery_delay_hours: Option<f64>,
}

impl OrderRow {
    fn join(order: &Order, data: &ReferenceData) -> Self {
        let route = data.route_for(order);
        let cost = data.cost_for(&order.order_id);
        let performance = data.performance_for(&order.order_id);

        Self {
            order_id: order.order_id.0.clone(),
            order_date: order.order_date.map(|date| date.to_string()),
            customer_segment: order.customer_segment.clone(),
            product_category: order.product_category.clone(),
            priority: order.priority.label(),
            category: order.category.clone(),
            origin: order.origin.clone(),
            destination: order.destination.clone(),
            special_handling: order.special_handling.clone(),
            weight_kg: order.required_capacity_kg,
            order_value: order.order_value,
            carrier: performance.and_then(|record| record.carrier.clone()),
            delivery_status: performance.and_then(|record| record.delivery_status.clone()),
            distance_km: route.map(|route| route.distance_km),
            traffic_delay_hours: route.map(|route| route.traffic_delay_hours),
            toll_charges: route.map(|route| route.toll_charges),
            recorded_cost: cost.map(|cost| cost.total()),
            delivery_cost: performance.and_then(|record| record.delivery_cost),
            customer_rating: performance.and_then(|record| record.customer_rating),
            delivery_delay_hours: performance.and_then(|record| record.delivery_delay_hours),
        }
    }
}

/// Orders matching the sidebar filters, in ascending order id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredTable {
    pub rows: Vec<OrderRow>,
}

impl FilteredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Restrict the joined order table by product category and priority. A
/// `None` filter keeps every value.
pub fn filter_candidates(
    category: Option<&str>,
    priority: Option<Priority>,
    data: &ReferenceData,
) -> FilteredTable {
    let category = category.map(normalize_label);

    let rows = data
        .orders()
        .filter(|order| {
            category
                .as_ref()
                .map_or(true, |wanted| normalize_label(&order.product_category) == *wanted)
        })
        .filter(|order| priority.map_or(true, |wanted| order.priority == wanted))
        .map(|order| OrderRow::join(order, data))
        .collect();

    FilteredTable { rows }
}
