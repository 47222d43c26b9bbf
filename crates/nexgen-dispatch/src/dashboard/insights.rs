use super::{FilteredTable, OrderRow};
use crate::dispatch::domain::{Priority, Vehicle};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityDelayEntry {
    pub priority: Priority,
    pub priority_label: &'static str,
    pub orders: usize,
    pub average_delay_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShareEntry {
    pub product_category: String,
    pub orders: usize,
    pub share: f64,
}

/// Five-number summary of recorded delivery cost for one carrier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierCostEntry {
    pub carrier: String,
    pub deliveries: usize,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetEfficiencyPoint {
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub fuel_efficiency_km_per_l: f64,
    pub co2_emissions_kg_per_km: f64,
    pub capacity_kg: f64,
    pub available: bool,
}

/// Data series behind the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub order_count: usize,
    pub delay_by_priority: Vec<PriorityDelayEntry>,
    pub orders_by_category: Vec<CategoryShareEntry>,
    pub cost_by_carrier: Vec<CarrierCostEntry>,
    pub fleet_efficiency: Vec<FleetEfficiencyPoint>,
}

impl DashboardSummary {
    pub fn from_table<'a, I>(table: &FilteredTable, vehicles: I) -> Self
    where
        I: IntoIterator<Item = &'a Vehicle>,
    {
        Self {
            order_count: table.len(),
            delay_by_priority: delay_by_priority(&table.rows),
            orders_by_category: orders_by_category(&table.rows),
            cost_by_carrier: cost_by_carrier(&table.rows),
            fleet_efficiency: vehicles
                .into_iter()
                .map(|vehicle| FleetEfficiencyPoint {
                    vehicle_id: vehicle.vehicle_id.0.clone(),
                    vehicle_type: vehicle.vehicle_type.clone(),
                    fuel_efficiency_km_per_l: vehicle.fuel_efficiency_km_per_l,
                    co2_emissions_kg_per_km: vehicle.co2_emissions_kg_per_km,
                    capacity_kg: vehicle.capacity_kg,
                    available: vehicle.available,
                })
                .collect(),
        }
    }
}

fn delay_by_priority(rows: &[OrderRow]) -> Vec<PriorityDelayEntry> {
    Priority::ALL
        .iter()
        .filter_map(|priority| {
            let delays: Vec<f64> = rows
                .iter()
                .filter(|row| row.priority == priority.label())
                .filter_map(|row| row.delivery_delay_hours)
                .collect();
            if delays.is_empty() {
                return None;
            }
            let average = delays.iter().sum::<f64>() / delays.len() as f64;
            Some(PriorityDelayEntry {
                priority: *priority,
                priority_label: priority.label(),
                orders: delays.len(),
                average_delay_hours: average,
            })
        })
        .collect()
}

/// Sorted by descending order count, then name.
fn orders_by_category(rows: &[OrderRow]) -> Vec<CategoryShareEntry> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.product_category.as_str()).or_default() += 1;
    }

    let total = rows.len() as f64;
    let mut entries: Vec<CategoryShareEntry> = counts
        .into_iter()
        .map(|(category, orders)| CategoryShareEntry {
            product_category: category.to_string(),
            orders,
            share: if total > 0.0 { orders as f64 / total } else { 0.0 },
        })
        .collect();
    entries.sort_by(|a, b| b.orders.cmp(&a.orders));
    entries
}

fn cost_by_carrier(rows: &[OrderRow]) -> Vec<CarrierCostEntry> {
    let mut costs: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let (Some(carrier), Some(cost)) = (row.carrier.as_deref(), row.delivery_cost) {
            costs.entry(carrier).or_default().push(cost);
        }
    }

    costs
        .into_iter()
        .filter_map(|(carrier, mut values)| {
            values.sort_by(f64::total_cmp);
            Some(CarrierCostEntry {
                carrier: carrier.to_string(),
                deliveries: values.len(),
                min: *values.first()?,
                lower_quartile: quantile(&values, 0.25)?,
                median: quantile(&values, 0.5)?,
                upper_quartile: quantile(&values, 0.75)?,
                max: *values.last()?,
            })
        })
        .collect()
}

/// Linear interpolation between closest ranks over sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let low = *sorted.get(lower)?;
    let high = *sorted.get(upper)?;
    Some(low + (high - low) * (position - lower as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_ranks() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&values, 0.0), Some(10.0));
        assert_eq!(quantile(&values, 0.5), Some(25.0));
        assert_eq!(quantile(&values, 0.25), Some(17.5));
        assert_eq!(quantile(&values, 1.0), Some(40.0));
        assert_eq!(quantile(&[], 0.5), None);
    }
}
