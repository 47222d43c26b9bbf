use serde::{Deserialize, Serialize};

pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 1.50;
pub const DEFAULT_LABOR_COST_PER_HOUR: f64 = 20.00;
pub const DEFAULT_PERISHABLE_CATEGORIES: [&str; 2] = ["Food & Beverage", "Healthcare"];

/// Assumptions used to turn a route into trip cost, and to decide which
/// product categories need a refrigerated vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub fuel_price_per_liter: f64,
    pub labor_cost_per_hour: f64,
    pub perishable_categories: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fuel_price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
            labor_cost_per_hour: DEFAULT_LABOR_COST_PER_HOUR,
            perishable_categories: DEFAULT_PERISHABLE_CATEGORIES
                .iter()
                .map(|category| category.to_string())
                .collect(),
        }
    }
}
