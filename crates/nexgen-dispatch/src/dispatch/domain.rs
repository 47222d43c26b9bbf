use crate::reference::normalizer::normalize_label;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Eligibility category for orders that need a cold chain.
pub const REFRIGERATED_CATEGORY: &str = "Refrigerated";
/// Eligibility category for every other order.
pub const STANDARD_CATEGORY: &str = "Standard";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

/// Delivery urgency. The fleet exports label these Economy/Standard/Express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "low" | "economy" => Some(Self::Low),
            "medium" | "standard" | "normal" => Some(Self::Medium),
            "high" | "express" => Some(Self::High),
            "critical" | "urgent" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown priority '{value}'"))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A delivery order as loaded from the orders table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    /// Category the fleet must support, `Refrigerated` or `Standard` unless
    /// the order was constructed with a custom one.
    pub category: String,
    pub product_category: String,
    pub priority: Priority,
    pub required_capacity_kg: f64,
    pub origin: String,
    pub destination: String,
    pub special_handling: Option<String>,
    pub customer_segment: Option<String>,
    pub order_value: Option<f64>,
    pub order_date: Option<NaiveDate>,
}

impl Order {
    pub fn lane(&self) -> (String, String) {
        (normalize_label(&self.origin), normalize_label(&self.destination))
    }
}

/// Which order categories a vehicle may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "categories", rename_all = "snake_case")]
pub enum CategorySupport {
    GeneralPurpose,
    Only(Vec<String>),
}

impl CategorySupport {
    pub fn supports(&self, category: &str) -> bool {
        match self {
            Self::GeneralPurpose => true,
            Self::Only(categories) => {
                let wanted = normalize_label(category);
                categories
                    .iter()
                    .any(|candidate| normalize_label(candidate) == wanted)
            }
        }
    }

    /// Support implied by the vehicle type when the fleet table names none.
    pub fn for_vehicle_type(vehicle_type: &str) -> Self {
        if is_refrigerated_type(vehicle_type) {
            Self::Only(vec![REFRIGERATED_CATEGORY.to_string()])
        } else {
            Self::Only(vec![STANDARD_CATEGORY.to_string()])
        }
    }
}

pub(crate) fn is_refrigerated_type(vehicle_type: &str) -> bool {
    normalize_label(vehicle_type).contains("refrigerated")
}

/// A fleet vehicle. Immutable reference data for the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    pub vehicle_type: String,
    pub capacity_kg: f64,
    pub fuel_efficiency_km_per_l: f64,
    pub co2_emissions_kg_per_km: f64,
    pub status: String,
    pub available: bool,
    pub categories: CategorySupport,
    pub current_location: Option<String>,
    pub age_years: Option<f64>,
}

/// Historical route observed for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub order_id: OrderId,
    pub route: Option<String>,
    pub distance_km: f64,
    pub traffic_delay_hours: f64,
    pub toll_charges: f64,
    pub fuel_consumption_l: Option<f64>,
    pub weather_impact: Option<String>,
}

/// Per-trip cost components recorded for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRecord {
    pub order_id: OrderId,
    pub vehicle_id: Option<VehicleId>,
    pub fuel_cost: f64,
    pub labor_cost: f64,
    pub vehicle_maintenance: f64,
    pub insurance: f64,
    pub packaging_cost: f64,
    pub technology_platform_fee: f64,
    pub other_overhead: f64,
}

impl CostRecord {
    /// Components that do not depend on which vehicle runs the trip.
    pub fn fixed_overhead(&self) -> f64 {
        self.vehicle_maintenance
            + self.insurance
            + self.packaging_cost
            + self.technology_platform_fee
            + self.other_overhead
    }

    pub fn total(&self) -> f64 {
        self.fuel_cost + self.labor_cost + self.fixed_overhead()
    }
}

/// Delivery outcome recorded for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    pub order_id: OrderId,
    pub vehicle_id: Option<VehicleId>,
    pub carrier: Option<String>,
    pub delivery_status: Option<String>,
    pub quality_issue: Option<String>,
    pub customer_rating: Option<f64>,
    pub delivery_cost: Option<f64>,
    /// Actual minus promised delivery, in hours. Negative means early.
    pub delivery_delay_hours: Option<f64>,
}
