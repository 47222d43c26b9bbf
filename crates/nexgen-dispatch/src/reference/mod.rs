//! Reference table ingestion.
//!
//! Loads the fleet exports from a directory, validates numeric domains and
//! join keys, and produces an immutable [`ReferenceData`] snapshot. Any
//! problem is reported as a [`DataLoadError`] before scoring ever runs.

mod error;
pub(crate) mod normalizer;
mod parser;
mod store;

pub use error::{DataLoadError, Table};
pub use store::ReferenceStore;

use crate::dispatch::domain::{
    is_refrigerated_type, CategorySupport, CostRecord, Order, OrderId, PerformanceRecord, Priority,
    RouteRecord, Vehicle, VehicleId, REFRIGERATED_CATEGORY, STANDARD_CATEGORY,
};
use crate::dispatch::DispatchConfig;
use chrono::{DateTime, NaiveDate, Utc};
use normalizer::normalize_label;
use parser::{CostRow, OrderRow, PerformanceRow, RouteRow, VehicleRow};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load the reference tables from `path` with the default perishable list.
pub fn load_reference_data<P: AsRef<Path>>(path: P) -> Result<ReferenceData, DataLoadError> {
    ReferenceLoader::default().load(path)
}

/// Loader carrying the rules used to derive each order's eligibility category.
#[derive(Debug, Clone)]
pub struct ReferenceLoader {
    perishable_categories: Vec<String>,
}

impl Default for ReferenceLoader {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl ReferenceLoader {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            perishable_categories: config
                .perishable_categories
                .iter()
                .map(|category| normalize_label(category))
                .collect(),
        }
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ReferenceData, DataLoadError> {
        let dir = path.as_ref();
        debug!(path = %dir.display(), "loading reference tables");

        let order_rows: Vec<OrderRow> =
            parser::parse_rows(parser::open_table(dir, Table::Orders)?, Table::Orders)?;
        let vehicle_rows: Vec<VehicleRow> = parser::parse_rows(
            parser::open_table(dir, Table::VehicleFleet)?,
            Table::VehicleFleet,
        )?;
        let route_rows: Vec<RouteRow> = parser::parse_rows(
            parser::open_table(dir, Table::RoutesDistance)?,
            Table::RoutesDistance,
        )?;
        let cost_rows: Vec<CostRow> = parser::parse_rows(
            parser::open_table(dir, Table::CostBreakdown)?,
            Table::CostBreakdown,
        )?;
        let performance_rows: Vec<PerformanceRow> = parser::parse_rows(
            parser::open_table(dir, Table::DeliveryPerformance)?,
            Table::DeliveryPerformance,
        )?;
        let inventory_rows = parser::count_rows(
            parser::open_table(dir, Table::WarehouseInventory)?,
            Table::WarehouseInventory,
        )?;
        let feedback_rows = parser::count_rows(
            parser::open_table(dir, Table::CustomerFeedback)?,
            Table::CustomerFeedback,
        )?;

        let orders = order_rows
            .into_iter()
            .map(|row| self.order_from_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        let vehicles = vehicle_rows
            .into_iter()
            .map(vehicle_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let routes = route_rows
            .into_iter()
            .map(route_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let costs = cost_rows
            .into_iter()
            .map(cost_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let performance = performance_rows
            .into_iter()
            .map(performance_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = ReferenceData::from_parts(orders, vehicles, routes, costs, performance)?;
        data.source = Some(dir.to_path_buf());
        data.summary.warehouse_inventory = inventory_rows;
        data.summary.customer_feedback = feedback_rows;

        info!(
            path = %dir.display(),
            orders = data.summary.orders,
            vehicles = data.summary.vehicles,
            routes = data.summary.routes,
            "reference data loaded"
        );

        Ok(data)
    }

    fn order_from_row(&self, row: OrderRow) -> Result<Order, DataLoadError> {
        let key = row.order_id.clone();
        let priority =
            Priority::parse(&row.priority).ok_or_else(|| DataLoadError::InvalidField {
                table: Table::Orders,
                key: key.clone(),
                field: "priority",
                detail: format!("unknown priority '{}'", row.priority),
            })?;

        let required_capacity_kg = row.weight_kg.unwrap_or(0.0);
        require_non_negative(Table::Orders, &key, "weight_kg", required_capacity_kg)?;
        if let Some(value) = row.order_value {
            require_non_negative(Table::Orders, &key, "order_value", value)?;
        }

        let order_date = match row.order_date.as_deref() {
            Some(raw) => Some(parse_order_date(raw).ok_or_else(|| {
                DataLoadError::InvalidField {
                    table: Table::Orders,
                    key: key.clone(),
                    field: "order_date",
                    detail: format!("'{raw}' is not a YYYY-MM-DD date"),
                }
            })?),
            None => None,
        };

        let category = if self.needs_refrigeration(&row) {
            REFRIGERATED_CATEGORY
        } else {
            STANDARD_CATEGORY
        };

        Ok(Order {
            order_id: OrderId(row.order_id),
            category: category.to_string(),
            product_category: row.product_category,
            priority,
            required_capacity_kg,
            origin: row.origin,
            destination: row.destination,
            special_handling: row.special_handling,
            customer_segment: row.customer_segment,
            order_value: row.order_value,
            order_date,
        })
    }

    fn needs_refrigeration(&self, row: &OrderRow) -> bool {
        let handling_requires_cold_chain = row
            .special_handling
            .as_deref()
            .map(|handling| normalize_label(handling).contains("refrigerat"))
            .unwrap_or(false);
        let product = normalize_label(&row.product_category);
        handling_requires_cold_chain
            || self
                .perishable_categories
                .iter()
                .any(|category| *category == product)
    }
}

fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
}

fn require_non_negative(
    table: Table,
    key: &str,
    field: &'static str,
    value: f64,
) -> Result<(), DataLoadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DataLoadError::InvalidField {
            table,
            key: key.to_string(),
            field,
            detail: format!("expected a non-negative number, got {value}"),
        })
    }
}

fn vehicle_from_row(row: VehicleRow) -> Result<Vehicle, DataLoadError> {
    let key = row.vehicle_id.as_str();
    require_non_negative(Table::VehicleFleet, key, "capacity_kg", row.capacity_kg)?;
    require_non_negative(
        Table::VehicleFleet,
        key,
        "co2_emissions_kg_per_km",
        row.co2_emissions_kg_per_km,
    )?;
    if !(row.fuel_efficiency_km_per_l.is_finite() && row.fuel_efficiency_km_per_l > 0.0) {
        return Err(DataLoadError::InvalidField {
            table: Table::VehicleFleet,
            key: key.to_string(),
            field: "fuel_efficiency_km_per_l",
            detail: format!(
                "expected a positive number, got {}",
                row.fuel_efficiency_km_per_l
            ),
        });
    }
    if let Some(age) = row.age_years {
        require_non_negative(Table::VehicleFleet, key, "age_years", age)?;
    }

    let general_purpose = match row.general_purpose.as_deref() {
        Some(raw) => parser::parse_flag(raw).ok_or_else(|| DataLoadError::InvalidField {
            table: Table::VehicleFleet,
            key: key.to_string(),
            field: "general_purpose",
            detail: format!("'{raw}' is not a boolean"),
        })?,
        None => false,
    };

    let categories = if general_purpose {
        CategorySupport::GeneralPurpose
    } else {
        match row.supported_categories.as_deref() {
            Some(raw) => {
                let listed: Vec<String> = raw
                    .split(';')
                    .map(str::trim)
                    .filter(|category| !category.is_empty())
                    .map(str::to_string)
                    .collect();
                if listed.is_empty() {
                    CategorySupport::for_vehicle_type(&row.vehicle_type)
                } else {
                    CategorySupport::Only(listed)
                }
            }
            None => CategorySupport::for_vehicle_type(&row.vehicle_type),
        }
    };

    // A missing status column means the export predates availability tracking.
    let status = row.status.unwrap_or_else(|| "Available".to_string());
    let available = normalize_label(&status) == "available";
    debug!(
        vehicle_id = %row.vehicle_id,
        refrigerated = is_refrigerated_type(&row.vehicle_type),
        available,
        "vehicle parsed"
    );

    Ok(Vehicle {
        vehicle_id: VehicleId(row.vehicle_id),
        vehicle_type: row.vehicle_type,
        capacity_kg: row.capacity_kg,
        fuel_efficiency_km_per_l: row.fuel_efficiency_km_per_l,
        co2_emissions_kg_per_km: row.co2_emissions_kg_per_km,
        status,
        available,
        categories,
        current_location: row.current_location,
        age_years: row.age_years,
    })
}

fn route_from_row(row: RouteRow) -> Result<RouteRecord, DataLoadError> {
    let key = row.order_id.as_str();
    require_non_negative(Table::RoutesDistance, key, "distance_km", row.distance_km)?;

    let traffic_delay_hours = match (row.traffic_delay_hours, row.traffic_delay_minutes) {
        (Some(hours), _) => hours,
        (None, Some(minutes)) => minutes / 60.0,
        (None, None) => 0.0,
    };
    require_non_negative(
        Table::RoutesDistance,
        key,
        "traffic_delay",
        traffic_delay_hours,
    )?;

    let toll_charges = row.toll_charges.unwrap_or(0.0);
    require_non_negative(Table::RoutesDistance, key, "toll_charges", toll_charges)?;
    if let Some(fuel) = row.fuel_consumption_l {
        require_non_negative(Table::RoutesDistance, key, "fuel_consumption_l", fuel)?;
    }

    Ok(RouteRecord {
        order_id: OrderId(row.order_id),
        route: row.route,
        distance_km: row.distance_km,
        traffic_delay_hours,
        toll_charges,
        fuel_consumption_l: row.fuel_consumption_l,
        weather_impact: row.weather_impact,
    })
}

fn cost_from_row(row: CostRow) -> Result<CostRecord, DataLoadError> {
    let key = row.order_id.clone();
    let component = |field: &'static str, value: Option<f64>| -> Result<f64, DataLoadError> {
        let value = value.unwrap_or(0.0);
        require_non_negative(Table::CostBreakdown, &key, field, value)?;
        Ok(value)
    };

    Ok(CostRecord {
        fuel_cost: component("fuel_cost", row.fuel_cost)?,
        labor_cost: component("labor_cost", row.labor_cost)?,
        vehicle_maintenance: component("vehicle_maintenance", row.vehicle_maintenance)?,
        insurance: component("insurance", row.insurance)?,
        packaging_cost: component("packaging_cost", row.packaging_cost)?,
        technology_platform_fee: component(
            "technology_platform_fee",
            row.technology_platform_fee,
        )?,
        other_overhead: component("other_overhead", row.other_overhead)?,
        vehicle_id: row.vehicle_id.map(VehicleId),
        order_id: OrderId(row.order_id),
    })
}

fn performance_from_row(row: PerformanceRow) -> Result<PerformanceRecord, DataLoadError> {
    let key = row.order_id.clone();
    let mark = |field: &'static str, raw: Option<&str>| match raw {
        Some(raw) => parser::parse_delivery_mark(raw)
            .map(Some)
            .ok_or_else(|| DataLoadError::InvalidField {
                table: Table::DeliveryPerformance,
                key: key.clone(),
                field,
                detail: format!("'{raw}' is neither a day count nor a date"),
            }),
        None => Ok(None),
    };

    let promised = mark("promised_delivery_days", row.promised_delivery_days.as_deref())?;
    let actual = mark("actual_delivery_days", row.actual_delivery_days.as_deref())?;
    let delivery_delay_hours = match (promised, actual) {
        (Some(promised), Some(actual)) => Some(parser::delay_hours(promised, actual).ok_or_else(
            || DataLoadError::InvalidField {
                table: Table::DeliveryPerformance,
                key: key.clone(),
                field: "actual_delivery_days",
                detail: "promised and actual delivery use different formats".to_string(),
            },
        )?),
        _ => None,
    };

    if let Some(rating) = row.customer_rating {
        require_non_negative(Table::DeliveryPerformance, &key, "customer_rating", rating)?;
    }
    if let Some(cost) = row.delivery_cost {
        require_non_negative(Table::DeliveryPerformance, &key, "delivery_cost", cost)?;
    }

    Ok(PerformanceRecord {
        order_id: OrderId(row.order_id),
        vehicle_id: row.vehicle_id.map(VehicleId),
        carrier: row.carrier,
        delivery_status: row.delivery_status,
        quality_issue: row.quality_issue,
        customer_rating: row.customer_rating,
        delivery_cost: row.delivery_cost,
        delivery_delay_hours,
    })
}

/// Row counts of a loaded reference set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSummary {
    pub orders: usize,
    pub vehicles: usize,
    pub available_vehicles: usize,
    pub routes: usize,
    pub imputed_routes: usize,
    pub cost_breakdowns: usize,
    pub delivery_records: usize,
    pub warehouse_inventory: usize,
    pub customer_feedback: usize,
}

/// Immutable, fully joined reference tables for one session.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
    orders: BTreeMap<OrderId, Order>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    routes: HashMap<OrderId, RouteRecord>,
    lanes: HashMap<(String, String), OrderId>,
    imputed: HashMap<OrderId, RouteRecord>,
    costs: HashMap<OrderId, CostRecord>,
    performance: HashMap<OrderId, PerformanceRecord>,
    summary: ReferenceSummary,
}

impl ReferenceData {
    /// Index and cross-check already parsed tables.
    pub fn from_parts(
        orders: Vec<Order>,
        vehicles: Vec<Vehicle>,
        routes: Vec<RouteRecord>,
        costs: Vec<CostRecord>,
        performance: Vec<PerformanceRecord>,
    ) -> Result<Self, DataLoadError> {
        let mut order_index = BTreeMap::new();
        for order in orders {
            if order_index.contains_key(&order.order_id) {
                return Err(DataLoadError::DuplicateKey {
                    table: Table::Orders,
                    key: order.order_id.0,
                });
            }
            order_index.insert(order.order_id.clone(), order);
        }

        let mut vehicle_index = BTreeMap::new();
        for vehicle in vehicles {
            if vehicle_index.contains_key(&vehicle.vehicle_id) {
                return Err(DataLoadError::DuplicateKey {
                    table: Table::VehicleFleet,
                    key: vehicle.vehicle_id.0,
                });
            }
            vehicle_index.insert(vehicle.vehicle_id.clone(), vehicle);
        }

        let route_index = index_by_order(routes, Table::RoutesDistance, &order_index, |route| {
            &route.order_id
        })?;
        let cost_index = index_by_order(costs, Table::CostBreakdown, &order_index, |cost| {
            &cost.order_id
        })?;
        let performance_index = index_by_order(
            performance,
            Table::DeliveryPerformance,
            &order_index,
            |record| &record.order_id,
        )?;

        for cost in cost_index.values() {
            check_vehicle_ref(Table::CostBreakdown, cost.vehicle_id.as_ref(), &vehicle_index)?;
        }
        for record in performance_index.values() {
            check_vehicle_ref(
                Table::DeliveryPerformance,
                record.vehicle_id.as_ref(),
                &vehicle_index,
            )?;
        }

        // Order ids iterate in ascending order, so each lane keeps its first observation.
        let mut lanes = HashMap::new();
        for (order_id, order) in &order_index {
            if route_index.contains_key(order_id) {
                lanes.entry(order.lane()).or_insert_with(|| order_id.clone());
            }
        }

        let imputed = impute_routes(&order_index, &route_index, &lanes);
        if !imputed.is_empty() {
            debug!(orders = imputed.len(), "route medians imputed");
        }

        let summary = ReferenceSummary {
            orders: order_index.len(),
            vehicles: vehicle_index.len(),
            available_vehicles: vehicle_index.values().filter(|v| v.available).count(),
            routes: route_index.len(),
            imputed_routes: imputed.len(),
            cost_breakdowns: cost_index.len(),
            delivery_records: performance_index.len(),
            warehouse_inventory: 0,
            customer_feedback: 0,
        };

        Ok(Self {
            source: None,
            loaded_at: Utc::now(),
            orders: order_index,
            vehicles: vehicle_index,
            routes: route_index,
            lanes,
            imputed,
            costs: cost_index,
            performance: performance_index,
            summary,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn summary(&self) -> &ReferenceSummary {
        &self.summary
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Orders in ascending `order_id` order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Vehicles in ascending `vehicle_id` order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn vehicle(&self, vehicle_id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// The order's own route, else the first route seen on the same lane,
    /// else the median route. `None` only when no route was recorded at all.
    pub fn route_for(&self, order: &Order) -> Option<&RouteRecord> {
        self.routes
            .get(&order.order_id)
            .or_else(|| {
                self.lanes
                    .get(&order.lane())
                    .and_then(|order_id| self.routes.get(order_id))
            })
            .or_else(|| self.imputed.get(&order.order_id))
    }

    pub fn cost_for(&self, order_id: &OrderId) -> Option<&CostRecord> {
        self.costs.get(order_id)
    }

    pub fn performance_for(&self, order_id: &OrderId) -> Option<&PerformanceRecord> {
        self.performance.get(order_id)
    }
}

fn index_by_order<T>(
    records: Vec<T>,
    table: Table,
    orders: &BTreeMap<OrderId, Order>,
    key: impl Fn(&T) -> &OrderId,
) -> Result<HashMap<OrderId, T>, DataLoadError> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let order_id = key(&record).clone();
        if !orders.contains_key(&order_id) {
            return Err(DataLoadError::BrokenJoin {
                table,
                kind: "order_id",
                key: order_id.0,
            });
        }
        if index.contains_key(&order_id) {
            return Err(DataLoadError::DuplicateKey {
                table,
                key: order_id.0,
            });
        }
        index.insert(order_id, record);
    }
    Ok(index)
}

/// Median distance, traffic delay and tolls for orders with neither a route
/// of their own nor one on their lane.
fn impute_routes(
    orders: &BTreeMap<OrderId, Order>,
    routes: &HashMap<OrderId, RouteRecord>,
    lanes: &HashMap<(String, String), OrderId>,
) -> HashMap<OrderId, RouteRecord> {
    let medians = (
        median(routes.values().map(|route| route.distance_km)),
        median(routes.values().map(|route| route.traffic_delay_hours)),
        median(routes.values().map(|route| route.toll_charges)),
    );
    let (Some(distance_km), Some(traffic_delay_hours), Some(toll_charges)) = medians else {
        return HashMap::new();
    };

    orders
        .iter()
        .filter(|(order_id, order)| {
            !routes.contains_key(*order_id) && !lanes.contains_key(&order.lane())
        })
        .map(|(order_id, _)| {
            let route = RouteRecord {
                order_id: order_id.clone(),
                route: None,
                distance_km,
                traffic_delay_hours,
                toll_charges,
                fuel_consumption_l: None,
                weather_impact: None,
            };
            (order_id.clone(), route)
        })
        .collect()
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn check_vehicle_ref(
    table: Table,
    vehicle_id: Option<&VehicleId>,
    vehicles: &BTreeMap<VehicleId, Vehicle>,
) -> Result<(), DataLoadError> {
    match vehicle_id {
        Some(id) if !vehicles.contains_key(id) => Err(DataLoadError::BrokenJoin {
            table,
            kind: "vehicle_id",
            key: id.0.clone(),
        }),
        _ => Ok(()),
    }
}
