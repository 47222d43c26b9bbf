use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The seven source tables expected in a reference data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Orders,
    VehicleFleet,
    RoutesDistance,
    CostBreakdown,
    DeliveryPerformance,
    WarehouseInventory,
    CustomerFeedback,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Orders,
        Table::VehicleFleet,
        Table::RoutesDistance,
        Table::CostBreakdown,
        Table::DeliveryPerformance,
        Table::WarehouseInventory,
        Table::CustomerFeedback,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Orders => "orders.csv",
            Self::VehicleFleet => "vehicle_fleet.csv",
            Self::RoutesDistance => "routes_distance.csv",
            Self::CostBreakdown => "cost_breakdown.csv",
            Self::DeliveryPerformance => "delivery_performance.csv",
            Self::WarehouseInventory => "warehouse_inventory.csv",
            Self::CustomerFeedback => "customer_feedback.csv",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::VehicleFleet => "vehicle fleet",
            Self::RoutesDistance => "routes/distance",
            Self::CostBreakdown => "cost breakdown",
            Self::DeliveryPerformance => "delivery performance",
            Self::WarehouseInventory => "warehouse inventory",
            Self::CustomerFeedback => "customer feedback",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised while loading reference data. Any of these aborts the load; no
/// partially loaded reference set is ever exposed.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("missing {table} table: expected {}", .path.display())]
    MissingFile { table: Table, path: PathBuf },
    #[error("failed to read {table} table at {}: {source}", .path.display())]
    Io {
        table: Table,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {table} table: {source}")]
    Csv {
        table: Table,
        #[source]
        source: csv::Error,
    },
    #[error("invalid {field} in {table} row '{key}': {detail}")]
    InvalidField {
        table: Table,
        key: String,
        field: &'static str,
        detail: String,
    },
    #[error("duplicate key '{key}' in {table} table")]
    DuplicateKey { table: Table, key: String },
    #[error("{table} row references unknown {kind} '{key}'")]
    BrokenJoin {
        table: Table,
        kind: &'static str,
        key: String,
    },
    #[error("reference data has no source directory to reload from")]
    NotReloadable,
}

impl DataLoadError {
    /// The table the failure was found in, if it came from one.
    pub fn table(&self) -> Option<Table> {
        match self {
            Self::MissingFile { table, .. }
            | Self::Io { table, .. }
            | Self::Csv { table, .. }
            | Self::InvalidField { table, .. }
            | Self::DuplicateKey { table, .. }
            | Self::BrokenJoin { table, .. } => Some(*table),
            Self::NotReloadable => None,
        }
    }
}
