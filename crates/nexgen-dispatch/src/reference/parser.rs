use super::error::{DataLoadError, Table};
use super::normalizer::normalize_header;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

pub(crate) fn open_table(dir: &Path, table: Table) -> Result<File, DataLoadError> {
    let path = dir.join(table.file_name());
    File::open(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            DataLoadError::MissingFile { table, path }
        } else {
            DataLoadError::Io {
                table,
                path,
                source,
            }
        }
    })
}

fn csv_reader<R: Read>(reader: R, table: Table) -> Result<csv::Reader<R>, DataLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| DataLoadError::Csv { table, source })?
        .iter()
        .map(normalize_header)
        .collect::<csv::StringRecord>();
    csv_reader.set_headers(headers);
    Ok(csv_reader)
}

/// Deserialize every row of a table after canonicalizing its header.
pub(crate) fn parse_rows<R, T>(reader: R, table: Table) -> Result<Vec<T>, DataLoadError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv_reader(reader, table)?;
    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<T>() {
        rows.push(record.map_err(|source| DataLoadError::Csv { table, source })?);
    }
    Ok(rows)
}

/// Check that an unjoined table is well-formed CSV and count its rows.
pub(crate) fn count_rows<R: Read>(reader: R, table: Table) -> Result<usize, DataLoadError> {
    let mut csv_reader = csv_reader(reader, table)?;
    let mut count = 0;
    for record in csv_reader.records() {
        record.map_err(|source| DataLoadError::Csv { table, source })?;
        count += 1;
    }
    Ok(count)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderRow {
    pub(crate) order_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) order_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) customer_segment: Option<String>,
    pub(crate) priority: String,
    pub(crate) product_category: String,
    #[serde(default, alias = "order_value_inr")]
    pub(crate) order_value: Option<f64>,
    pub(crate) origin: String,
    pub(crate) destination: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) special_handling: Option<String>,
    #[serde(default, alias = "required_capacity_kg", alias = "weight")]
    pub(crate) weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VehicleRow {
    pub(crate) vehicle_id: String,
    pub(crate) vehicle_type: String,
    pub(crate) capacity_kg: f64,
    pub(crate) fuel_efficiency_km_per_l: f64,
    pub(crate) co2_emissions_kg_per_km: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) current_location: Option<String>,
    #[serde(default)]
    pub(crate) age_years: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) supported_categories: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) general_purpose: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteRow {
    pub(crate) order_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) route: Option<String>,
    pub(crate) distance_km: f64,
    #[serde(default, alias = "fuel_consumption_liters")]
    pub(crate) fuel_consumption_l: Option<f64>,
    #[serde(default, alias = "toll_charges_inr")]
    pub(crate) toll_charges: Option<f64>,
    #[serde(default, alias = "traffic_delays_minutes")]
    pub(crate) traffic_delay_minutes: Option<f64>,
    #[serde(default, alias = "traffic_delays_hours")]
    pub(crate) traffic_delay_hours: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) weather_impact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CostRow {
    pub(crate) order_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) vehicle_id: Option<String>,
    #[serde(default)]
    pub(crate) fuel_cost: Option<f64>,
    #[serde(default)]
    pub(crate) labor_cost: Option<f64>,
    #[serde(default)]
    pub(crate) vehicle_maintenance: Option<f64>,
    #[serde(default)]
    pub(crate) insurance: Option<f64>,
    #[serde(default)]
    pub(crate) packaging_cost: Option<f64>,
    #[serde(default)]
    pub(crate) technology_platform_fee: Option<f64>,
    #[serde(default)]
    pub(crate) other_overhead: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PerformanceRow {
    pub(crate) order_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) vehicle_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) carrier: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) promised_delivery_days: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) actual_delivery_days: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) delivery_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) quality_issue: Option<String>,
    #[serde(default)]
    pub(crate) customer_rating: Option<f64>,
    #[serde(default, alias = "delivery_cost_inr")]
    pub(crate) delivery_cost: Option<f64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// A promised or actual delivery marker: either elapsed days or a timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DeliveryMark {
    Days(f64),
    At(NaiveDateTime),
}

pub(crate) fn parse_delivery_mark(value: &str) -> Option<DeliveryMark> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(days) = trimmed.parse::<f64>() {
        return days.is_finite().then_some(DeliveryMark::Days(days));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(DeliveryMark::At(dt.naive_utc()));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(DeliveryMark::At(dt));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(DeliveryMark::At)
}

/// Hours between promised and actual delivery, `None` when the two marks are
/// of different kinds.
pub(crate) fn delay_hours(promised: DeliveryMark, actual: DeliveryMark) -> Option<f64> {
    match (promised, actual) {
        (DeliveryMark::Days(promised), DeliveryMark::Days(actual)) => {
            Some((actual - promised) * 24.0)
        }
        (DeliveryMark::At(promised), DeliveryMark::At(actual)) => {
            Some((actual - promised).num_seconds() as f64 / 3600.0)
        }
        _ => None,
    }
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
