use nexgen_dispatch::dispatch::domain::{OrderId, VehicleId};
use nexgen_dispatch::dispatch::{CategorySupport, DispatchConfig, Priority};
use nexgen_dispatch::reference::{
    load_reference_data, DataLoadError, ReferenceData, ReferenceLoader, ReferenceStore, Table,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/reference")
}

fn staged_copy() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for table in Table::ALL {
        fs::copy(
            fixture_dir().join(table.file_name()),
            dir.path().join(table.file_name()),
        )
        .expect("copy fixture");
    }
    dir
}

fn rewrite(dir: &TempDir, table: Table, contents: &str) {
    fs::write(dir.path().join(table.file_name()), contents).expect("rewrite table");
}

fn append(dir: &TempDir, table: Table, line: &str) {
    let path = dir.path().join(table.file_name());
    let mut contents = fs::read_to_string(&path).expect("read table");
    contents.push_str(line);
    contents.push('\n');
    fs::write(path, contents).expect("append row");
}

#[test]
fn fixture_tables_load_and_join() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");

    let summary = data.summary();
    assert_eq!(summary.orders, 6);
    assert_eq!(summary.vehicles, 7);
    assert_eq!(summary.available_vehicles, 5);
    assert_eq!(summary.routes, 3);
    assert_eq!(summary.cost_breakdowns, 3);
    assert_eq!(summary.delivery_records, 4);
    assert_eq!(summary.warehouse_inventory, 3);
    assert_eq!(summary.customer_feedback, 2);
    assert_eq!(data.source(), Some(fixture_dir().as_path()));
}

#[test]
fn orders_carry_priority_and_eligibility_category() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");

    let perishable = data.order(&OrderId::from("ORD001")).expect("ORD001");
    assert_eq!(perishable.priority, Priority::High);
    assert_eq!(perishable.category, "Refrigerated");
    assert_eq!(perishable.required_capacity_kg, 420.0);
    assert_eq!(perishable.order_value, Some(4820.5));

    let books = data.order(&OrderId::from("ORD003")).expect("ORD003");
    assert_eq!(books.priority, Priority::Low);
    assert_eq!(books.category, "Standard");
    assert!(books.special_handling.is_none());
}

#[test]
fn vehicles_default_category_support_from_type() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");

    let reefer = data.vehicle(&VehicleId::from("VEH001")).expect("VEH001");
    assert!(reefer.categories.supports("Refrigerated"));
    assert!(!reefer.categories.supports("Standard"));

    let idle = data.vehicle(&VehicleId::from("VEH006")).expect("VEH006");
    assert!(!idle.available);
    assert_eq!(idle.status, "In Maintenance");
}

#[test]
fn traffic_minutes_are_converted_to_hours() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");
    let order = data.order(&OrderId::from("ORD004")).expect("ORD004");

    let route = data.route_for(order).expect("route recorded");
    assert_eq!(route.traffic_delay_hours, 1.5);
    assert_eq!(route.toll_charges, 310.0);
}

#[test]
fn lane_fallback_finds_route_of_sibling_order() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");
    let order = data.order(&OrderId::from("ORD005")).expect("ORD005");

    let route = data.route_for(order).expect("lane route");
    assert_eq!(route.order_id, OrderId::from("ORD003"));
}

#[test]
fn unrouted_lane_gets_median_route() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");
    let order = data.order(&OrderId::from("ORD006")).expect("ORD006");

    let route = data.route_for(order).expect("median route");
    assert_eq!(route.order_id, OrderId::from("ORD006"));
    assert!(route.route.is_none());
    assert_eq!(route.distance_km, 280.0);
    assert_eq!(route.traffic_delay_hours, 0.75);
    assert_eq!(route.toll_charges, 240.0);
    assert_eq!(data.summary().imputed_routes, 1);
}

#[test]
fn delivery_delay_is_derived_from_promised_and_actual_days() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");

    let late = data
        .performance_for(&OrderId::from("ORD003"))
        .expect("ORD003 delivered");
    assert_eq!(late.delivery_delay_hours, Some(48.0));
    assert_eq!(late.carrier.as_deref(), Some("SpeedyLogistics"));
}

#[test]
fn missing_table_names_the_file() {
    let dir = staged_copy();
    fs::remove_file(dir.path().join("cost_breakdown.csv")).expect("remove table");

    let error = load_reference_data(dir.path()).expect_err("missing table");

    match &error {
        DataLoadError::MissingFile { table, path } => {
            assert_eq!(*table, Table::CostBreakdown);
            assert!(path.ends_with("cost_breakdown.csv"));
        }
        other => panic!("expected missing file, got {other:?}"),
    }
    assert!(error.to_string().contains("cost breakdown"));
}

#[test]
fn non_numeric_capacity_is_a_csv_error() {
    let dir = staged_copy();
    append(
        &dir,
        Table::VehicleFleet,
        "VEH099,Van,lots,10.0,Pune,Available,1.0,0.2",
    );

    let error = load_reference_data(dir.path()).expect_err("bad capacity");

    assert!(matches!(
        error,
        DataLoadError::Csv {
            table: Table::VehicleFleet,
            ..
        }
    ));
}

#[test]
fn negative_distance_is_rejected() {
    let dir = staged_copy();
    append(&dir, Table::RoutesDistance, "ORD002,Mumbai-Pune,-12,3.0,0,0,None");

    let error = load_reference_data(dir.path()).expect_err("negative distance");

    match error {
        DataLoadError::InvalidField {
            table, key, field, ..
        } => {
            assert_eq!(table, Table::RoutesDistance);
            assert_eq!(key, "ORD002");
            assert_eq!(field, "distance_km");
        }
        other => panic!("expected invalid field, got {other:?}"),
    }
}

#[test]
fn zero_fuel_efficiency_is_rejected() {
    let dir = staged_copy();
    append(
        &dir,
        Table::VehicleFleet,
        "VEH099,Van,900,0,Pune,Available,1.0,0.2",
    );

    let error = load_reference_data(dir.path()).expect_err("zero efficiency");

    assert!(matches!(
        error,
        DataLoadError::InvalidField {
            field: "fuel_efficiency_km_per_l",
            ..
        }
    ));
}

#[test]
fn unknown_priority_is_rejected() {
    let dir = staged_copy();
    append(
        &dir,
        Table::Orders,
        "ORD099,2024-09-07,SMB,Whenever,Books,100,Pune,Mumbai,,5",
    );

    let error = load_reference_data(dir.path()).expect_err("bad priority");

    assert!(matches!(
        error,
        DataLoadError::InvalidField {
            table: Table::Orders,
            field: "priority",
            ..
        }
    ));
}

#[test]
fn duplicate_vehicle_ids_are_rejected() {
    let dir = staged_copy();
    append(
        &dir,
        Table::VehicleFleet,
        "VEH003,Van,900,10.0,Pune,Available,1.0,0.2",
    );

    let error = load_reference_data(dir.path()).expect_err("duplicate vehicle");

    match error {
        DataLoadError::DuplicateKey { table, key } => {
            assert_eq!(table, Table::VehicleFleet);
            assert_eq!(key, "VEH003");
        }
        other => panic!("expected duplicate key, got {other:?}"),
    }
}

#[test]
fn cost_rows_must_reference_known_orders() {
    let dir = staged_copy();
    append(&dir, Table::CostBreakdown, "ORD777,1,1,1,1,1,1,1");

    let error = load_reference_data(dir.path()).expect_err("broken join");

    assert!(matches!(
        error,
        DataLoadError::BrokenJoin {
            table: Table::CostBreakdown,
            kind: "order_id",
            ..
        }
    ));
}

#[test]
fn cost_rows_must_reference_known_vehicles() {
    let dir = staged_copy();
    rewrite(
        &dir,
        Table::CostBreakdown,
        "Order_ID,Vehicle_ID,Fuel_Cost,Labor_Cost,Vehicle_Maintenance,Insurance,Packaging_Cost,Technology_Platform_Fee,Other_Overhead\n\
ORD001,VEH001,34.2,70.0,12.0,6.5,8.0,3.0,1.5\n\
ORD003,VEH999,38.0,120.0,18.0,9.0,2.0,3.0,0.0\n",
    );

    let error = load_reference_data(dir.path()).expect_err("broken vehicle join");

    match error {
        DataLoadError::BrokenJoin {
            table: Table::CostBreakdown,
            kind: "vehicle_id",
            key,
        } => assert_eq!(key, "VEH999"),
        other => panic!("expected broken vehicle join, got {other:?}"),
    }
}

#[test]
fn explicit_category_columns_override_type_defaults() {
    let dir = staged_copy();
    rewrite(
        &dir,
        Table::VehicleFleet,
        "Vehicle_ID,Vehicle_Type,Capacity_KG,Fuel_Efficiency_KM_per_L,CO2_Emissions_Kg_per_KM,Supported_Categories,General_Purpose\n\
VEH001,Refrigerated Unit,800,6.5,0.38,Refrigerated;Standard,\n\
VEH002,Truck,4000,4.2,0.85,,yes\n",
    );

    let data = load_reference_data(dir.path()).expect("fleet loads");

    let reefer = data.vehicle(&VehicleId::from("VEH001")).expect("VEH001");
    assert!(reefer.categories.supports("standard"));
    assert!(reefer.available, "missing status column means available");
    let truck = data.vehicle(&VehicleId::from("VEH002")).expect("VEH002");
    assert_eq!(truck.categories, CategorySupport::GeneralPurpose);
}

#[test]
fn configured_perishables_change_eligibility_category() {
    let config = DispatchConfig {
        perishable_categories: vec!["Books".to_string()],
        ..DispatchConfig::default()
    };

    let data = ReferenceLoader::from_config(&config)
        .load(fixture_dir())
        .expect("fixtures load");

    assert_eq!(
        data.order(&OrderId::from("ORD003")).expect("ORD003").category,
        "Refrigerated"
    );
    assert_eq!(
        data.order(&OrderId::from("ORD005")).expect("ORD005").category,
        "Standard"
    );
}

#[test]
fn failed_reload_keeps_previous_snapshot() {
    let dir = staged_copy();
    let store =
        ReferenceStore::open(dir.path(), ReferenceLoader::default()).expect("initial load");
    let before = store.snapshot();

    fs::remove_file(dir.path().join("orders.csv")).expect("remove orders");
    let error = store.reload().expect_err("reload fails");

    assert_eq!(error.table(), Some(Table::Orders));
    let after = store.snapshot();
    assert_eq!(after.summary(), before.summary());
    assert_eq!(after.loaded_at(), before.loaded_at());
}

#[test]
fn successful_reload_swaps_snapshot() {
    let dir = staged_copy();
    let store =
        ReferenceStore::open(dir.path(), ReferenceLoader::default()).expect("initial load");
    let before = store.snapshot();

    append(
        &dir,
        Table::Orders,
        "ORD007,2024-09-07,SMB,Standard,Books,100,Pune,Mumbai,,5",
    );
    let next = store.reload().expect("reload succeeds");

    assert_eq!(next.summary().orders, 7);
    assert_eq!(store.snapshot().summary().orders, 7);
    assert_eq!(before.summary().orders, 6, "held snapshots are unchanged");
}

#[test]
fn reload_keeps_the_configured_loader() {
    let dir = staged_copy();
    let config = DispatchConfig {
        perishable_categories: vec!["Books".to_string()],
        ..DispatchConfig::default()
    };
    let loader = ReferenceLoader::from_config(&config);
    let data = loader.load(dir.path()).expect("initial load");
    let store = ReferenceStore::from_data(data, loader);

    let next = store.reload().expect("reload succeeds");

    assert_eq!(
        next.order(&OrderId::from("ORD003")).expect("ORD003").category,
        "Refrigerated"
    );
}

#[test]
fn reload_without_source_directory_is_rejected() {
    let data = load_reference_data(fixture_dir()).expect("fixtures load");
    let detached = ReferenceData::from_parts(
        data.orders().cloned().collect(),
        data.vehicles().cloned().collect(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    )
    .expect("tables join");
    let store = ReferenceStore::from_data(detached, ReferenceLoader::default());
    let before = store.snapshot();

    let error = store.reload().expect_err("nothing to reload from");

    assert!(matches!(error, DataLoadError::NotReloadable));
    assert_eq!(error.table(), None);
    assert_eq!(store.snapshot().loaded_at(), before.loaded_at());
}
