use metrics_exporter_prometheus::PrometheusHandle;
use nexgen_dispatch::config::AppConfig;
use nexgen_dispatch::dashboard::FilteredTable;
use nexgen_dispatch::dispatch::DispatchService;
use nexgen_dispatch::error::AppError;
use nexgen_dispatch::reference::{ReferenceLoader, ReferenceStore};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) service: Arc<DispatchService>,
}

/// Load the reference tables named by `config`, with an optional directory
/// override, and wrap them in a service.
pub(crate) fn load_service(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
) -> Result<Arc<DispatchService>, AppError> {
    let data_dir = data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let loader = ReferenceLoader::from_config(&config.dispatch);
    let store = ReferenceStore::open(&data_dir, loader)?;
    Ok(Arc::new(DispatchService::new(
        Arc::new(store),
        config.dispatch.clone(),
    )))
}

/// Serialize the table as CSV with a header row.
pub(crate) fn write_orders_csv<W: Write>(table: &FilteredTable, writer: W) -> Result<W, AppError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in &table.rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| AppError::from(csv::Error::from(err.into_error())))
}
