use super::{DataLoadError, ReferenceData, ReferenceLoader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Process-wide holder of the current reference snapshot.
///
/// Readers take an `Arc` to a complete [`ReferenceData`]; a reload builds the
/// next snapshot off to the side and swaps the pointer in one step, so a
/// request never sees tables from two different loads.
#[derive(Debug)]
pub struct ReferenceStore {
    source: Option<PathBuf>,
    loader: ReferenceLoader,
    current: RwLock<Arc<ReferenceData>>,
}

impl ReferenceStore {
    pub fn open<P: AsRef<Path>>(path: P, loader: ReferenceLoader) -> Result<Self, DataLoadError> {
        let data = loader.load(path.as_ref())?;
        Ok(Self {
            source: Some(path.as_ref().to_path_buf()),
            loader,
            current: RwLock::new(Arc::new(data)),
        })
    }

    /// Wrap an in-memory snapshot. Reloads re-read its source directory with
    /// `loader`; a snapshot built without one cannot be reloaded.
    pub fn from_data(data: ReferenceData, loader: ReferenceLoader) -> Self {
        Self {
            source: data.source().map(Path::to_path_buf),
            loader,
            current: RwLock::new(Arc::new(data)),
        }
    }

    pub fn snapshot(&self) -> Arc<ReferenceData> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the source directory and publish the result. On failure the
    /// previous snapshot stays current.
    pub fn reload(&self) -> Result<Arc<ReferenceData>, DataLoadError> {
        let Some(source) = self.source.as_deref() else {
            return Err(DataLoadError::NotReloadable);
        };

        let next = match self.loader.load(source) {
            Ok(data) => Arc::new(data),
            Err(err) => {
                warn!(error = %err, "reference reload failed; keeping previous snapshot");
                return Err(err);
            }
        };

        self.replace(Arc::clone(&next));
        info!(
            path = %source.display(),
            orders = next.summary().orders,
            vehicles = next.summary().vehicles,
            "reference snapshot swapped"
        );
        Ok(next)
    }

    pub fn replace(&self, next: Arc<ReferenceData>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }
}
