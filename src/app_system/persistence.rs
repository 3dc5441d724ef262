use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::query::Document;

use super::PersistenceError;

/// On-disk image of the whole database: one array of documents per collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub customers: Vec<Document>,
    #[serde(default)]
    pub products: Vec<Document>,
    #[serde(default)]
    pub orders: Vec<Document>,
}

impl Snapshot {
    /// Loads a snapshot, or an empty one if the file does not exist yet.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, PersistenceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot yet, starting empty");
                return Ok(Self::default());
            }
            Err(source) => return Err(io_error(path, source)),
        };
        let snapshot: Self = serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Json {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            customers = snapshot.customers.len(),
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Writes the snapshot next to `path` and renames it into place, so a
    /// crash mid-write never leaves a truncated file behind.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(|source| PersistenceError::Json {
            path: path.display().to_string(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, path).await.map_err(|source| io_error(path, source))?;
        debug!("Snapshot saved");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}
