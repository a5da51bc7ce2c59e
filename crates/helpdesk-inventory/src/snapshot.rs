//! JSON snapshot persistence so a standalone scanner keeps its inventory
//! across restarts.

use std::path::Path;

use helpdesk_core::Equipment;

use crate::client::{InventoryClient, InventoryError, Result};

impl InventoryClient {
    /// Load a snapshot written by [`InventoryClient::save_snapshot`].
    /// A missing file yields an empty inventory.
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No inventory snapshot, starting empty");
            return Ok(Self::new());
        }

        let data = std::fs::read(path)?;
        let records: Vec<Equipment> =
            serde_json::from_slice(&data).map_err(|e| InventoryError::Snapshot(e.to_string()))?;

        tracing::info!(path = %path.display(), records = records.len(), "Inventory snapshot loaded");
        Ok(Self::with_records(records))
    }

    /// Write all records as pretty JSON, replacing the file atomically.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let records = self.list().await;
        let json = serde_json::to_vec_pretty(&records)
            .map_err(|e| InventoryError::Snapshot(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        tracing::info!(path = %path.display(), records = records.len(), "Inventory snapshot saved");
        Ok(())
    }
}
