//! # Export Commands
//!
//! Dumps the product catalog to a CSV file in the configured export
//! directory, named `export_products_<YYYYmmdd_HHMMSS>.csv`.

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mortar_core::export::render_catalog_csv;

/// Where the export landed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExportDto {
    pub path: String,
    pub row_count: usize,
}

fn export_file_name() -> String {
    format!("export_products_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Writes the whole catalog as CSV.
pub async fn export_catalog(db: &DbState, config: &ConfigState) -> Result<ExportDto, ApiError> {
    debug!(dir = %config.export_dir.display(), "export_catalog command");

    let rows = db.inner().products().catalog().await?;
    let content = render_catalog_csv(&rows);

    let path: PathBuf = config.export_dir.join(export_file_name());
    std::fs::create_dir_all(&config.export_dir)
        .and_then(|_| std::fs::write(&path, content))
        .map_err(|e| {
            error!(path = %path.display(), error = %e, "Catalog export failed");
            ApiError::internal(format!("Could not write {}", path.display()))
        })?;

    info!(path = %path.display(), rows = rows.len(), "Catalog exported");

    Ok(ExportDto {
        path: path.display().to_string(),
        row_count: rows.len(),
    })
}
