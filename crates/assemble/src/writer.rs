//! Panel CSV output.

use panel_core::{NormalizedRecord, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Write panel rows to `path` with the unified column header.
///
/// The header is written even for an empty panel. Non-finite values are
/// written as `NaN` / `inf` / `-inf`.
pub fn write_panel_csv(path: &Path, rows: &[NormalizedRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(NormalizedRecord::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "panel written");
    Ok(())
}
