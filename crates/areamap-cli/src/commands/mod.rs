//! CLI command implementations.

pub mod build;
pub mod info;
pub mod path;
pub mod render;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use areamap::AreaRecord;

/// Read and decode an area record, rejecting records that carry an error
pub(crate) fn load_record(path: &Path) -> Result<AreaRecord> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let record = AreaRecord::decode(&bytes);
    if !record.built {
        bail!(
            "{}: {}",
            path.display(),
            record.error_string.as_deref().unwrap_or("not a built area record")
        );
    }
    Ok(record)
}
