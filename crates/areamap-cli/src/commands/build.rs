use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use areamap::{AreaBuilder, BuildOptions, WorldSnapshot};
use tracing::info;

pub fn run(
    snapshot: &Path,
    area: u32,
    options: BuildOptions,
    indent: usize,
    output: Option<&Path>,
) -> Result<()> {
    let bytes = build_record(snapshot, area, options, indent)?;

    match output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote area {} to {}", area, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Build `area` from a snapshot file and return the encoded record
pub(crate) fn build_record(
    snapshot: &Path,
    area: u32,
    options: BuildOptions,
    indent: usize,
) -> Result<Vec<u8>> {
    let bytes = fs::read(snapshot).with_context(|| format!("Failed to read {}", snapshot.display()))?;
    let world = WorldSnapshot::from_json(&bytes)
        .with_context(|| format!("Invalid snapshot {}", snapshot.display()))?;

    let include_path_data = options.generate_path_data;
    let record = AreaBuilder::new(&world, options).build(area);
    if !record.built {
        bail!(
            "Failed to build area {}: {}",
            area,
            record.error_string.as_deref().unwrap_or("unknown error")
        );
    }

    let encoded = record.encode(include_path_data, indent);
    if encoded.is_empty() {
        bail!("Failed to encode area {}", area);
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use areamap::{AreaRecord, Point, Size};
    use tempfile::NamedTempFile;

    fn snapshot_file() -> NamedTempFile {
        let mut world = WorldSnapshot::default();
        world.push_level(4, Point::new(0, 0), Size::new(2, 1));
        world.push_room(4, Point::new(0, 0), Size::new(2, 1)).open();

        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), world.to_json().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_build_record_from_snapshot() {
        let file = snapshot_file();
        let options = BuildOptions::builder().generate_path_data(true).build();
        let bytes = build_record(file.path(), 4, options, 2).unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\n  \"id\": 4"));

        let record = AreaRecord::decode(&bytes);
        assert!(record.built);
        assert_eq!(record.path_dimensions(), (2, 1));
        assert!(record.has_path_data());
    }

    #[test]
    fn test_build_record_unknown_area() {
        let file = snapshot_file();
        let err = build_record(file.path(), 5, BuildOptions::default(), 0).unwrap_err();
        assert_eq!(err.to_string(), "Failed to build area 5: Level not found: 5");
    }
}
