use std::path::Path;

use anyhow::{Result, bail};
use areamap::{AreaRecord, Point};
use tracing::info;

use super::load_record;

pub fn run(path: &Path, from: Point, to: Point, merge: bool) -> Result<()> {
    let mut record = load_record(path)?;
    for point in query(&mut record, from, to, merge)? {
        println!("{},{}", point.x, point.y);
    }
    Ok(())
}

fn query(record: &mut AreaRecord, from: Point, to: Point, merge: bool) -> Result<Vec<Point>> {
    if !record.has_path_data() {
        info!("Area {} has no path data, generating it", record.id);
        record.generate_path_data();
    }

    let path = record.find_path(from, to, merge);
    if path.is_empty() {
        bail!(
            "No path from ({}, {}) to ({}, {}) in area {}",
            from.x,
            from.y,
            to.x,
            to.y,
            record.id
        );
    }
    Ok(path)
}
