use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use areamap::AreaRecord;

use super::load_record;

pub fn run(path: &Path) -> Result<()> {
    let record = load_record(path)?;
    print!("{}", summarize(&record));
    record.check_map_data()?;
    Ok(())
}

fn summarize(record: &AreaRecord) -> String {
    let (width, height) = record.crop_dimensions();
    let walkable = record
        .extract_cell_data(0usize, 1usize)
        .into_iter()
        .sum::<usize>();

    let mut out = String::new();
    let _ = writeln!(out, "Area {}", record.id);
    let _ = writeln!(out, "  Offset:   ({}, {})", record.offset.x, record.offset.y);
    let _ = writeln!(out, "  Size:     {}x{}", record.size.width, record.size.height);
    let _ = writeln!(
        out,
        "  Crop:     ({}, {}) - ({}, {}), {}x{}",
        record.crop.x0, record.crop.y0, record.crop.x1, record.crop.y1, width, height
    );
    let _ = writeln!(out, "  Walkable: {} of {} cells", walkable, width * height);
    let _ = writeln!(out, "  Runs:     {}", record.map_data.len());

    if record.has_path_data() {
        let (w, h) = record.path_dimensions();
        let _ = writeln!(out, "  Path:     {}x{} coarse cells", w, h);
    } else {
        let _ = writeln!(out, "  Path:     not included");
    }

    let _ = writeln!(out, "  Exits:    {}", record.exits.len());
    for (target, exit) in &record.exits {
        let kind = if exit.is_portal { "portal" } else { "walk" };
        let offsets: Vec<String> = exit
            .offsets
            .iter()
            .map(|p| format!("({}, {})", p.x, p.y))
            .collect();
        let _ = writeln!(out, "    -> {} [{}] {}", target, kind, offsets.join(" "));
    }

    let npc_count: usize = record.npcs.values().map(Vec::len).sum();
    let object_count: usize = record.objects.values().map(Vec::len).sum();
    let _ = writeln!(out, "  NPCs:     {} ({} kinds)", npc_count, record.npcs.len());
    let _ = writeln!(out, "  Objects:  {} ({} kinds)", object_count, record.objects.len());
    out
}
