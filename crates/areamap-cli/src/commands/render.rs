//! Text rendering of one or more area records.
//!
//! Records are placed at their global crop position on a shared canvas, so
//! neighbouring areas line up. Exits, NPCs and objects are drawn on top.

use std::path::PathBuf;

use anyhow::{Result, bail};
use areamap::{AreaRecord, Point, Rect};
use owo_colors::OwoColorize;

use super::load_record;
use crate::config::RenderConfig;

/// Largest canvas that will be drawn
const MAX_CELLS: usize = 4096 * 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Void,
    Blocked,
    Walkable,
    Edge,
    Exit,
    Npc,
    Object,
}

pub fn run(paths: &[PathBuf], style: &RenderConfig, edges: bool) -> Result<()> {
    let records = paths
        .iter()
        .map(|path| load_record(path))
        .collect::<Result<Vec<_>>>()?;

    for line in render(&records, style, edges)? {
        println!("{}", line);
    }
    Ok(())
}

fn global_crop(record: &AreaRecord) -> Rect {
    let origin = record.crop_origin();
    let (w, h) = record.crop_dimensions();
    Rect::new(origin.x, origin.y, origin.x + w as i32, origin.y + h as i32)
}

fn render(records: &[AreaRecord], style: &RenderConfig, edges: bool) -> Result<Vec<String>> {
    let bounds = records
        .iter()
        .map(global_crop)
        .reduce(|a, b| Rect::new(a.x0.min(b.x0), a.y0.min(b.y0), a.x1.max(b.x1), a.y1.max(b.y1)));
    let Some(bounds) = bounds.filter(|b| !b.is_empty()) else {
        bail!("Nothing to render");
    };

    let pitch = bounds.width() as usize;
    let rows = bounds.height() as usize;
    if pitch * rows > MAX_CELLS {
        bail!("Canvas of {}x{} cells is too large to render", pitch, rows);
    }

    let mut canvas = vec![Cell::Void; pitch * rows];
    let edge = if edges { Cell::Edge } else { Cell::Blocked };
    for record in records {
        let origin = record.crop_origin();
        record.extract_cell_data_at(
            &mut canvas,
            pitch,
            rows,
            origin.x - bounds.x0,
            origin.y - bounds.y0,
            Cell::Blocked,
            Cell::Walkable,
            edge,
        );
    }

    let mut mark = |p: &Point, cell: Cell| {
        if bounds.contains(*p) {
            canvas[(p.y - bounds.y0) as usize * pitch + (p.x - bounds.x0) as usize] = cell;
        }
    };
    for record in records {
        record.objects.values().flatten().for_each(|p| mark(p, Cell::Object));
        record.npcs.values().flatten().for_each(|p| mark(p, Cell::Npc));
        record
            .exits
            .values()
            .flat_map(|exit| &exit.offsets)
            .for_each(|p| mark(p, Cell::Exit));
    }

    Ok(canvas
        .chunks(pitch)
        .map(|row| row.iter().map(|&cell| draw(cell, style)).collect())
        .collect())
}

fn draw(cell: Cell, style: &RenderConfig) -> String {
    let ch = match cell {
        Cell::Void => ' ',
        Cell::Blocked => style.blocked,
        Cell::Walkable => style.walkable,
        Cell::Edge => style.edge,
        Cell::Exit => 'E',
        Cell::Npc => 'N',
        Cell::Object => 'O',
    };
    if !style.color {
        return ch.to_string();
    }
    match cell {
        Cell::Void | Cell::Blocked => ch.to_string(),
        Cell::Walkable => ch.dimmed().to_string(),
        Cell::Edge => ch.bold().to_string(),
        Cell::Exit => ch.green().bold().to_string(),
        Cell::Npc => ch.yellow().to_string(),
        Cell::Object => ch.cyan().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use areamap::{Exit, Size, encode_map_data};

    fn plain() -> RenderConfig {
        RenderConfig {
            color: false,
            ..RenderConfig::default()
        }
    }

    fn record(id: u32, offset: Point, rows: &[&str]) -> AreaRecord {
        let width = rows[0].len();
        let walkable: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|c| c == '.')).collect();
        let mut record = AreaRecord::new(id);
        record.offset = offset;
        record.size = Size::new(width as i32, rows.len() as i32);
        record.crop = Rect::new(0, 0, width as i32, rows.len() as i32);
        record.map_data = encode_map_data(&walkable, width, rows.len());
        record.built = true;
        record
    }

    #[test]
    fn test_render_single_record() {
        let mut area = record(1, Point::new(0, 0), &["####", "#..#", "####"]);
        area.npcs.insert(100, vec![Point::new(1, 1)]);

        let lines = render(&[area.clone()], &plain(), false).unwrap();
        assert_eq!(lines, vec!["    ", " N. ", "    "]);

        let lines = render(&[area], &plain(), true).unwrap();
        // corners touch no walkable cell
        assert_eq!(lines, vec![" ## ", "#N.#", " ## "]);
    }

    #[test]
    fn test_render_composites_neighbours() {
        let mut left = record(1, Point::new(0, 0), &["..", ".."]);
        left.exits.insert(
            2,
            Exit {
                offsets: vec![Point::new(1, 0)],
                is_portal: false,
            },
        );
        let right = record(2, Point::new(3, 1), &["."]);

        let lines = render(&[left, right], &plain(), false).unwrap();
        assert_eq!(lines, vec![".E  ", ".. ."]);
    }

    #[test]
    fn test_render_nothing() {
        assert!(render(&[], &plain(), false).is_err());
    }
}
