//! Openings along the boundary between an area and its neighbours.
//!
//! A neighbour room is first probed from its own side (its boundary strip
//! and the strip behind it). The resulting spans are merged per neighbour
//! level and side, then re-checked against the assembled area grid so that
//! only openings walkable on both sides survive.

use std::ops::Range;

use strum::{Display, IntoStaticStr};

use crate::geometry::{Point, Rect};
use crate::provider::CollisionBitmap;

use super::canvas::AreaCanvas;

/// Side of a room on which a neighbour lies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoStaticStr, Display)]
pub enum Side {
    #[strum(serialize = "left")]
    Left,
    #[strum(serialize = "right")]
    Right,
    #[strum(serialize = "top")]
    Top,
    #[strum(serialize = "bottom")]
    Bottom,
}

impl Side {
    /// Where `near` touches `room`, if the two share an edge of non-zero length.
    pub fn between(room: &Rect, near: &Rect) -> Option<Side> {
        let overlap_y = near.y0 < room.y1 && room.y0 < near.y1;
        let overlap_x = near.x0 < room.x1 && room.x0 < near.x1;

        if near.x1 == room.x0 && overlap_y {
            Some(Side::Left)
        } else if near.x0 == room.x1 && overlap_y {
            Some(Side::Right)
        } else if near.y1 == room.y0 && overlap_x {
            Some(Side::Top)
        } else if near.y0 == room.y1 && overlap_x {
            Some(Side::Bottom)
        } else {
            None
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Cell at coordinate `fixed` across the boundary and `z` along it
    pub fn cell(self, fixed: i32, z: i32) -> Point {
        if self.is_vertical() {
            Point::new(fixed, z)
        } else {
            Point::new(z, fixed)
        }
    }

    /// Coordinates running along the boundary
    fn along(self, rect: &Rect) -> Range<i32> {
        if self.is_vertical() {
            rect.y0..rect.y1
        } else {
            rect.x0..rect.x1
        }
    }

    /// The room's own outermost line of cells on this side
    fn own_edge(self, room: &Rect) -> i32 {
        match self {
            Side::Left => room.x0,
            Side::Right => room.x1 - 1,
            Side::Top => room.y0,
            Side::Bottom => room.y1 - 1,
        }
    }

    /// Step from the edge towards the room's interior
    fn inward(self) -> i32 {
        match self {
            Side::Left | Side::Top => 1,
            Side::Right | Side::Bottom => -1,
        }
    }

    /// Neighbour's boundary line and the line behind it
    fn neighbour_strips(self, room: &Rect) -> (i32, i32) {
        let edge = self.own_edge(room);
        let outward = -self.inward();
        (edge + outward, edge + 2 * outward)
    }
}

/// An opening towards `level_id`, `start..end` along the boundary.
///
/// `edge` is this area's outermost line on that side, in global cells.
/// Field order is the sort order used for merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BoundarySpan {
    pub level_id: u32,
    pub side: Side,
    pub edge: i32,
    pub start: i32,
    pub end: i32,
}

impl BoundarySpan {
    /// Opening width in cells
    pub fn width(&self) -> i32 {
        self.end - self.start
    }

    /// Exit position at the middle of the opening
    pub fn midpoint(&self) -> Point {
        self.side.cell(self.edge, (self.start + self.end) / 2)
    }

    fn same_line(&self, other: &BoundarySpan) -> bool {
        self.level_id == other.level_id && self.side == other.side && self.edge == other.edge
    }
}

/// Maximal `start..end` runs over `range` where `open` holds
pub fn open_runs(range: Range<i32>, open: impl Fn(i32) -> bool) -> Vec<(i32, i32)> {
    let mut runs = Vec::new();
    let mut start = None;
    let end = range.end;

    for z in range {
        match (open(z), start) {
            (true, None) => start = Some(z),
            (false, Some(s)) => {
                runs.push((s, z));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, end));
    }
    runs
}

/// Probe a neighbour's collision along the edge it shares with `room`.
///
/// `room` is in global cells. A position counts as open when both the
/// neighbour's boundary cell and the cell behind it are walkable.
pub fn scan_neighbour(
    level_id: u32,
    side: Side,
    room: &Rect,
    bitmap: &CollisionBitmap,
) -> Vec<BoundarySpan> {
    let (outer, inner) = side.neighbour_strips(room);
    let edge = side.own_edge(room);

    open_runs(side.along(room), |z| {
        bitmap.is_walkable_at(side.cell(outer, z)) && bitmap.is_walkable_at(side.cell(inner, z))
    })
    .into_iter()
    .map(|(start, end)| BoundarySpan {
        level_id,
        side,
        edge,
        start,
        end,
    })
    .collect()
}

/// Sort spans and join the ones that touch or overlap on the same line
pub fn merge_spans(mut spans: Vec<BoundarySpan>) -> Vec<BoundarySpan> {
    spans.sort();
    let mut merged: Vec<BoundarySpan> = Vec::with_capacity(spans.len());

    for span in spans {
        match merged.last_mut() {
            Some(last) if last.same_line(&span) && span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Keep the parts of `span` that are also walkable on this area's side
pub fn refine(span: &BoundarySpan, canvas: &AreaCanvas) -> Vec<BoundarySpan> {
    let along = span.side.along(&canvas.global_crop());
    let range = span.start.max(along.start)..span.end.min(along.end);
    let inner = span.edge + span.side.inward();

    open_runs(range, |z| {
        canvas.is_walkable(span.side.cell(span.edge, z))
            && canvas.is_walkable(span.side.cell(inner, z))
    })
    .into_iter()
    .map(|(start, end)| BoundarySpan {
        start,
        end,
        ..*span
    })
    .collect()
}
