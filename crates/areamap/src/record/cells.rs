use crate::error::{Error, Result};

use super::AreaRecord;

/// Row terminator in `map_data`
const ROW_END: i16 = -1;

/// Run-length encode a row-major walkability grid.
///
/// Each row starts with a blocked run (possibly empty) and alternates from
/// there. Runs that do not fit in an `i16` are split with an empty run of the
/// opposite kind so the alternation is preserved. Missing cells count as
/// blocked.
pub fn encode_map_data(walkable: &[bool], width: usize, height: usize) -> Vec<i16> {
    let mut out = Vec::new();
    for y in 0..height {
        let mut last = false;
        let mut count = 0usize;
        for x in 0..width {
            let cell = walkable.get(y * width + x).copied().unwrap_or(false);
            if cell == last {
                count += 1;
                continue;
            }
            push_run(&mut out, count);
            count = 1;
            last = cell;
        }
        push_run(&mut out, count);
        out.push(ROW_END);
    }
    out
}

fn push_run(out: &mut Vec<i16>, mut count: usize) {
    let max = i16::MAX as usize;
    while count > max {
        out.extend_from_slice(&[i16::MAX, 0]);
        count -= max;
    }
    out.push(count as i16);
}

/// Visit each walkable run as `(row, start, end)` with `end` exclusive.
///
/// Stops when `height` rows are done or the data runs out, whichever is
/// first. Runs spilling past `width` are clipped.
fn for_each_walkable_run(
    map_data: &[i16],
    width: usize,
    height: usize,
    mut visit: impl FnMut(usize, usize, usize),
) {
    let mut row = 0;
    let mut x = 0usize;
    let mut walkable = false;

    for &value in map_data {
        if row >= height {
            break;
        }
        if value < 0 {
            row += 1;
            x = 0;
            walkable = false;
            continue;
        }
        let end = (x + value as usize).min(width);
        if walkable && end > x {
            visit(row, x, end);
        }
        x = end;
        walkable = !walkable;
    }
}

impl AreaRecord {
    /// Expand `map_data` into a dense crop-sized grid
    pub fn extract_cell_data<T: Copy>(&self, nonwalkable: T, walkable: T) -> Vec<T> {
        let mut output = Vec::new();
        self.extract_cell_data_into(&mut output, nonwalkable, walkable);
        output
    }

    /// Like [`extract_cell_data`](Self::extract_cell_data), reusing `output`'s allocation
    pub fn extract_cell_data_into<T: Copy>(&self, output: &mut Vec<T>, nonwalkable: T, walkable: T) {
        let (width, height) = self.crop_dimensions();
        output.clear();
        output.resize(width * height, nonwalkable);

        for_each_walkable_run(&self.map_data, width, height, |row, start, end| {
            output[row * width + start..row * width + end].fill(walkable);
        });
    }

    /// Draw this record into a shared canvas of `pitch x rows` cells with the
    /// crop's top-left cell at `(ox, oy)`.
    ///
    /// Blocked cells with a walkable 4-neighbour are written as `edge`, which
    /// lets several areas be composited into one outlined map. Cells falling
    /// outside the canvas are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn extract_cell_data_at<T: Copy>(
        &self,
        output: &mut [T],
        pitch: usize,
        rows: usize,
        ox: i32,
        oy: i32,
        nonwalkable: T,
        walkable: T,
        edge: T,
    ) {
        let (width, height) = self.crop_dimensions();
        let cells = self.extract_cell_data(false, true);
        let open = |x: usize, y: usize| cells[y * width + x];

        for y in 0..height {
            let Ok(dy) = usize::try_from(oy + y as i32) else {
                continue;
            };
            if dy >= rows {
                break;
            }
            for x in 0..width {
                let Ok(dx) = usize::try_from(ox + x as i32) else {
                    continue;
                };
                if dx >= pitch {
                    break;
                }
                let value = if open(x, y) {
                    walkable
                } else if (x > 0 && open(x - 1, y))
                    || (x + 1 < width && open(x + 1, y))
                    || (y > 0 && open(x, y - 1))
                    || (y + 1 < height && open(x, y + 1))
                {
                    edge
                } else {
                    nonwalkable
                };
                if let Some(slot) = output.get_mut(dy * pitch + dx) {
                    *slot = value;
                }
            }
        }
    }

    /// Verify that every encoded row spans exactly the crop width and that
    /// there is one row per crop line
    pub fn check_map_data(&self) -> Result<()> {
        let (width, height) = self.crop_dimensions();
        let mut rows = 0usize;
        let mut sum = 0usize;

        for &value in &self.map_data {
            match value {
                ROW_END => {
                    if sum != width {
                        return Err(Error::InvalidMapData {
                            row: rows,
                            message: format!("runs sum to {}, expected {}", sum, width),
                        });
                    }
                    rows += 1;
                    sum = 0;
                }
                v if v < 0 => {
                    return Err(Error::InvalidMapData {
                        row: rows,
                        message: format!("unexpected negative run {}", v),
                    });
                }
                v => sum += v as usize,
            }
        }

        if sum != 0 {
            return Err(Error::InvalidMapData {
                row: rows,
                message: "last row is not terminated".to_string(),
            });
        }
        if rows != height {
            return Err(Error::InvalidMapData {
                row: rows,
                message: format!("found {} rows, expected {}", rows, height),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn record(map_data: Vec<i16>, width: i32, height: i32) -> AreaRecord {
        AreaRecord {
            crop: Rect::new(0, 0, width, height),
            map_data,
            built: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_map_data_documented_example() {
        let rows = ["X.....X", "XX...XX", "X.....X"];
        let walkable: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|c| c == '.')).collect();
        assert_eq!(
            encode_map_data(&walkable, 7, 3),
            vec![1, 5, 1, -1, 2, 3, 2, -1, 1, 5, 1, -1]
        );
    }

    #[test]
    fn test_encode_row_starting_walkable_begins_with_zero() {
        assert_eq!(
            encode_map_data(&[true, true, false], 3, 1),
            vec![0, 2, 1, -1]
        );
    }

    #[test]
    fn test_extract_cell_data_expands_runs() {
        let rec = record(vec![1, 5, 1, -1, 2, 3, 2, -1], 7, 2);
        let cells = rec.extract_cell_data(0u8, 1u8);
        assert_eq!(
            cells,
            vec![0, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0]
        );
    }

    #[test]
    fn test_extract_cell_data_stops_on_short_data() {
        // crop claims 3 rows, only one is present
        let rec = record(vec![0, 2, -1], 2, 3);
        let cells = rec.extract_cell_data('#', '.');
        assert_eq!(cells, vec!['.', '.', '#', '#', '#', '#']);
    }

    #[test]
    fn test_extract_cell_data_clips_overlong_runs() {
        let rec = record(vec![0, 9, -1], 3, 1);
        assert_eq!(rec.extract_cell_data(false, true), vec![true, true, true]);
    }

    #[test]
    fn test_extract_then_encode_is_identical() {
        let rows = ["#..#....", "........", "########", "#......#"];
        let walkable: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|c| c == '.')).collect();
        let rec = record(encode_map_data(&walkable, 8, 4), 8, 4);

        let expanded = rec.extract_cell_data(false, true);
        assert_eq!(encode_map_data(&expanded, 8, 4), rec.map_data);
    }

    #[test]
    fn test_extract_cell_data_at_marks_edges() {
        // .#  -> walkable, edge
        // ##  -> edge, nonwalkable
        let rec = record(vec![0, 1, 1, -1, 2, -1], 2, 2);
        let mut canvas = vec![9u8; 16];
        rec.extract_cell_data_at(&mut canvas, 4, 4, 1, 2, 0, 1, 2);
        assert_eq!(
            canvas,
            vec![
                9, 9, 9, 9, //
                9, 9, 9, 9, //
                9, 1, 2, 9, //
                9, 2, 0, 9,
            ]
        );
    }

    #[test]
    fn test_extract_cell_data_at_clips_to_canvas() {
        let rec = record(vec![0, 2, -1, 0, 2, -1], 2, 2);
        let mut canvas = vec![0u8; 4];
        rec.extract_cell_data_at(&mut canvas, 2, 2, -1, 1, 0, 1, 2);
        assert_eq!(canvas, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_check_map_data() {
        assert!(record(vec![1, 5, 1, -1, 7, -1], 7, 2).check_map_data().is_ok());
        assert!(record(vec![1, 5, -1, 7, -1], 7, 2).check_map_data().is_err());
        assert!(record(vec![7, -1], 7, 2).check_map_data().is_err());
        assert!(record(vec![7, -1, 7], 7, 2).check_map_data().is_err());
        assert!(record(vec![7, -2, -1], 7, 1).check_map_data().is_err());
    }

    #[test]
    fn test_encode_splits_runs_wider_than_i16() {
        let width = i16::MAX as usize + 3;
        let encoded = encode_map_data(&vec![false; width], width, 1);
        assert_eq!(encoded, vec![i16::MAX, 0, 3, -1]);

        let rec = record(encoded, width as i32, 1);
        assert!(rec.check_map_data().is_ok());
        assert!(rec.extract_cell_data(false, true).iter().all(|c| !c));
    }
}
