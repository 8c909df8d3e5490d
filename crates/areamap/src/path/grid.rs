use crate::error::{Error, Result};
use crate::geometry::CELLS_PER_UNIT;

pub const LEFT: u8 = 1;
pub const RIGHT: u8 = 2;
pub const UP: u8 = 4;
pub const DOWN: u8 = 8;

const BLOCK: usize = CELLS_PER_UNIT as usize;

/// Longest run a single (value, count) pair can carry
const MAX_RUN: usize = u8::MAX as usize;

/// Coarse grid dimensions for a fine grid of `width x height` cells.
///
/// Partial blocks on the right/bottom edge still get a coarse cell.
pub fn coarse_dimensions(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(BLOCK), height.div_ceil(BLOCK))
}

/// Directional-passability grid at 1/5 resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl PathGrid {
    /// Derive the coarse grid from a row-major fine walkability grid.
    ///
    /// Two horizontally adjacent blocks are connected when the 3 rows x 4
    /// columns window straddling their shared edge (rows 1..=3, columns
    /// 3..=6 from the left block's origin) is entirely walkable. Vertical
    /// neighbours use the transposed window. Samples outside the fine grid
    /// count as blocked.
    pub fn build(walkable: &[bool], width: usize, height: usize) -> Self {
        let (cw, ch) = coarse_dimensions(width, height);
        let mut cells = vec![0u8; cw * ch];

        let is_open = |x: usize, y: usize| {
            x < width && y < height && walkable.get(y * width + x).copied().unwrap_or(false)
        };
        let window_open = |x0: usize, y0: usize, w: usize, h: usize| {
            (y0..y0 + h).all(|y| (x0..x0 + w).all(|x| is_open(x, y)))
        };

        for by in 0..ch {
            for bx in 0..cw {
                let index = by * cw + bx;
                let (ox, oy) = (bx * BLOCK, by * BLOCK);

                if bx + 1 < cw && window_open(ox + 3, oy + 1, 4, 3) {
                    cells[index] |= RIGHT;
                    cells[index + 1] |= LEFT;
                }
                if by + 1 < ch && window_open(ox + 1, oy + 3, 3, 4) {
                    cells[index] |= DOWN;
                    cells[index + cw] |= UP;
                }
            }
        }

        Self {
            width: cw,
            height: ch,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<u8> {
        self.cells
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_path_data(&self.cells)
    }
}

/// Compress a coarse grid into (value, count) pairs.
///
/// Runs longer than 255 are split into (value, 255) pairs followed by the
/// remainder.
pub fn encode_path_data(cells: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut iter = cells.iter().copied();
    let Some(mut value) = iter.next() else {
        return out;
    };
    let mut count = 1usize;

    for cell in iter {
        if cell == value {
            count += 1;
            continue;
        }
        push_run(&mut out, value, count);
        value = cell;
        count = 1;
    }
    push_run(&mut out, value, count);
    out
}

fn push_run(out: &mut Vec<u8>, value: u8, mut count: usize) {
    while count > MAX_RUN {
        out.extend_from_slice(&[value, MAX_RUN as u8]);
        count -= MAX_RUN;
    }
    out.extend_from_slice(&[value, count as u8]);
}

/// Expand (value, count) pairs back into a coarse grid of `expected_len` cells
pub fn decode_path_data(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    if data.len() % 2 != 0 {
        return Err(Error::Decode(format!(
            "pathData has odd length {}",
            data.len()
        )));
    }

    let total: usize = data.chunks_exact(2).map(|pair| pair[1] as usize).sum();
    if total != expected_len {
        return Err(Error::Decode(format!(
            "pathData expands to {} cells, expected {}",
            total, expected_len
        )));
    }

    let mut cells = Vec::with_capacity(total);
    for pair in data.chunks_exact(2) {
        cells.extend(std::iter::repeat_n(pair[0], pair[1] as usize));
    }
    Ok(cells)
}
