use std::collections::VecDeque;

use super::grid::{DOWN, LEFT, RIGHT, UP};

/// Breadth-first search over a coarse direction grid.
///
/// Returns the cells from `start` to `target`, both included. A move is only
/// taken when the current cell carries the bit for that direction, and a cell
/// with no bits at all is never entered. Neighbours are tried in bit order
/// (left, right, up, down), so among equally short paths the first one
/// discovered wins.
///
/// With `merge` set, the hop-by-hop path is reduced to the waypoints needed
/// to keep every straight segment passable.
///
/// Out-of-range coordinates, a grid shorter than `width * height` and an
/// unreachable target all yield an empty path. `start == target` yields the
/// single cell.
pub fn find_path(
    start: (usize, usize),
    target: (usize, usize),
    grid: &[u8],
    width: usize,
    height: usize,
    merge: bool,
) -> Vec<(usize, usize)> {
    let n = width * height;
    if start.0 >= width
        || start.1 >= height
        || target.0 >= width
        || target.1 >= height
        || grid.len() < n
    {
        return Vec::new();
    }

    let start_pos = start.1 * width + start.0;
    let target_pos = target.1 * width + target.0;
    if start_pos == target_pos {
        return vec![start];
    }

    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    visited[start_pos] = true;

    let mut queue = VecDeque::from([start_pos]);
    'search: while let Some(u) = queue.pop_front() {
        for dir in [LEFT, RIGHT, UP, DOWN] {
            if grid[u] & dir == 0 {
                continue;
            }
            let Some(v) = step(u, dir, width, n) else {
                continue;
            };
            if visited[v] || grid[v] == 0 {
                continue;
            }
            visited[v] = true;
            parent[v] = Some(u);
            if v == target_pos {
                break 'search;
            }
            queue.push_back(v);
        }
    }

    if !visited[target_pos] {
        return Vec::new();
    }

    // target first, start last
    let mut chain = vec![target_pos];
    let mut curr = target_pos;
    while let Some(p) = parent[curr] {
        chain.push(p);
        curr = p;
    }

    let mut cells = if merge {
        simplify(&chain, grid, width)
    } else {
        chain
    };
    cells.reverse();
    cells
        .into_iter()
        .map(|index| (index % width, index / width))
        .collect()
}

fn step(u: usize, dir: u8, width: usize, n: usize) -> Option<usize> {
    match dir {
        LEFT if u % width != 0 => Some(u - 1),
        RIGHT if (u + 1) % width != 0 => Some(u + 1),
        UP => u.checked_sub(width),
        DOWN if u + width < n => Some(u + width),
        _ => None,
    }
}

/// Walk the parent chain from the target end, keeping the furthest cell still
/// visible from the current anchor. A blocked line promotes the last visible
/// cell to a waypoint and scanning resumes from it.
fn simplify(chain: &[usize], grid: &[u8], width: usize) -> Vec<usize> {
    let mut kept = vec![chain[0]];
    let mut anchor = 0;
    let mut last = 0;
    let mut i = 1;

    while i < chain.len() {
        // the immediate successor is always accepted so the scan makes progress
        if last != anchor && !line_clear(grid, width, chain[anchor], chain[i]) {
            kept.push(chain[last]);
            anchor = last;
            continue;
        }
        last = i;
        i += 1;
    }

    kept.push(chain[last]);
    kept
}

fn line_clear(grid: &[u8], width: usize, from: usize, to: usize) -> bool {
    let w = width as isize;
    let (fx, fy) = ((from % width) as isize, (from / width) as isize);
    let (tx, ty) = ((to % width) as isize, (to / width) as isize);

    let has = |index: isize, bit: u8| {
        usize::try_from(index)
            .ok()
            .and_then(|i| grid.get(i))
            .is_some_and(|cell| cell & bit != 0)
    };

    if fx == tx {
        let delta = if fy < ty { 1 } else { -1 };
        let bit = if delta == 1 { DOWN } else { UP };
        let mut index = fy * w + fx;
        let mut y = fy;
        while y != ty {
            if !has(index, bit) {
                return false;
            }
            y += delta;
            index += delta * w;
        }
        return true;
    }

    if fy == ty {
        let delta = if fx < tx { 1 } else { -1 };
        let bit = if delta == 1 { RIGHT } else { LEFT };
        let mut index = fy * w + fx;
        let mut x = fx;
        while x != tx {
            if !has(index, bit) {
                return false;
            }
            x += delta;
            index += delta;
        }
        return true;
    }

    let dx = (tx - fx).abs();
    let dy = (ty - fy).abs();

    if dx < dy {
        // y-major: step vertically, slip sideways when the error term overflows
        let delta = if fy < ty { 1 } else { -1 };
        let index_delta = delta * w;
        let delta2 = if fx < tx { 1 } else { -1 };
        let bit = if delta == 1 { DOWN } else { UP };
        let bit2 = if delta2 == 1 { RIGHT } else { LEFT };

        let mut index = fy * w + fx;
        let mut total = dy / 2;
        let mut y = fy;
        while y != ty {
            total += dx;
            if total >= dy {
                total -= dy;
                let clear = if dx - total >= total {
                    has(index, bit) && has(index + index_delta, bit2)
                } else {
                    has(index, bit2) && has(index + delta2, bit)
                };
                if !clear {
                    return false;
                }
                index += delta2;
            } else if !has(index, bit) {
                return false;
            }
            y += delta;
            index += index_delta;
        }
    } else {
        // x-major (also exact diagonals)
        let delta = if fx < tx { 1 } else { -1 };
        let delta2 = if fy < ty { 1 } else { -1 };
        let index_delta2 = delta2 * w;
        let bit = if delta == 1 { RIGHT } else { LEFT };
        let bit2 = if delta2 == 1 { DOWN } else { UP };

        let mut index = fy * w + fx;
        let mut total = dx / 2;
        let mut x = fx;
        while x != tx {
            total += dy;
            if total >= dx {
                total -= dx;
                let clear = if dy - total >= total {
                    has(index, bit) && has(index + delta, bit2)
                } else {
                    has(index, bit2) && has(index + index_delta2, bit)
                };
                if !clear {
                    return false;
                }
                index += index_delta2;
            } else if !has(index, bit) {
                return false;
            }
            x += delta;
            index += delta;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fully connected open grid
    fn open(width: usize, height: usize) -> Vec<u8> {
        let mut grid = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                let cell = &mut grid[y * width + x];
                if x > 0 {
                    *cell |= LEFT;
                }
                if x + 1 < width {
                    *cell |= RIGHT;
                }
                if y > 0 {
                    *cell |= UP;
                }
                if y + 1 < height {
                    *cell |= DOWN;
                }
            }
        }
        grid
    }

    #[test]
    fn test_two_cell_corridor_is_ordered_start_to_target() {
        let grid = [RIGHT, LEFT];
        assert_eq!(
            find_path((0, 0), (1, 0), &grid, 2, 1, false),
            vec![(0, 0), (1, 0)]
        );
        assert_eq!(
            find_path((1, 0), (0, 0), &grid, 2, 1, false),
            vec![(1, 0), (0, 0)]
        );
        assert_eq!(
            find_path((0, 0), (1, 0), &grid, 2, 1, true),
            vec![(0, 0), (1, 0)]
        );
    }

    #[test]
    fn test_straight_corridor_merges_to_endpoints() {
        let grid = open(5, 1);
        let raw = find_path((0, 0), (4, 0), &grid, 5, 1, false);
        assert_eq!(raw.len(), 5);
        assert_eq!(raw.first(), Some(&(0, 0)));
        assert_eq!(raw.last(), Some(&(4, 0)));

        let merged = find_path((0, 0), (4, 0), &grid, 5, 1, true);
        assert_eq!(merged, vec![(0, 0), (4, 0)]);
    }

    #[test]
    fn test_unique_shortest_path_has_hop_count_plus_one_points() {
        // (0,0) -> (1,0) -> (2,0) -> (2,1), everything else is walled off
        let grid = [RIGHT, LEFT | RIGHT, LEFT | DOWN, 0, 0, UP];
        let path = find_path((0, 0), (2, 1), &grid, 3, 2, false);
        assert_eq!(path, vec![(0, 0), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_merge_keeps_corner_waypoint() {
        let grid = [RIGHT, LEFT | RIGHT, LEFT | DOWN, 0, 0, UP];
        let path = find_path((0, 0), (2, 1), &grid, 3, 2, true);
        assert_eq!(path, vec![(0, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_merge_open_room_diagonal_collapses() {
        let grid = open(4, 4);
        let path = find_path((0, 0), (3, 3), &grid, 4, 4, true);
        assert_eq!(path, vec![(0, 0), (3, 3)]);
    }

    #[test]
    fn test_out_of_range_yields_empty() {
        let grid = open(3, 3);
        assert!(find_path((3, 0), (0, 0), &grid, 3, 3, false).is_empty());
        assert!(find_path((0, 0), (0, 3), &grid, 3, 3, true).is_empty());
        assert!(find_path((0, 0), (1, 1), &grid[..4], 3, 3, false).is_empty());
    }

    #[test]
    fn test_unreachable_target_yields_empty() {
        // two open cells separated by a cell with no passable directions
        let grid = [RIGHT, 0, LEFT];
        assert!(find_path((0, 0), (2, 0), &grid, 3, 1, false).is_empty());
        assert!(find_path((0, 0), (2, 0), &grid, 3, 1, true).is_empty());
    }

    #[test]
    fn test_horizontal_move_never_wraps_rows() {
        // (1,0) claims it can move right, which would wrap onto (0,1)
        let grid = [RIGHT, LEFT | RIGHT, LEFT, 0];
        assert!(find_path((0, 0), (0, 1), &grid, 2, 2, false).is_empty());
    }

    #[test]
    fn test_start_equals_target() {
        let grid = open(2, 2);
        assert_eq!(find_path((1, 1), (1, 1), &grid, 2, 2, false), vec![(1, 1)]);
        assert_eq!(find_path((1, 1), (1, 1), &grid, 2, 2, true), vec![(1, 1)]);
    }

    #[test]
    fn test_one_way_moves_are_respected() {
        // right-only corridor: reachable forwards, not backwards
        let grid = [RIGHT, RIGHT, LEFT];
        assert_eq!(find_path((0, 0), (2, 0), &grid, 3, 1, false).len(), 3);
        assert!(find_path((2, 0), (0, 0), &grid, 3, 1, false).is_empty());
    }
}
