//! Cell/line indexing for the two grid shapes (§4.7 "Geometry adapters" --
//! surface interface only; no regex or solving knowledge lives here).
//!
//! Both shapes reduce to the same shape-agnostic [`Layout`]: a flat list of
//! per-cell coordinate tuples (2 for rectangular, 3 for hexagonal) and, per
//! line direction, the ordered list of cell indices that line threads
//! through. [`crate::grid::Grid`] only ever looks at `Layout`; it has no
//! knowledge of rows/columns/hex sides of its own.

use crate::errors::{GridStructureError, Result};

pub struct Layout {
    /// `coordinates[cell_index]` is that cell's (x, y) or (x, y, z) tuple.
    pub coordinates: Vec<Vec<usize>>,
    /// `lines[direction][index_within_direction]` is the ordered list of
    /// cell indices that line passes through.
    pub lines: Vec<Vec<Vec<usize>>>,
}

/// A rectangular grid has two line directions: rows (direction 0) and
/// columns (direction 1). Cell (x, y) is row x, column y.
pub fn rectangular(num_rows: usize, num_cols: usize) -> Layout {
    let mut coordinates = Vec::with_capacity(num_rows * num_cols);
    let mut cell_index = vec![vec![0usize; num_cols]; num_rows];

    for x in 0..num_rows {
        for y in 0..num_cols {
            cell_index[x][y] = coordinates.len();
            coordinates.push(vec![x, y]);
        }
    }

    let mut rows = Vec::with_capacity(num_rows);
    for x in 0..num_rows {
        rows.push((0..num_cols).map(|y| cell_index[x][y]).collect());
    }

    let mut cols = Vec::with_capacity(num_cols);
    for y in 0..num_cols {
        cols.push((0..num_rows).map(|x| cell_index[x][y]).collect());
    }

    Layout {
        coordinates,
        lines: vec![rows, cols],
    }
}

/// A hexagonal grid has three line directions: west->east rows (direction
/// 0), south-east->north-west lines (direction 1) and north-east->south-west
/// lines (direction 2). Cell (x, y, z) lies on row x, SE-NW line y and
/// NE-SW line z; z is determined by x and y (`z = 3*side_length - x - y -
/// 3`), so only (x, y) needs to be chosen when walking cells.
pub fn hexagonal(side_length: usize) -> Layout {
    let num_lines = num_lines_per_direction(side_length);

    let mut coordinates = Vec::new();
    let mut dir0: Vec<Vec<usize>> = (0..num_lines)
        .map(|i| vec![0usize; num_cells_on_line(side_length, i)])
        .collect();
    let mut dir1: Vec<Vec<usize>> = (0..num_lines)
        .map(|i| vec![0usize; num_cells_on_line(side_length, i)])
        .collect();
    let mut dir2: Vec<Vec<usize>> = (0..num_lines)
        .map(|i| vec![0usize; num_cells_on_line(side_length, i)])
        .collect();

    for x in 0..num_lines {
        let (by, ey) = (begin(side_length, x), end(side_length, x));
        for y in by..ey {
            let z = z_coordinate(side_length, x, y);
            let cell_index = coordinates.len();
            coordinates.push(vec![x, y, z]);

            dir0[x][y - by] = cell_index;
            dir1[y][z - begin(side_length, y)] = cell_index;
            dir2[z][x - begin(side_length, z)] = cell_index;
        }
    }

    Layout {
        coordinates,
        lines: vec![dir0, dir1, dir2],
    }
}

/// The length of each side of the hexagon, given a total line count that
/// must equal `3 * (2s - 1)` for some `s >= 1` (§6).
pub fn side_length_from_total_lines(total_lines: usize) -> Result<usize> {
    if total_lines % 3 != 0 {
        return Err(GridStructureError::InvalidHexagonalLineCount { total_lines }.into());
    }
    let num_lines_per_direction = total_lines / 3;
    if num_lines_per_direction == 0 || num_lines_per_direction % 2 == 0 {
        return Err(GridStructureError::InvalidHexagonalLineCount { total_lines }.into());
    }
    Ok((num_lines_per_direction + 1) / 2)
}

pub fn num_lines_per_direction(side_length: usize) -> usize {
    2 * side_length - 1
}

/// The smallest possible "next" coordinate for a line whose own coordinate
/// is `coord`, in any of the three symmetric directions.
fn begin(side_length: usize, coord: usize) -> usize {
    if side_length >= coord + 1 {
        side_length - (coord + 1)
    } else {
        0
    }
}

/// One past the largest possible "next" coordinate for a line whose own
/// coordinate is `coord`.
fn end(side_length: usize, coord: usize) -> usize {
    let coord = coord as i64;
    let side_length = side_length as i64;
    let result = 2 * side_length - 1 - (coord - side_length + 1).max(0);
    result as usize
}

fn z_coordinate(side_length: usize, x: usize, y: usize) -> usize {
    (3 * side_length as i64 - x as i64 - y as i64 - 3) as usize
}

fn num_cells_on_line(side_length: usize, line_index: usize) -> usize {
    let num_lines = num_lines_per_direction(side_length) as i64;
    let line_index = line_index as i64;
    let side_length = side_length as i64;
    (num_lines - (line_index + 1 - side_length).abs()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_row_and_column_lengths() {
        let layout = rectangular(2, 3);
        assert_eq!(layout.lines[0].len(), 2);
        assert_eq!(layout.lines[1].len(), 3);
        assert_eq!(layout.lines[0][0].len(), 3);
        assert_eq!(layout.lines[1][0].len(), 2);
    }

    #[test]
    fn rectangular_cells_are_shared_between_row_and_column() {
        let layout = rectangular(2, 3);
        // cell (0, 1) should be both row 0's second cell and column 1's
        // first cell.
        assert_eq!(layout.lines[0][0][1], layout.lines[1][1][0]);
    }

    #[test]
    fn hexagonal_side_length_round_trips() {
        assert_eq!(side_length_from_total_lines(9).unwrap(), 2);
        assert_eq!(side_length_from_total_lines(3).unwrap(), 1);
        assert!(side_length_from_total_lines(10).is_err());
        assert!(side_length_from_total_lines(6).is_err());
    }

    #[test]
    fn hexagonal_row_lengths_match_side_2() {
        // side length 2 => rows of length 2, 3, 2 (spec.md S3).
        let layout = hexagonal(2);
        let lengths: Vec<usize> = layout.lines[0].iter().map(|l| l.len()).collect();
        assert_eq!(lengths, vec![2, 3, 2]);
    }

    #[test]
    fn hexagonal_total_cell_count() {
        let layout = hexagonal(3);
        // A side-3 hexagon has 3*3*3 - 3*3 + 1 = 19 cells.
        assert_eq!(layout.coordinates.len(), 19);
    }
}
