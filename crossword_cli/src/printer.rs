//! ASCII grid pretty-printer (supplemented from `rectangular_grid_printer.*`
//! / `hexagonal_grid_printer.*` — within the "IO/CLI/printer" share, just
//! never spelled out as a section of its own). Renders a solved or
//! partially-solved grid; undetermined cells show their remaining
//! candidates, or `.` once there are too many to usefully print.

use crossword::{Geometry, Grid};

const MAX_CANDIDATES_TO_SHOW: usize = 4;

fn cell_text(grid: &Grid, cell_index: usize) -> String {
    if let Some(c) = grid.solved_char(cell_index) {
        return c.to_string();
    }
    let candidates = grid.possible_chars_string(cell_index);
    if candidates.chars().count() <= MAX_CANDIDATES_TO_SHOW {
        format!("[{}]", candidates)
    } else {
        ".".to_string()
    }
}

pub fn render(grid: &Grid) -> String {
    match grid.geometry() {
        Geometry::Rectangular { num_rows, num_cols } => render_rectangular(grid, num_rows, num_cols),
        Geometry::Hexagonal { side_length } => render_hexagonal(grid, side_length),
    }
}

fn render_rectangular(grid: &Grid, num_rows: usize, num_cols: usize) -> String {
    let mut out = String::new();
    let mut cell_index = 0;
    for _ in 0..num_rows {
        let mut row = Vec::with_capacity(num_cols);
        for _ in 0..num_cols {
            row.push(cell_text(grid, cell_index));
            cell_index += 1;
        }
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn render_hexagonal(grid: &Grid, side_length: usize) -> String {
    let num_lines = 2 * side_length - 1;
    let mut out = String::new();

    let row_lines: Vec<&crossword::GridLine> = grid
        .lines()
        .iter()
        .filter(|line| line.direction == 0)
        .collect();

    for (row_index, line) in row_lines.iter().enumerate() {
        let indent = (num_lines - line.len()).min(num_lines);
        out.push_str(&" ".repeat(indent));
        let cells: Vec<String> = line
            .cell_indices
            .iter()
            .map(|&i| cell_text(grid, i))
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
        let _ = row_index;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn renders_solved_rectangular_grid() {
        let regexes: Vec<String> = vec![
            "[NOTAD]*".into(),
            "WEL|BAL|EAR".into(),
            "UB|IE|AW".into(),
            "[TUBE]*".into(),
            "[BORF].".into(),
        ];
        let grid = Grid::rectangular(&regexes, 2, 1, 3, 1).unwrap();
        let solved = grid.solve(1).into_iter().next().unwrap();
        let rendered = render(&solved);
        assert_eq!(rendered, "A T O\nW E L\n");
    }
}
