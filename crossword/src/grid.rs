//! [`Grid`]: the fixed-point constraint propagation loop plus branching
//! search (§4.7), built on top of a shape-agnostic [`geometry::Layout`].

use regexp::{Alphabet, CharSet, Constraint, Regex};

use crate::errors::{GridStructureError, Result};
use crate::geometry::{self, Layout};
use crate::line::GridLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rectangular { num_rows: usize, num_cols: usize },
    Hexagonal { side_length: usize },
}

#[derive(Clone)]
pub struct Grid {
    geometry: Geometry,
    coordinates: Vec<Vec<usize>>,
    cells: Vec<CharSet>,
    lines: Vec<GridLine>,
}

impl Grid {
    /// Builds a rectangular grid. `regexes` lists all row regex-groups
    /// top-to-bottom, then all column regex-groups left-to-right (§6).
    pub fn rectangular(
        regexes: &[String],
        num_rows: usize,
        num_regexes_per_row: usize,
        num_cols: usize,
        num_regexes_per_col: usize,
    ) -> Result<Grid> {
        let expected = num_rows * num_regexes_per_row + num_cols * num_regexes_per_col;
        if regexes.len() != expected {
            return Err(GridStructureError::WrongRegexCount {
                expected,
                found: regexes.len(),
                detail: format!(
                    "{} rows * {} regexes/row + {} cols * {} regexes/col",
                    num_rows, num_regexes_per_row, num_cols, num_regexes_per_col
                ),
            }
            .into());
        }

        let mut groups = Vec::with_capacity(num_rows + num_cols);
        let mut rest = regexes;
        for _ in 0..num_rows {
            let (group, remainder) = rest.split_at(num_regexes_per_row);
            groups.push(group.to_vec());
            rest = remainder;
        }
        for _ in 0..num_cols {
            let (group, remainder) = rest.split_at(num_regexes_per_col);
            groups.push(group.to_vec());
            rest = remainder;
        }

        let layout = geometry::rectangular(num_rows, num_cols);
        Self::build(
            Geometry::Rectangular { num_rows, num_cols },
            layout,
            groups,
        )
    }

    /// Builds a hexagonal grid. `regexes` lists w-e rows top-to-bottom, then
    /// SE->NW lines, then NE->SW lines, `num_regexes_per_line` per line
    /// (§6).
    pub fn hexagonal(regexes: &[String], num_regexes_per_line: usize) -> Result<Grid> {
        if regexes.len() % num_regexes_per_line != 0 {
            return Err(GridStructureError::NotDivisible {
                total_lines: regexes.len(),
                num_regexes_per_line,
            }
            .into());
        }
        let total_lines = regexes.len() / num_regexes_per_line;
        let side_length = geometry::side_length_from_total_lines(total_lines)?;

        let mut groups = Vec::with_capacity(total_lines);
        let mut rest = regexes;
        for _ in 0..total_lines {
            let (group, remainder) = rest.split_at(num_regexes_per_line);
            groups.push(group.to_vec());
            rest = remainder;
        }

        let layout = geometry::hexagonal(side_length);
        Self::build(Geometry::Hexagonal { side_length }, layout, groups)
    }

    fn build(geometry: Geometry, layout: Layout, regex_groups: Vec<Vec<String>>) -> Result<Grid> {
        let Layout { coordinates, lines } = layout;

        let mut grid_lines = Vec::new();
        let mut group_iter = regex_groups.into_iter();
        for (direction, lines_in_direction) in lines.iter().enumerate() {
            for (index_in_direction, cell_indices) in lines_in_direction.iter().enumerate() {
                let sources = group_iter.next().expect("regex group per line");
                let mut regexes = Vec::with_capacity(sources.len());
                for source in &sources {
                    regexes.push(Regex::new(source, cell_indices.len())?);
                }
                grid_lines.push(GridLine {
                    direction,
                    index_in_direction,
                    cell_indices: cell_indices.clone(),
                    constrainer: regexp::LineConstrainer::new(regexes),
                });
            }
        }

        let explicit_characters: String = grid_lines
            .iter()
            .map(|line| line.constrainer.explicit_characters())
            .collect();
        Alphabet::reset();
        Alphabet::set(&explicit_characters)?;

        let cells = vec![Alphabet::all(); coordinates.len()];

        Ok(Grid {
            geometry,
            coordinates,
            cells,
            lines: grid_lines,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn coordinates(&self) -> &[Vec<usize>] {
        &self.coordinates
    }

    pub fn cells(&self) -> &[CharSet] {
        &self.cells
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// `Some(c)` if the cell has narrowed to exactly one candidate
    /// character, `None` otherwise.
    pub fn solved_char(&self, cell_index: usize) -> Option<char> {
        let set = self.cells[cell_index];
        if set.len() == 1 {
            set.iter().next().map(Alphabet::character_at)
        } else {
            None
        }
    }

    pub fn possible_chars_string(&self, cell_index: usize) -> String {
        self.cells[cell_index]
            .iter()
            .map(Alphabet::character_at)
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        self.cells.iter().all(|c| c.len() == 1)
    }

    fn is_satisfiable(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Runs one fixed-point propagation pass over every line (§4.7). Returns
    /// `false` as soon as a line's constraint becomes impossible; `true`
    /// means the grid survived propagation (it may still have undetermined
    /// cells).
    pub fn constrain(&mut self) -> bool {
        let num_lines = self.lines.len();
        if num_lines == 0 {
            return true;
        }

        let mut consecutive_unchanged = 0usize;
        let mut index = 0usize;

        while consecutive_unchanged != num_lines {
            let cell_indices = self.lines[index].cell_indices.clone();
            let input =
                Constraint::from_sets(cell_indices.iter().map(|&i| self.cells[i]).collect());
            let output = self.lines[index].constrainer.constrain(&input);

            if !output.is_satisfiable() {
                tracing::debug!(line = index, "line constraint became impossible");
                return false;
            }

            let changed = output != input;
            for (pos, &cell_index) in cell_indices.iter().enumerate() {
                self.cells[cell_index] = output.at(pos);
            }

            if changed {
                tracing::trace!(line = index, "line tightened");
                consecutive_unchanged = 0;
            } else {
                consecutive_unchanged += 1;
            }

            index = (index + 1) % num_lines;
        }

        true
    }

    /// The undetermined cell with the fewest remaining candidates (§4.7
    /// branching heuristic). `None` if every cell is already solved.
    fn cell_to_search(&self) -> Option<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| set.len() > 1)
            .min_by_key(|(_, set)| set.len())
            .map(|(i, _)| i)
    }

    /// Finds at most `max_solutions` complete assignments satisfying every
    /// line regex (§4.7). Pass `usize::MAX` to find all solutions.
    pub fn solve(self, max_solutions: usize) -> Vec<Grid> {
        let mut solutions = Vec::new();
        let mut remaining = max_solutions;
        Self::solve_into(self, &mut remaining, &mut solutions);
        solutions
    }

    fn solve_into(mut grid: Grid, remaining: &mut usize, solutions: &mut Vec<Grid>) {
        if *remaining == 0 {
            return;
        }
        if !grid.constrain() {
            return;
        }
        if !grid.is_satisfiable() {
            return;
        }

        match grid.cell_to_search() {
            None => {
                tracing::debug!("found a solution");
                solutions.push(grid);
                *remaining -= 1;
            }
            Some(cell_index) => {
                let candidates: Vec<usize> = grid.cells[cell_index].iter().collect();
                for candidate in candidates {
                    if *remaining == 0 {
                        break;
                    }
                    let mut branch = grid.clone();
                    branch.cells[cell_index] = CharSet::singleton(candidate);
                    Self::solve_into(branch, remaining, solutions);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    #[serial]
    fn s1_rectangular_two_by_three_unique_solution() {
        let regexes = strings(&[
            "[NOTAD]*",
            "WEL|BAL|EAR",
            "UB|IE|AW",
            "[TUBE]*",
            "[BORF].",
        ]);
        let grid = Grid::rectangular(&regexes, 2, 1, 3, 1).unwrap();
        let solutions = grid.solve(usize::MAX);
        assert_eq!(solutions.len(), 1);
        let solution = &solutions[0];
        let row0: String = (0..3)
            .map(|y| solution.solved_char(y).unwrap())
            .collect();
        let row1: String = (0..3)
            .map(|y| solution.solved_char(3 + y).unwrap())
            .collect();
        assert_eq!(row0, "ATO");
        assert_eq!(row1, "WEL");
    }

    #[test]
    #[serial]
    fn s2_no_solutions() {
        let regexes = strings(&[
            "[NOTD]*",
            "WEL|BAL|EAR",
            "UB|IE|AW",
            "[TUBE]*",
            "[BORF].",
        ]);
        let grid = Grid::rectangular(&regexes, 2, 1, 3, 1).unwrap();
        let solutions = grid.solve(usize::MAX);
        assert!(solutions.is_empty());
    }

    #[test]
    #[serial]
    fn s3_hexagonal_side_two_unique_solution() {
        let regexes = strings(&[
            ".*H.*",
            "(DI|O)*",
            "([AO])\\1",
            "..",
            ".*(IN|SE|HI)",
            "[^C]*",
            "..",
            "[CHMNOR]*I[CHMNOR]*",
            "ND|ET|IN",
        ]);
        let grid = Grid::hexagonal(&regexes, 1).unwrap();
        let solutions = grid.solve(usize::MAX);
        assert_eq!(solutions.len(), 1);
        let solution = &solutions[0];
        let rows: Vec<String> = solution
            .lines()
            .iter()
            .filter(|l| l.direction == 0)
            .map(|l| {
                l.cell_indices
                    .iter()
                    .map(|&i| solution.solved_char(i).unwrap())
                    .collect()
            })
            .collect();
        assert_eq!(rows, vec!["NH".to_string(), "DIO".to_string(), "OO".to_string()]);
    }

    #[test]
    #[serial]
    fn wrong_regex_count_is_a_structure_error() {
        let regexes = strings(&["A", "B"]);
        let result = Grid::rectangular(&regexes, 1, 1, 1, 1);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn hexagonal_line_count_must_be_valid() {
        let regexes = strings(&["A", "B", "C", "D"]);
        let result = Grid::hexagonal(&regexes, 1);
        assert!(result.is_err());
    }
}
