//! [`GridLine`]: a line direction/index pair, the cell indices it threads
//! through, and the [`LineConstrainer`] that enforces its regexes (§3
//! "GridLine").

use regexp::LineConstrainer;

#[derive(Clone)]
pub struct GridLine {
    pub direction: usize,
    pub index_in_direction: usize,
    pub cell_indices: Vec<usize>,
    pub constrainer: LineConstrainer,
}

impl GridLine {
    pub fn len(&self) -> usize {
        self.cell_indices.len()
    }

    pub fn regex_sources(&self) -> Vec<&str> {
        self.constrainer.sources()
    }
}
