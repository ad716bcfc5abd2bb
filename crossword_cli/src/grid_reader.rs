//! Grid file parsing (§6 "Grid file format"): a line-oriented, UTF-8 format
//! tolerant of `\r\n`, blank lines and `#`-comments, built on top of
//! [`crossword::Grid`]'s two shape constructors.

use std::fs;
use std::path::Path;

use crossword::Grid;

use crate::errors::{InputFileError, Result};

struct Lines {
    entries: Vec<(usize, String)>,
    position: usize,
}

impl Lines {
    fn new(text: &str) -> Self {
        let entries = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r').to_string()))
            .filter(|(_, line)| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .collect();
        Lines {
            entries,
            position: 0,
        }
    }

    fn next(&mut self) -> Option<(usize, &str)> {
        let entry = self.entries.get(self.position)?;
        self.position += 1;
        Some((entry.0, entry.1.trim()))
    }
}

fn split_key_value(line_number: usize, line: &str) -> Result<(String, String)> {
    let mut parts = line.splitn(2, '=');
    let key = parts
        .next()
        .ok_or_else(|| InputFileError::MissingKey {
            key: "<none>".to_string(),
            line: line_number,
        })?
        .trim()
        .to_string();
    let value = parts
        .next()
        .ok_or_else(|| InputFileError::MissingKey {
            key: key.clone(),
            line: line_number,
        })?
        .trim()
        .to_string();
    Ok((key, value))
}

fn expect_key(lines: &mut Lines, expected_key: &str) -> Result<usize> {
    let (line_number, line) = lines.entries.get(lines.position).map(|e| (e.0, e.1.trim())).ok_or_else(|| {
        InputFileError::MissingKey {
            key: expected_key.to_string(),
            line: 0,
        }
    })?;
    let (key, value) = split_key_value(line_number, line)?;
    if key != expected_key {
        return Err(InputFileError::MissingKey {
            key: expected_key.to_string(),
            line: line_number,
        }
        .into());
    }
    lines.position += 1;
    parse_positive_int(&key, &value, line_number)
}

fn parse_positive_int(key: &str, value: &str, line_number: usize) -> Result<usize> {
    let n: usize = value.parse().map_err(|_| InputFileError::UnparseableInteger {
        key: key.to_string(),
        value: value.to_string(),
        line: line_number,
    })?;
    if n == 0 {
        return Err(InputFileError::UnparseableInteger {
            key: key.to_string(),
            value: value.to_string(),
            line: line_number,
        }
        .into());
    }
    Ok(n)
}

fn parse_quoted_regex(line_number: usize, line: &str) -> Result<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < 2 || chars[0] != '\'' || chars[chars.len() - 1] != '\'' {
        return Err(InputFileError::MissingQuotes {
            line: line_number,
            text: line.to_string(),
        }
        .into());
    }
    Ok(chars[1..chars.len() - 1].iter().collect())
}

fn read_regexes(lines: &mut Lines, count: usize) -> Result<Vec<String>> {
    let mut regexes = Vec::with_capacity(count);
    for _ in 0..count {
        let (line_number, line) = lines.next().ok_or_else(|| InputFileError::MissingKey {
            key: "regex".to_string(),
            line: 0,
        })?;
        regexes.push(parse_quoted_regex(line_number, line)?);
    }
    Ok(regexes)
}

/// Reads and parses a grid file, building the [`Grid`] it describes.
pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| InputFileError::Io {
        detail: e.to_string(),
    })?;
    parse_grid(&text)
}

fn parse_grid(text: &str) -> Result<Grid> {
    let mut lines = Lines::new(text);

    let (shape_line_number, shape_line) = lines.next().ok_or_else(|| InputFileError::MissingKey {
        key: "shape".to_string(),
        line: 0,
    })?;
    let (key, shape) = split_key_value(shape_line_number, shape_line)?;
    if key != "shape" {
        return Err(InputFileError::MissingKey {
            key: "shape".to_string(),
            line: shape_line_number,
        }
        .into());
    }

    match shape.as_str() {
        "rectangular" => {
            let num_rows = expect_key(&mut lines, "num_rows")?;
            let num_cols = expect_key(&mut lines, "num_cols")?;
            let num_regexes_per_row = expect_key(&mut lines, "num_regexes_per_row")?;
            let num_regexes_per_col = expect_key(&mut lines, "num_regexes_per_col")?;
            let total = num_rows * num_regexes_per_row + num_cols * num_regexes_per_col;
            let regexes = read_regexes(&mut lines, total)?;
            Ok(Grid::rectangular(
                &regexes,
                num_rows,
                num_regexes_per_row,
                num_cols,
                num_regexes_per_col,
            )?)
        }
        "hexagonal" => {
            let num_regexes_per_line = expect_key(&mut lines, "num_regexes_per_line")?;
            let remaining = lines.entries.len() - lines.position;
            let regexes = read_regexes(&mut lines, remaining)?;
            Ok(Grid::hexagonal(&regexes, num_regexes_per_line)?)
        }
        other => Err(InputFileError::UnknownShape {
            shape: other.to_string(),
            line: shape_line_number,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const S1: &str = "
        shape = rectangular
        num_rows = 2
        num_cols = 3
        num_regexes_per_row = 1
        num_regexes_per_col = 1
        '[NOTAD]*'
        'WEL|BAL|EAR'
        'UB|IE|AW'
        '[TUBE]*'
        '[BORF].'
    ";

    #[test]
    #[serial]
    fn parses_rectangular_grid() {
        let grid = parse_grid(S1).unwrap();
        assert_eq!(grid.num_cells(), 6);
    }

    #[test]
    #[serial]
    fn rejects_missing_quotes() {
        let text = S1.replace("'[NOTAD]*'", "[NOTAD]*");
        assert!(parse_grid(&text).is_err());
    }

    #[test]
    #[serial]
    fn rejects_zero_dimension() {
        let text = S1.replace("num_rows = 2", "num_rows = 0");
        assert!(parse_grid(&text).is_err());
    }

    #[test]
    #[serial]
    fn comments_and_blank_lines_are_ignored() {
        let text = format!("# a comment\n\n{}\n# trailing\n", S1);
        let grid = parse_grid(&text).unwrap();
        assert_eq!(grid.num_cells(), 6);
    }
}
