//! Per-line caching wrapper around one or more [`Regex`] values (§4.6). A
//! crossword line carries every regex assigned to it and must satisfy all of
//! them simultaneously; `LineConstrainer` applies them in order, narrowing a
//! little more with each one, and remembers the last input it saw so that a
//! grid solver re-polling an unchanged line gets its answer without
//! re-walking any tree.

use crate::constraint::Constraint;
use crate::regex::Regex;

#[derive(Clone)]
pub struct LineConstrainer {
    regexes: Vec<Regex>,
    last_input: Option<Constraint>,
    last_output: Option<Constraint>,
}

impl LineConstrainer {
    pub fn new(regexes: Vec<Regex>) -> Self {
        Self {
            regexes,
            last_input: None,
            last_output: None,
        }
    }

    pub fn regexes(&self) -> &[Regex] {
        &self.regexes
    }

    /// Tightens `input` against every regex on this line in turn, short
    /// circuiting as soon as an intermediate result is impossible, and
    /// short-circuiting the whole call when `input` is unchanged from the
    /// previous call (§4.6 cache).
    pub fn constrain(&mut self, input: &Constraint) -> Constraint {
        if let (Some(last_in), Some(last_out)) = (&self.last_input, &self.last_output) {
            if last_in == input {
                return last_out.clone();
            }
        }

        let mut current = input.clone();
        for regex in &self.regexes {
            if regex.is_dot_star() {
                continue;
            }
            current = regex.constrain(&current);
            if !current.is_satisfiable() {
                break;
            }
        }

        self.last_input = Some(input.clone());
        self.last_output = Some(current.clone());
        current
    }

    /// The characters literally present across every regex on this line,
    /// used to seed the alphabet before the alphabet exists.
    pub fn explicit_characters(&self) -> String {
        self.regexes.iter().map(|r| r.explicit_characters()).collect()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.regexes.iter().map(|r| r.source()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use serial_test::serial;

    #[test]
    #[serial]
    fn caches_identical_input() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let regex = Regex::new("A.C", 3).unwrap();
        let mut lc = LineConstrainer::new(vec![regex]);
        let input = Constraint::all(3, Alphabet::all());
        let first = lc.constrain(&input);
        let second = lc.constrain(&input);
        assert_eq!(first, second);
    }

    #[test]
    #[serial]
    fn applies_every_regex_on_the_line() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        // Line must match both "A.C" and "[AB].[BC]", which together pin
        // every position to a single character.
        let first = Regex::new("A.C", 3).unwrap();
        let second = Regex::new("[AB].[BC]", 3).unwrap();
        let mut lc = LineConstrainer::new(vec![first, second]);
        let input = Constraint::all(3, Alphabet::all());
        let out = lc.constrain(&input);
        assert_eq!(out.at(0), crate::char_set::CharSet::singleton(Alphabet::index_of('A').unwrap()));
        assert_eq!(out.at(2), crate::char_set::CharSet::singleton(Alphabet::index_of('C').unwrap()));
    }

    #[test]
    #[serial]
    fn short_circuits_on_impossible_intermediate() {
        Alphabet::reset();
        Alphabet::set("AB").unwrap();
        let first = Regex::new("AA", 2).unwrap();
        let second = Regex::new("BB", 2).unwrap();
        let mut lc = LineConstrainer::new(vec![first, second]);
        let input = Constraint::all(2, Alphabet::all());
        let out = lc.constrain(&input);
        assert!(!out.is_satisfiable());
    }
}
