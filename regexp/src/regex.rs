//! [`Regex`]: the crate's single external collaborator-facing type, wiring
//! together the tokenizer, parser, optimizer and AST-iteration contract.

use crate::ast::{self, Ast, Groups};
use crate::constraint::Constraint;
use crate::errors::{Result, RegexStructureError};
use crate::optimizer::{self, OptimizerFlags};
use crate::parser;

#[derive(Clone)]
pub struct Regex {
    source: String,
    ast: Ast,
    cell_count: usize,
}

impl Regex {
    /// Parses and optimizes `source` for a line of exactly `cell_count`
    /// cells. Optimization always runs with every pass enabled; use
    /// [`Regex::with_flags`] to control which passes run (`crossword_fuzz`
    /// needs this to compare optimized vs. unoptimized constraining).
    pub fn new(source: &str, cell_count: usize) -> Result<Self> {
        Self::with_flags(source, cell_count, OptimizerFlags::ALL)
    }

    pub fn with_flags(source: &str, cell_count: usize, flags: OptimizerFlags) -> Result<Self> {
        let outcome = parser::parse(source)?;
        if outcome.group_count > 9 {
            return Err(RegexStructureError::new(format!(
                "regex has {} capturing groups, at most 9 are addressable by a backreference",
                outcome.group_count
            ))
            .into());
        }
        let ast = optimizer::optimize(outcome.ast, flags);
        Ok(Regex {
            source: source.to_string(),
            ast,
            cell_count,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// The characters literally present in the regex's source, used to seed
    /// the alphabet before the alphabet exists.
    pub fn explicit_characters(&self) -> String {
        self.ast.explicit_characters()
    }

    /// `true` for regexes that can never rule out any character at any
    /// position -- `.*` and nothing else (§4.6).
    pub fn is_dot_star(&self) -> bool {
        matches!(
            &self.ast,
            Ast::Repeat {
                child,
                min: 0,
                max: None,
            } if matches!(child.as_ref(), Ast::CharBlock(crate::character_block::CharacterBlock::Dot))
        )
    }

    /// Tightens `input` (one [`CharSet`](crate::char_set::CharSet) per cell)
    /// against every way this regex can exactly fill the line (§4.4,
    /// §4.4.1, §8 Property 1). Always returns a constraint at least as
    /// tight as `input`.
    ///
    /// Each value is narrowed and boundary-checked entirely on its own
    /// (character leaves via [`Self::apply_leaves`], then anchors via
    /// [`ast::apply_word_boundaries`]) before it is OR-ed into the
    /// accumulator. A value whose `\b`/`\B` can never hold is dropped, not
    /// merged: applying boundaries to the union of every retained value's
    /// constraints would let one alternative's impossible anchor narrow
    /// cells that another, boundary-free alternative leaves open.
    pub fn constrain(&self, input: &Constraint) -> Constraint {
        let n = input.len();
        let groups = Groups::new();
        let alternatives = self.ast.enumerate_values(0, n, &groups);

        let mut accumulator = Constraint::none(n);

        for (value, _) in &alternatives {
            if value.end_pos != n {
                continue;
            }
            let mut local = match Self::apply_leaves(input, &value.leaves) {
                Some(local) => local,
                None => continue,
            };
            if !ast::apply_word_boundaries(&value.boundaries, &mut local) {
                continue;
            }
            accumulator.or_into(&local);
        }

        accumulator
    }

    /// Narrows a clone of `input` against one value's leaves, returning
    /// `None` the moment any position empties out.
    ///
    /// Leaves with no link id narrow their own position independently.
    /// Leaves sharing a link id -- a capturing group and every
    /// backreference to it -- are narrowed together: all of them are forced
    /// to the *same* surviving candidate set, the intersection of the
    /// block's own characters with every linked position's current input
    /// (§4.4.2 "Backreference overlay"). Because link ids are assigned
    /// transitively at capture time, one pass over the grouped leaves is
    /// enough; there is no separate cross-value fixed-point loop to run.
    fn apply_leaves(input: &Constraint, leaves: &[ast::Leaf]) -> Option<Constraint> {
        let mut local = input.clone();

        for (pos, set, link) in leaves {
            if link.is_none() {
                let narrowed = local.at(*pos).intersect(set);
                if narrowed.is_empty() {
                    return None;
                }
                local.set(*pos, narrowed);
            }
        }

        let mut by_link: std::collections::HashMap<
            ast::LinkId,
            (crate::char_set::CharSet, Vec<usize>),
        > = std::collections::HashMap::new();
        for (pos, set, link) in leaves {
            if let Some(id) = link {
                let entry = by_link
                    .entry(*id)
                    .or_insert((*set, Vec::new()));
                entry.0 = entry.0.intersect(set);
                entry.1.push(*pos);
            }
        }

        for (block_chars, positions) in by_link.values() {
            let mut shared = *block_chars;
            for &pos in positions {
                shared = shared.intersect(&local.at(pos));
            }
            if shared.is_empty() {
                return None;
            }
            for &pos in positions {
                local.set(pos, shared);
            }
        }

        Some(local)
    }
}

impl std::fmt::Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use serial_test::serial;

    #[test]
    #[serial]
    fn literal_narrows_to_exact_value() {
        Alphabet::reset();
        Alphabet::set("ABCcat").unwrap();
        let regex = Regex::new("cat", 3).unwrap();
        let input = Constraint::all(3, Alphabet::all());
        let out = regex.constrain(&input);
        assert_eq!(out.at(0), crate::char_set::CharSet::singleton(Alphabet::index_of('c').unwrap()));
        assert_eq!(out.at(1), crate::char_set::CharSet::singleton(Alphabet::index_of('a').unwrap()));
        assert_eq!(out.at(2), crate::char_set::CharSet::singleton(Alphabet::index_of('t').unwrap()));
    }

    #[test]
    #[serial]
    fn union_keeps_both_options_open() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let regex = Regex::new("A|B", 1).unwrap();
        let input = Constraint::all(1, Alphabet::all());
        let out = regex.constrain(&input);
        assert!(out.at(0).contains(Alphabet::index_of('A').unwrap()));
        assert!(out.at(0).contains(Alphabet::index_of('B').unwrap()));
        assert!(!out.at(0).contains(Alphabet::index_of('C').unwrap()));
    }

    #[test]
    #[serial]
    fn impossible_length_yields_empty_constraint() {
        Alphabet::reset();
        Alphabet::set("AB").unwrap();
        let regex = Regex::new("AB", 3).unwrap();
        let input = Constraint::all(3, Alphabet::all());
        let out = regex.constrain(&input);
        assert!(!out.is_satisfiable());
    }

    #[test]
    #[serial]
    fn backreference_couples_positions() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        // Matches "AA" or "BB", never "CC" or any mixed pair.
        let regex = Regex::new("(A|B)\\1", 2).unwrap();
        let input = Constraint::all(2, Alphabet::all());
        let out = regex.constrain(&input);
        let a = Alphabet::index_of('A').unwrap();
        let b = Alphabet::index_of('B').unwrap();
        let c = Alphabet::index_of('C').unwrap();
        for pos in [0, 1] {
            assert!(out.at(pos).contains(a));
            assert!(out.at(pos).contains(b));
            assert!(!out.at(pos).contains(c));
        }
    }

    #[test]
    #[serial]
    fn positive_lookahead_narrows_next_position() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let regex = Regex::new("A(?=B).", 2).unwrap();
        let input = Constraint::all(2, Alphabet::all());
        let out = regex.constrain(&input);
        assert_eq!(
            out.at(0),
            crate::char_set::CharSet::singleton(Alphabet::index_of('A').unwrap())
        );
        assert!(out.at(1).contains(Alphabet::index_of('B').unwrap()));
    }

    fn set_of(chars: &str) -> crate::char_set::CharSet {
        let mut set = crate::char_set::CharSet::none();
        for c in chars.chars() {
            set.insert(Alphabet::index_of(c).unwrap());
        }
        set
    }

    /// spec §8 S4: `([AB])\1` on `{A, AB}` narrows to `{A, A}`, and on
    /// `{AB, A}` also narrows to `{A, A}` -- the backreference forces both
    /// positions to agree, so only the character common to both inputs
    /// survives.
    #[test]
    #[serial]
    fn s4_backreference_forces_agreement() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let regex = Regex::new("([AB])\\1", 2).unwrap();

        let input = Constraint::from_sets(vec![set_of("A"), set_of("AB")]);
        let out = regex.constrain(&input);
        assert_eq!(out.at(0), set_of("A"));
        assert_eq!(out.at(1), set_of("A"));

        let input2 = Constraint::from_sets(vec![set_of("AB"), set_of("A")]);
        let out2 = regex.constrain(&input2);
        assert_eq!(out2.at(0), set_of("A"));
        assert_eq!(out2.at(1), set_of("A"));
    }

    /// spec §8 S5: `(A(?=B)).\1` on a fully-open size-3 constraint over
    /// `{A,B,C}` yields exactly `{A,B,A}`.
    #[test]
    #[serial]
    fn s5_lookahead_and_backreference_compose() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let regex = Regex::new("(A(?=B)).\\1", 3).unwrap();
        let input = Constraint::all(3, Alphabet::all());
        let out = regex.constrain(&input);
        assert_eq!(out.at(0), set_of("A"));
        assert_eq!(out.at(1), set_of("B"));
        assert_eq!(out.at(2), set_of("A"));
    }

    /// spec §8 S6: over alphabet `AB=&`, `[AB]\b` narrows position 1 to the
    /// non-word characters, while `[AB]\B` leaves it as word characters.
    #[test]
    #[serial]
    fn s6_word_boundary_narrows_neighbor() {
        Alphabet::reset();
        Alphabet::set("AB=&").unwrap();

        let boundary = Regex::new("[AB]\\b", 2).unwrap();
        let input = Constraint::all(2, Alphabet::all());
        let out = boundary.constrain(&input);
        assert_eq!(out.at(0), set_of("AB"));
        assert_eq!(out.at(1), set_of("=&"));

        let non_boundary = Regex::new("[AB]\\B", 2).unwrap();
        let out2 = non_boundary.constrain(&input);
        assert_eq!(out2.at(0), set_of("AB"));
        assert_eq!(out2.at(1), set_of("AB"));
    }

    /// spec §4.4.1 one-sided rule: a leading `\b` has no left neighbor, so
    /// it narrows position 0 directly to the word characters.
    #[test]
    #[serial]
    fn leading_word_boundary_narrows_first_cell() {
        Alphabet::reset();
        Alphabet::set("AB=&").unwrap();

        let regex = Regex::new("\\b[AB=&]", 1).unwrap();
        let input = Constraint::all(1, Alphabet::all());
        let out = regex.constrain(&input);
        assert_eq!(out.at(0), set_of("AB"));
    }

    /// spec §4.4.1 one-sided rule: a trailing `\b` lands at `begin_pos == n`
    /// (the boundary has no right neighbor to pair it with), which must
    /// narrow the last cell in place rather than index past the end of the
    /// constraint.
    #[test]
    #[serial]
    fn trailing_word_boundary_narrows_last_cell_without_panicking() {
        Alphabet::reset();
        Alphabet::set("AB=&").unwrap();

        let regex = Regex::new("[AB]\\b", 1).unwrap();
        let input = Constraint::all(1, Alphabet::all());
        let out = regex.constrain(&input);
        assert_eq!(out.at(0), set_of("AB"));
    }

    /// A `\b` carried by only one alternative of a union must not narrow
    /// cells that another, boundary-free alternative leaves open. Over an
    /// alphabet of only word characters, `\b` between two in-alphabet cells
    /// can never hold, so the first alternative of `[AB](\b[AB]|[AB])` is
    /// always impossible and must be dropped -- it must not corrupt the
    /// second alternative's legitimate `{A,B},{A,B}` match.
    #[test]
    #[serial]
    fn boundary_in_one_union_branch_does_not_narrow_the_other() {
        Alphabet::reset();
        Alphabet::set("AB").unwrap();

        let regex = Regex::new("[AB](\\b[AB]|[AB])", 2).unwrap();
        let input = Constraint::all(2, Alphabet::all());
        let out = regex.constrain(&input);
        assert!(out.is_satisfiable());
        assert_eq!(out.at(0), set_of("AB"));
        assert_eq!(out.at(1), set_of("AB"));
    }
}
