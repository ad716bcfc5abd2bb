//! A line's candidate-character state: one [`CharSet`] per cell (§3, §4.6).

use crate::char_set::CharSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint(Vec<CharSet>);

impl Constraint {
    /// Every position unconstrained (full alphabet).
    pub fn all(len: usize, alphabet: CharSet) -> Self {
        Constraint(vec![alphabet; len])
    }

    /// Every position impossible (used as the accumulator `constrain`
    /// builds up via repeated OR).
    pub fn none(len: usize) -> Self {
        Constraint(vec![CharSet::none(); len])
    }

    pub fn from_sets(sets: Vec<CharSet>) -> Self {
        Constraint(sets)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn at(&self, i: usize) -> CharSet {
        self.0[i]
    }

    pub fn set(&mut self, i: usize, value: CharSet) {
        self.0[i] = value;
    }

    pub fn sets(&self) -> &[CharSet] {
        &self.0
    }

    /// `true` iff every cell has at least one candidate left.
    pub fn is_satisfiable(&self) -> bool {
        self.0.iter().all(|s| !s.is_empty())
    }

    /// Elementwise OR: tightens `self` towards `other` from above, i.e.
    /// widens each cell's candidates to include `other`'s. Used while
    /// accumulating across a regex's alternative values.
    pub fn or_into(&mut self, other: &Constraint) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.union(b);
        }
    }

    /// Elementwise intersection in place.
    pub fn intersect_into(&mut self, other: &Constraint) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.intersect(b);
        }
    }

    /// `true` iff `self` is at least as tight as `other` everywhere, i.e.
    /// every cell's candidate set is a subset of `other`'s (§8 Property 1).
    pub fn tighter_than_or_equal(&self, other: &Constraint) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a.is_subset_of(b))
    }
}
