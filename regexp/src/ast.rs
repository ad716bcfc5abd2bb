//! The regex AST (§3, §4.4) and its value-iteration/constraint-application
//! contract.
//!
//! Every node type from spec §3 is represented as a variant of [`Ast`]. The
//! tree itself is a plain, cheaply-`Clone`-able structure (no parent
//! pointers, no mutable per-node cursors) -- the "uniform stateful
//! iteration" spec §4.4 describes is implemented here as a pure recursive
//! enumeration (`enumerate_values`) rather than a resumable cursor per node.
//! A capturing group's "rightmost active instance to the left" is whichever
//! binding the in-progress enumeration has most recently threaded through
//! [`Groups`] when a backreference is reached, which gives the same
//! rightmost-wins, drop-if-uncaptured behavior spec §4.4.2/§4.4.3 call for
//! without needing literal ancestor-pointer walks over a mutable tree.

use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::character_block::CharacterBlock;
use crate::constraint::Constraint;

/// A safety valve against pathological regexes (deeply nested unbounded
/// repetition) blowing up the alternative count. Not part of the original
/// contract; a plain engineering guard.
const MAX_ALTERNATIVES: usize = 20_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// The empty language. Never produced by the parser; only ever arises
    /// as a closed-form simplification (e.g. `a{0}`'s zero-repetition base
    /// case, which is handled directly rather than via this variant, so in
    /// practice this tree is unreachable from parsed input).
    Empty,
    Epsilon,
    StartAnchor,
    EndAnchor,
    WordBoundary,
    NotWordBoundary,
    Lookahead(Box<Ast>),
    CharBlock(CharacterBlock),
    /// Only ever created by concatenation-fusion (§4.5 Pass 3); length >= 2.
    StringLeaf(Vec<CharacterBlock>),
    Backreference(u8),
    Capture {
        number: usize,
        child: Box<Ast>,
    },
    NonCapture(Box<Ast>),
    Concat(Box<Ast>, Box<Ast>),
    Union(Box<Ast>, Box<Ast>),
    Repeat {
        child: Box<Ast>,
        min: usize,
        max: Option<usize>,
    },
}

/// Identifies one shared capture cell: a capturing group's position and
/// every backreference position that copies it are tagged with the same
/// `LinkId`, so [`crate::regex::Regex::constrain`] can narrow all of them
/// together instead of independently (§4.4.2 "Backreference overlay").
pub type LinkId = u64;

fn fresh_link_id() -> LinkId {
    use std::cell::Cell;
    thread_local! {
        static NEXT: Cell<u64> = Cell::new(0);
    }
    NEXT.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

/// The CharSet a capturing group most recently produced, one entry per
/// position of the capture (in left-to-right order), paired with the link
/// id a backreference must reuse to stay coupled to that position.
#[derive(Debug, Clone, Default)]
pub struct GroupBinding {
    pub chars: Vec<(crate::char_set::CharSet, LinkId)>,
}

pub type Groups = HashMap<u8, GroupBinding>;

/// One leaf obligation a [`Value`] places on a position: the character set
/// demanded there, and, if this position is part of a capturing group or a
/// backreference to one, the `LinkId` it shares with every other position
/// bound to the same capture cell.
pub type Leaf = (usize, crate::char_set::CharSet, Option<LinkId>);

/// One way a (sub)tree can exactly occupy `[begin_pos, end_pos)`.
#[derive(Debug, Clone)]
pub struct Value {
    pub end_pos: usize,
    /// Character sets this value demands at each position it touches.
    /// Usually independent per position; leaves sharing a `LinkId` (a
    /// capturing group and its backreferences) are narrowed together by the
    /// same shared cell instead (§4.4.2).
    pub leaves: Vec<Leaf>,
    /// Positions at which a `\b`/`\B` landed, and which of the two.
    pub boundaries: Vec<(usize, bool)>,
}

impl Value {
    fn epsilon(at: usize) -> Self {
        Value {
            end_pos: at,
            leaves: Vec::new(),
            boundaries: Vec::new(),
        }
    }
}

type Alt = (Value, Groups);

impl Ast {
    /// Enumerates every value this (sub)tree can take starting at
    /// `begin_pos`, whose length does not exceed `n - begin_pos`. This
    /// includes values that do not reach all the way to `n` -- callers that
    /// need an exact line-filling match (the top-level `constrain` loop)
    /// filter on `end_pos == n` themselves; [`Ast::Lookahead`] is the one
    /// internal caller that deliberately keeps every fitting value (§4.4,
    /// "PositiveLookahead").
    pub fn enumerate_values(&self, begin_pos: usize, n: usize, groups: &Groups) -> Vec<Alt> {
        if begin_pos > n {
            return Vec::new();
        }

        match self {
            Ast::Empty => Vec::new(),
            Ast::Epsilon => vec![(Value::epsilon(begin_pos), groups.clone())],
            Ast::StartAnchor => {
                if begin_pos == 0 {
                    vec![(Value::epsilon(begin_pos), groups.clone())]
                } else {
                    Vec::new()
                }
            }
            Ast::EndAnchor => {
                if begin_pos == n {
                    vec![(Value::epsilon(begin_pos), groups.clone())]
                } else {
                    Vec::new()
                }
            }
            Ast::WordBoundary | Ast::NotWordBoundary => {
                let mut value = Value::epsilon(begin_pos);
                value
                    .boundaries
                    .push((begin_pos, matches!(self, Ast::WordBoundary)));
                vec![(value, groups.clone())]
            }
            Ast::Lookahead(child) => {
                let alts = child.enumerate_values(begin_pos, n, groups);
                let mut merged: HashMap<usize, crate::char_set::CharSet> = HashMap::new();
                for (value, _) in &alts {
                    for (pos, set, _) in &value.leaves {
                        merged
                            .entry(*pos)
                            .and_modify(|existing| *existing = existing.union(set))
                            .or_insert(*set);
                    }
                }
                let mut value = Value::epsilon(begin_pos);
                value.leaves = merged.into_iter().map(|(pos, set)| (pos, set, None)).collect();
                vec![(value, groups.clone())]
            }
            Ast::CharBlock(block) => {
                if begin_pos >= n {
                    return Vec::new();
                }
                let value = Value {
                    end_pos: begin_pos + 1,
                    leaves: vec![(begin_pos, block.characters(), None)],
                    boundaries: Vec::new(),
                };
                vec![(value, groups.clone())]
            }
            Ast::StringLeaf(blocks) => {
                if begin_pos + blocks.len() > n {
                    return Vec::new();
                }
                let leaves = blocks
                    .iter()
                    .enumerate()
                    .map(|(i, b)| (begin_pos + i, b.characters(), None))
                    .collect();
                let value = Value {
                    end_pos: begin_pos + blocks.len(),
                    leaves,
                    boundaries: Vec::new(),
                };
                vec![(value, groups.clone())]
            }
            Ast::Backreference(number) => match groups.get(number) {
                None => Vec::new(),
                Some(binding) => {
                    let len = binding.chars.len();
                    if begin_pos + len > n {
                        return Vec::new();
                    }
                    let leaves = binding
                        .chars
                        .iter()
                        .enumerate()
                        .map(|(i, (set, link))| (begin_pos + i, *set, Some(*link)))
                        .collect();
                    let value = Value {
                        end_pos: begin_pos + len,
                        leaves,
                        boundaries: Vec::new(),
                    };
                    vec![(value, groups.clone())]
                }
            },
            Ast::Capture { number, child } => {
                let alts = child.enumerate_values(begin_pos, n, groups);
                alts.into_iter()
                    .map(|(value, mut updated_groups)| {
                        // Only leaves within the group's own consumed span
                        // [begin_pos, end_pos) belong to its capture -- a
                        // lookahead nested inside the group can leave a leaf
                        // on a position past end_pos (it narrows without
                        // advancing), and that overlay is not part of what
                        // a backreference to this group replays.
                        let end_pos = value.end_pos;
                        let mut link_by_pos: HashMap<usize, LinkId> = HashMap::new();
                        for (pos, _, link) in &value.leaves {
                            if *pos >= begin_pos && *pos < end_pos {
                                link_by_pos.insert(*pos, link.unwrap_or_else(fresh_link_id));
                            }
                        }
                        let leaves: Vec<Leaf> = value
                            .leaves
                            .iter()
                            .map(|(pos, set, link)| match link_by_pos.get(pos) {
                                Some(id) => (*pos, *set, Some(*id)),
                                None => (*pos, *set, *link),
                            })
                            .collect();
                        let mut entries: Vec<(usize, crate::char_set::CharSet, LinkId)> = leaves
                            .iter()
                            .filter(|(pos, _, _)| *pos >= begin_pos && *pos < end_pos)
                            .map(|(pos, set, link)| (*pos, *set, link.unwrap()))
                            .collect();
                        entries.sort_by_key(|(pos, _, _)| *pos);
                        let chars = entries.into_iter().map(|(_, set, id)| (set, id)).collect();
                        updated_groups.insert(*number, GroupBinding { chars });
                        (
                            Value {
                                end_pos: value.end_pos,
                                leaves,
                                boundaries: value.boundaries,
                            },
                            updated_groups,
                        )
                    })
                    .collect()
            }
            Ast::NonCapture(child) => child.enumerate_values(begin_pos, n, groups),
            Ast::Concat(left, right) => {
                let mut out = Vec::new();
                for (lvalue, lgroups) in left.enumerate_values(begin_pos, n, groups) {
                    if lvalue.end_pos > n {
                        continue;
                    }
                    for (rvalue, rgroups) in right.enumerate_values(lvalue.end_pos, n, &lgroups) {
                        let mut leaves = lvalue.leaves.clone();
                        leaves.extend(rvalue.leaves);
                        let mut boundaries = lvalue.boundaries.clone();
                        boundaries.extend(rvalue.boundaries);
                        out.push((
                            Value {
                                end_pos: rvalue.end_pos,
                                leaves,
                                boundaries,
                            },
                            rgroups,
                        ));
                        if out.len() >= MAX_ALTERNATIVES {
                            return out;
                        }
                    }
                }
                out
            }
            Ast::Union(left, right) => {
                let mut out = left.enumerate_values(begin_pos, n, groups);
                out.extend(right.enumerate_values(begin_pos, n, groups));
                out
            }
            Ast::Repeat { child, min, max } => {
                repeat_values(child, *min, *max, begin_pos, n, groups)
            }
        }
    }

    /// The characters literally present in the regex source (§3
    /// "Alphabet"), used to build the alphabet before it exists.
    pub fn explicit_characters(&self) -> String {
        match self {
            Ast::Empty
            | Ast::Epsilon
            | Ast::StartAnchor
            | Ast::EndAnchor
            | Ast::WordBoundary
            | Ast::NotWordBoundary
            | Ast::Backreference(_) => String::new(),
            Ast::Lookahead(child) | Ast::NonCapture(child) => child.explicit_characters(),
            Ast::CharBlock(block) => block.explicit_characters(),
            Ast::StringLeaf(blocks) => blocks.iter().map(|b| b.explicit_characters()).collect(),
            Ast::Capture { child, .. } => child.explicit_characters(),
            Ast::Concat(l, r) | Ast::Union(l, r) => {
                let mut s = l.explicit_characters();
                s.push_str(&r.explicit_characters());
                s
            }
            Ast::Repeat { child, .. } => child.explicit_characters(),
        }
    }

    /// `true` iff every capturing group number backreferenced anywhere in
    /// this tree is collected into `out` (used by Optimizer Pass 1).
    pub fn collect_backreferenced_groups(&self, out: &mut std::collections::HashSet<usize>) {
        match self {
            Ast::Backreference(n) => {
                out.insert(*n as usize);
            }
            Ast::Lookahead(c) | Ast::NonCapture(c) | Ast::Capture { child: c, .. } => {
                c.collect_backreferenced_groups(out)
            }
            Ast::Concat(l, r) | Ast::Union(l, r) => {
                l.collect_backreferenced_groups(out);
                r.collect_backreferenced_groups(out);
            }
            Ast::Repeat { child, .. } => child.collect_backreferenced_groups(out),
            _ => {}
        }
    }
}

fn repeat_values(
    child: &Ast,
    min: usize,
    max: Option<usize>,
    begin_pos: usize,
    n: usize,
    groups: &Groups,
) -> Vec<Alt> {
    // An upper bound on how many repetitions could possibly still fit. If
    // the child can only ever produce zero-length values (e.g. `()*`), one
    // extra repetition beyond `min` is tried and no more, matching the
    // "skip epsilon to avoid non-termination" guidance in spec §4.4.
    let remaining = n.saturating_sub(begin_pos);
    let bound = match max {
        Some(m) => m,
        None => min + remaining + 1,
    };

    let mut all = Vec::new();
    let mut frontier: Vec<Alt> = vec![(Value::epsilon(begin_pos), groups.clone())];

    for k in 0..=bound {
        if k >= min {
            all.extend(frontier.clone());
            if all.len() >= MAX_ALTERNATIVES {
                break;
            }
        }

        if k == bound {
            break;
        }

        let mut next_frontier = Vec::new();
        let mut any_progress = false;
        for (value, gs) in &frontier {
            if value.end_pos > n {
                continue;
            }
            for (cvalue, cgroups) in child.enumerate_values(value.end_pos, n, gs) {
                if cvalue.end_pos > value.end_pos {
                    any_progress = true;
                }
                let mut leaves = value.leaves.clone();
                leaves.extend(cvalue.leaves.clone());
                let mut boundaries = value.boundaries.clone();
                boundaries.extend(cvalue.boundaries.clone());
                next_frontier.push((
                    Value {
                        end_pos: cvalue.end_pos,
                        leaves,
                        boundaries,
                    },
                    cgroups,
                ));
                if next_frontier.len() >= MAX_ALTERNATIVES {
                    break;
                }
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
        // If an unbounded repetition's child never advances the position,
        // one more pass has already been folded in above; stop here rather
        // than looping forever on width-zero repeats.
        if max.is_none() && !any_progress && k + 1 >= min {
            break;
        }
    }

    all
}

/// Applies the boundary-anchor rule (§4.4.1) to one value's local
/// `constraint` in place, for every `\b`/`\B` position that value's leaves
/// landed on. This runs per value, before the value is OR-ed into the
/// regex-wide accumulator -- a value whose boundary can never hold must be
/// dropped entirely, not averaged into the merged result (a boundary that
/// only one alternative of a union carries must not narrow positions that
/// another, boundary-free alternative leaves open). Returns `false` the
/// moment a position empties out, meaning this value is impossible.
pub fn apply_word_boundaries(boundaries: &[(usize, bool)], constraint: &mut Constraint) -> bool {
    let n = constraint.len();
    let word = Alphabet::word_characters();
    let non_word = Alphabet::non_word_characters();

    for &(p, is_word_boundary) in boundaries {
        if n == 0 {
            // Both \b and \B fail on an empty line.
            return false;
        }

        let ok = if p == 0 {
            narrow_edge(constraint, 0, is_word_boundary, &word, &non_word)
        } else if p == n {
            narrow_edge(constraint, n - 1, is_word_boundary, &word, &non_word)
        } else {
            narrow_pair(constraint, p - 1, p, is_word_boundary, &word, &non_word)
        };
        if !ok {
            return false;
        }
    }
    true
}

/// The one-sided rule at the start/end of the line (§4.4.1 "If p==0 or
/// p==n"): there is no neighboring cell, and the implicit character just
/// outside the line is always treated as non-word, so a boundary there
/// constrains `pos` alone. `\b` requires `pos` to be a word character;
/// `\B` requires it to be a non-word character. Returns `false` if that
/// empties `pos`.
fn narrow_edge(
    constraint: &mut Constraint,
    pos: usize,
    is_word_boundary: bool,
    word: &crate::char_set::CharSet,
    non_word: &crate::char_set::CharSet,
) -> bool {
    let set = constraint.at(pos);
    let narrowed = if is_word_boundary {
        set.difference(non_word)
    } else {
        set.difference(word)
    };
    if narrowed.is_empty() {
        return false;
    }
    constraint.set(pos, narrowed);
    true
}

/// The interior rule (§4.4.1 "If 0<p<n"): narrows `left` and `right` against
/// each other. Returns `false` if either side empties out.
fn narrow_pair(
    constraint: &mut Constraint,
    left: usize,
    right: usize,
    is_word_boundary: bool,
    word: &crate::char_set::CharSet,
    non_word: &crate::char_set::CharSet,
) -> bool {
    let left_set = constraint.at(left);
    let right_set = constraint.at(right);

    let left_is_word_only = left_set.intersect(non_word).is_empty() && !left_set.is_empty();
    let left_is_non_word_only = left_set.intersect(word).is_empty() && !left_set.is_empty();
    let right_is_word_only = right_set.intersect(non_word).is_empty() && !right_set.is_empty();
    let right_is_non_word_only = right_set.intersect(word).is_empty() && !right_set.is_empty();

    let mut new_left = left_set;
    let mut new_right = right_set;

    if is_word_boundary {
        // \b: exactly one side is a word character.
        if left_is_word_only {
            new_right = new_right.difference(word);
        }
        if left_is_non_word_only {
            new_right = new_right.difference(non_word);
        }
        if right_is_word_only {
            new_left = new_left.difference(word);
        }
        if right_is_non_word_only {
            new_left = new_left.difference(non_word);
        }
    } else {
        // \B: both sides agree (both word, or both non-word).
        if left_is_word_only {
            new_right = new_right.difference(non_word);
        }
        if left_is_non_word_only {
            new_right = new_right.difference(word);
        }
        if right_is_word_only {
            new_left = new_left.difference(non_word);
        }
        if right_is_non_word_only {
            new_left = new_left.difference(word);
        }
    }

    if new_left.is_empty() || new_right.is_empty() {
        return false;
    }
    constraint.set(left, new_left);
    constraint.set(right, new_right);
    true
}

impl std::fmt::Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ast::Empty => Ok(()),
            Ast::Epsilon => Ok(()),
            Ast::StartAnchor => write!(f, "^"),
            Ast::EndAnchor => write!(f, "$"),
            Ast::WordBoundary => write!(f, "\\b"),
            Ast::NotWordBoundary => write!(f, "\\B"),
            Ast::Lookahead(child) => write!(f, "(?={})", child),
            Ast::CharBlock(block) => write!(f, "{}", block),
            Ast::StringLeaf(blocks) => {
                for b in blocks {
                    write!(f, "{}", b)?;
                }
                Ok(())
            }
            Ast::Backreference(n) => write!(f, "\\{}", n),
            Ast::Capture { child, .. } => write!(f, "({})", child),
            Ast::NonCapture(child) => write!(f, "(?:{})", child),
            Ast::Concat(l, r) => write!(f, "{}{}", l, r),
            Ast::Union(l, r) => write!(f, "{}|{}", l, r),
            Ast::Repeat { child, min, max } => {
                write!(f, "{}", rep_child_to_string(child))?;
                match (min, max) {
                    (0, Some(1)) => write!(f, "?"),
                    (0, None) => write!(f, "*"),
                    (1, None) => write!(f, "+"),
                    (n, Some(m)) if n == m => write!(f, "{{{}}}", n),
                    (n, Some(m)) => write!(f, "{{{},{}}}", n, m),
                    (n, None) => write!(f, "{{{},}}", n),
                }
            }
        }
    }
}

fn rep_child_to_string(child: &Ast) -> String {
    match child {
        Ast::Concat(_, _) | Ast::Union(_, _) => format!("(?:{})", child),
        // A fused multi-character run binds to the whole run, same as an
        // explicit concatenation -- rendering it bare would let the
        // repetition suffix apply to only its last character.
        Ast::StringLeaf(blocks) if blocks.len() > 1 => format!("(?:{})", child),
        other => other.to_string(),
    }
}
