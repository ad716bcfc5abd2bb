//! A length-1 character choice: `CharacterBlock` (§3). Every leaf of the
//! regex AST that consumes exactly one position wraps one of these.

use crate::alphabet::Alphabet;
use crate::char_set::CharSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShorthandKind {
    Digit,
    Word,
    Space,
    NotDigit,
    NotWord,
    NotSpace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterBlock {
    Single(char),
    Range(char, char),
    Shorthand(ShorthandKind),
    /// `.`: any alphabet character except `\n`.
    Dot,
    BracketClass {
        negated: bool,
        blocks: Vec<CharacterBlock>,
    },
    /// Only ever produced by union-fusion optimization (§4.5 Pass 2).
    Composite(Vec<CharacterBlock>),
}

impl CharacterBlock {
    /// The set of alphabet indices this block can take on. Requires the
    /// alphabet to already be set.
    pub fn characters(&self) -> CharSet {
        match self {
            Self::Single(c) => match Alphabet::index_of(*c) {
                Some(i) => CharSet::singleton(i),
                None => CharSet::none(),
            },
            Self::Range(lo, hi) => {
                let mut set = CharSet::none();
                for i in 0..Alphabet::len() {
                    let c = Alphabet::character_at(i);
                    if c >= *lo && c <= *hi {
                        set.insert(i);
                    }
                }
                set
            }
            Self::Shorthand(kind) => shorthand_characters(*kind),
            Self::Dot => {
                let mut set = Alphabet::all();
                if let Some(i) = Alphabet::index_of('\n') {
                    set.remove(i);
                }
                set
            }
            Self::BracketClass { negated, blocks } => {
                let mut set = CharSet::none();
                for b in blocks {
                    set = set.union(&b.characters());
                }
                if *negated {
                    set = Alphabet::complement_set(&set);
                }
                set
            }
            Self::Composite(blocks) => {
                let mut set = CharSet::none();
                for b in blocks {
                    set = set.union(&b.characters());
                }
                set
            }
        }
    }

    /// The characters literally present in this block's source, expanding
    /// shorthand classes but not `.` -- used before the alphabet exists, to
    /// build it in the first place.
    pub fn explicit_characters(&self) -> String {
        match self {
            Self::Single(c) => c.to_string(),
            Self::Range(lo, hi) => (*lo..=*hi).collect(),
            Self::Shorthand(kind) => shorthand_explicit_characters(*kind),
            Self::Dot => String::new(),
            Self::BracketClass { blocks, .. } => {
                blocks.iter().map(|b| b.explicit_characters()).collect()
            }
            Self::Composite(blocks) => blocks.iter().map(|b| b.explicit_characters()).collect(),
        }
    }
}

impl std::fmt::Display for CharacterBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Single(c) => write!(f, "{}", escape_literal(*c)),
            Self::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
            Self::Shorthand(kind) => write!(f, "{}", shorthand_source(*kind)),
            Self::Dot => write!(f, "."),
            Self::BracketClass { negated, blocks } => {
                write!(f, "[")?;
                if *negated {
                    write!(f, "^")?;
                }
                for b in blocks {
                    write!(f, "{}", b)?;
                }
                write!(f, "]")
            }
            Self::Composite(blocks) => {
                write!(f, "[")?;
                for b in blocks {
                    write!(f, "{}", b)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn escape_literal(c: char) -> String {
    if "[]\\^$.|?*+()".contains(c) {
        format!("\\{}", c)
    } else {
        c.to_string()
    }
}

pub fn shorthand_source(kind: ShorthandKind) -> &'static str {
    match kind {
        ShorthandKind::Digit => "\\d",
        ShorthandKind::Word => "\\w",
        ShorthandKind::Space => "\\s",
        ShorthandKind::NotDigit => "\\D",
        ShorthandKind::NotWord => "\\W",
        ShorthandKind::NotSpace => "\\S",
    }
}

/// Fixed, non-locale-dependent shorthand expansions (§4.2). Note `\s` is
/// deliberately narrowed to a literal space, not `[\t\n\r\f\v ]` -- this is
/// load-bearing for the test suite (§9 Open Question (a)).
fn shorthand_explicit_characters(kind: ShorthandKind) -> String {
    match kind {
        ShorthandKind::Digit => "0123456789".to_string(),
        ShorthandKind::Word => {
            let mut s = String::new();
            s.extend('A'..='Z');
            s.extend('a'..='z');
            s.extend('0'..='9');
            s.push('_');
            s
        }
        ShorthandKind::Space => " ".to_string(),
        // Negations expand to nothing explicit of their own; their
        // characters are an alphabet complement computed once the alphabet
        // exists.
        ShorthandKind::NotDigit | ShorthandKind::NotWord | ShorthandKind::NotSpace => {
            String::new()
        }
    }
}

fn shorthand_characters(kind: ShorthandKind) -> CharSet {
    match kind {
        ShorthandKind::Digit => chars_in(&CharacterBlock::Range('0', '9')),
        ShorthandKind::Word => {
            let mut set = chars_in(&CharacterBlock::Range('A', 'Z'));
            set = set.union(&chars_in(&CharacterBlock::Range('a', 'z')));
            set = set.union(&chars_in(&CharacterBlock::Range('0', '9')));
            if let Some(i) = Alphabet::index_of('_') {
                set.insert(i);
            }
            set
        }
        ShorthandKind::Space => {
            if let Some(i) = Alphabet::index_of(' ') {
                CharSet::singleton(i)
            } else {
                CharSet::none()
            }
        }
        ShorthandKind::NotDigit => Alphabet::complement_set(&shorthand_characters(ShorthandKind::Digit)),
        ShorthandKind::NotWord => Alphabet::complement_set(&shorthand_characters(ShorthandKind::Word)),
        ShorthandKind::NotSpace => Alphabet::complement_set(&shorthand_characters(ShorthandKind::Space)),
    }
}

fn chars_in(block: &CharacterBlock) -> CharSet {
    block.characters()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn dot_excludes_newline() {
        Alphabet::reset();
        Alphabet::set("AB\n").unwrap();
        let set = CharacterBlock::Dot.characters();
        assert!(!set.contains(Alphabet::index_of('\n').unwrap()));
        assert!(set.contains(Alphabet::index_of('A').unwrap()));
    }

    #[test]
    #[serial]
    fn shorthand_space_is_narrow() {
        Alphabet::reset();
        Alphabet::set("A B").unwrap();
        let set = CharacterBlock::Shorthand(ShorthandKind::Space).characters();
        assert_eq!(set.len(), 1);
        assert!(set.contains(Alphabet::index_of(' ').unwrap()));
    }

    #[test]
    #[serial]
    fn bracket_class_negation() {
        Alphabet::reset();
        Alphabet::set("ABC").unwrap();
        let block = CharacterBlock::BracketClass {
            negated: true,
            blocks: vec![CharacterBlock::Single('A')],
        };
        let set = block.characters();
        assert!(!set.contains(Alphabet::index_of('A').unwrap()));
        assert!(set.contains(Alphabet::index_of('B').unwrap()));
        assert!(set.contains(Alphabet::index_of('C').unwrap()));
    }
}
