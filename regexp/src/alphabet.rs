//! The process-wide alphabet: the sorted set of explicit characters seen
//! anywhere in a grid's regexes, set once per [`crate::solve`]-style call and
//! reset before the next one (§3, §9 "Global Alphabet").
//!
//! A single grid is solved at a time, so this is thread-local state guarded
//! by a mutex the way `Logger::global()` guards its ring buffer in the
//! teacher's `logging` crate: a lazily-initialized static with interior
//! mutability, not a value threaded through every call.

use std::sync::Mutex;

use crate::char_set::CharSet;
use crate::errors::{AlphabetError, Result};

/// Maximum number of distinct explicit characters a grid's alphabet may
/// contain. Chosen to match `Alphabet::capacity()` in the original solver:
/// low enough for `CharSet` to be a single machine word, high enough for
/// every grid tried so far.
pub const CAPACITY: usize = 128;

struct AlphabetState {
    /// Characters in byte order; `characters[i]` is the character at index
    /// `i`. Empty until `Alphabet::set` is called.
    characters: Vec<char>,
}

impl AlphabetState {
    const fn empty() -> Self {
        Self {
            characters: Vec::new(),
        }
    }
}

lazy_static::lazy_static! {
    static ref ALPHABET: Mutex<AlphabetState> = Mutex::new(AlphabetState::empty());
}

/// The process-wide alphabet. All functions are associated functions on this
/// zero-sized type rather than methods on a value, since there is always
/// exactly one live alphabet.
pub struct Alphabet;

impl Alphabet {
    /// Sets the alphabet from a string of explicit characters (duplicates
    /// and unsorted input are fine; the result is deduplicated and sorted in
    /// byte order). Must be called before any other `Alphabet` function, and
    /// again before solving a second grid in the same process (see
    /// [`Alphabet::reset`]).
    pub fn set(characters_to_add: &str) -> Result<()> {
        let mut chars: Vec<char> = characters_to_add.chars().collect();
        chars.sort_unstable();
        chars.dedup();

        if chars.is_empty() {
            return Err(AlphabetError::Empty.into());
        }
        if chars.len() > CAPACITY {
            return Err(AlphabetError::CapacityExceeded {
                capacity: CAPACITY,
                needed: chars.len(),
            }
            .into());
        }

        let mut state = ALPHABET.lock().unwrap();
        state.characters = chars;
        Ok(())
    }

    /// Clears the alphabet. Called before `set` at the start of every solve
    /// so that two sequential solves in one process never see stale state.
    pub fn reset() {
        let mut state = ALPHABET.lock().unwrap();
        state.characters.clear();
    }

    pub fn character_at(i: usize) -> char {
        let state = ALPHABET.lock().unwrap();
        state.characters[i]
    }

    pub fn index_of(c: char) -> Option<usize> {
        let state = ALPHABET.lock().unwrap();
        state.characters.binary_search(&c).ok()
    }

    pub fn has_character(c: char) -> bool {
        Self::index_of(c).is_some()
    }

    pub fn len() -> usize {
        ALPHABET.lock().unwrap().characters.len()
    }

    pub fn characters_as_string() -> String {
        ALPHABET.lock().unwrap().characters.iter().collect()
    }

    /// The `CharSet` containing every character currently in the alphabet.
    pub fn all() -> CharSet {
        let mut set = CharSet::none();
        for i in 0..Self::len() {
            set.insert(i);
        }
        set
    }

    /// `Alphabet::all() \ characters_to_omit`, as a string of characters to
    /// omit. Mirrors the `Alphabet::complement(const std::string&)` overload
    /// in the original; Rust has no overloading so its `CharSet` sibling is
    /// [`Alphabet::complement_set`].
    pub fn complement_chars(characters_to_omit: &str) -> CharSet {
        let mut set = Self::all();
        for c in characters_to_omit.chars() {
            if let Some(i) = Self::index_of(c) {
                set.remove(i);
            }
        }
        set
    }

    pub fn complement_set(characters_to_omit: &CharSet) -> CharSet {
        Self::all().difference(characters_to_omit)
    }

    /// The alphabet's intersection with `[A-Za-z0-9_]`, used by word-boundary
    /// application (§4.4.1).
    pub fn word_characters() -> CharSet {
        let mut set = CharSet::none();
        for i in 0..Self::len() {
            let c = Self::character_at(i);
            if c.is_ascii_alphanumeric() || c == '_' {
                set.insert(i);
            }
        }
        set
    }

    pub fn non_word_characters() -> CharSet {
        Self::complement_set(&Self::word_characters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn set_and_lookup() {
        Alphabet::reset();
        Alphabet::set("CBA").unwrap();
        assert_eq!(Alphabet::len(), 3);
        assert_eq!(Alphabet::character_at(0), 'A');
        assert_eq!(Alphabet::character_at(2), 'C');
        assert_eq!(Alphabet::index_of('B'), Some(1));
        assert_eq!(Alphabet::index_of('Z'), None);
    }

    #[test]
    #[serial]
    fn rejects_empty_alphabet() {
        Alphabet::reset();
        assert!(Alphabet::set("").is_err());
    }

    #[test]
    #[serial]
    fn rejects_over_capacity() {
        Alphabet::reset();
        let chars: String = (0..(CAPACITY + 1) as u32)
            .map(|i| char::from_u32('a' as u32 + i).unwrap())
            .collect();
        assert!(Alphabet::set(&chars).is_err());
    }

    #[test]
    #[serial]
    fn word_characters_excludes_punctuation() {
        Alphabet::reset();
        Alphabet::set("AB=&").unwrap();
        let word = Alphabet::word_characters();
        assert!(word.contains(Alphabet::index_of('A').unwrap()));
        assert!(!word.contains(Alphabet::index_of('=').unwrap()));
    }
}
