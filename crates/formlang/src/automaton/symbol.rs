//! Symbol types for automata transitions.

use std::fmt;

/// Text used for the epsilon pseudo-symbol, both in snapshots and in regexes
/// (where it is the empty-string literal).
pub const EPSILON_TEXT: &str = "~";

/// [`EPSILON_TEXT`] as a character.
pub const EPSILON_CHAR: char = '~';

/// The empty-language literal of the regex syntax.
pub const EMPTY_SET_CHAR: char = '∅';

/// Characters that the regex syntax reserves and that therefore can never be
/// an input symbol.
pub const RESERVED: [char; 6] = ['(', ')', '*', '|', EPSILON_CHAR, EMPTY_SET_CHAR];

/// A transition label: one input character, or epsilon.
///
/// Epsilon orders before every character, so iterating a sorted symbol set
/// visits epsilon edges first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

/// Whether `c` may be used as an input symbol.
#[inline]
pub fn is_input_char(c: char) -> bool {
    !RESERVED.contains(&c)
}

impl Symbol {
    #[inline]
    pub fn is_epsilon(self) -> bool {
        self == Symbol::Epsilon
    }

    /// The input character, or `None` for epsilon.
    #[inline]
    pub fn as_char(self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(c),
        }
    }

    /// Parse the snapshot spelling of a symbol: `~` or a single non-reserved character.
    pub fn parse(text: &str) -> Option<Symbol> {
        if text == EPSILON_TEXT {
            return Some(Symbol::Epsilon);
        }

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if is_input_char(c) => Some(Symbol::Char(c)),
            _ => None,
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Char(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => f.write_str(EPSILON_TEXT),
            Symbol::Char(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon() {
        assert!(Symbol::Epsilon.is_epsilon());
        assert!(!Symbol::Char('a').is_epsilon());
        assert_eq!(Symbol::Epsilon.as_char(), None);
        assert!(Symbol::Epsilon < Symbol::Char('\0'));
    }

    #[test]
    fn test_parse_round_trips_display() {
        for symbol in [Symbol::Epsilon, Symbol::Char('a'), Symbol::Char('0')] {
            assert_eq!(Symbol::parse(&symbol.to_string()), Some(symbol));
        }
    }

    #[test]
    fn test_parse_rejects_reserved_and_long() {
        assert_eq!(Symbol::parse("ab"), None);
        assert_eq!(Symbol::parse(""), None);
        assert_eq!(Symbol::parse("*"), None);
        assert_eq!(Symbol::parse("∅"), None);
        assert!(!is_input_char('('));
        assert!(is_input_char(' '));
    }
}
