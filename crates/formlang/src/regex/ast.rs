//! Regular expression syntax tree.

use crate::automaton::symbol::{EMPTY_SET_CHAR, EPSILON_TEXT};
use std::fmt;

/// A regular expression.
///
/// Equality is structural: two trees are equal when they have the same shape
/// and the same literals, regardless of the languages they denote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    /// The empty language, written `∅`.
    EmptySet,
    /// The language holding only the empty word, written `~`.
    EmptyString,
    Char(char),
    Concat(Box<Regex>, Box<Regex>),
    Union(Box<Regex>, Box<Regex>),
    Star(Box<Regex>),
}

impl Regex {
    pub fn concat(left: Regex, right: Regex) -> Regex {
        Regex::Concat(Box::new(left), Box::new(right))
    }

    pub fn union(left: Regex, right: Regex) -> Regex {
        Regex::Union(Box::new(left), Box::new(right))
    }

    pub fn star(inner: Regex) -> Regex {
        Regex::Star(Box::new(inner))
    }

    /// Whether `input` is in the language of this expression.
    pub fn is_match(&self, input: &str) -> bool {
        self.to_nfa().accepts(input)
    }

    /// Binding strength, used to decide where `Display` needs parentheses.
    fn precedence(&self) -> u8 {
        match self {
            Regex::Union(..) => 0,
            Regex::Concat(..) => 1,
            Regex::Star(_) => 2,
            Regex::EmptySet | Regex::EmptyString | Regex::Char(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::EmptySet => write!(f, "{EMPTY_SET_CHAR}"),
            Regex::EmptyString => f.write_str(EPSILON_TEXT),
            Regex::Char(c) => write!(f, "{c}"),
            Regex::Concat(left, right) => {
                left.fmt_operand(f, 1)?;
                right.fmt_operand(f, 1)
            }
            Regex::Union(left, right) => {
                left.fmt_operand(f, 0)?;
                f.write_str("|")?;
                right.fmt_operand(f, 0)
            }
            Regex::Star(inner) => {
                inner.fmt_operand(f, 2)?;
                f.write_str("*")
            }
        }
    }
}
