//! Smart constructors that fold the identities and annihilators of the regex
//! algebra while building GNFA edge labels.
//!
//! This is not a full simplifier: it only rewrites the root of the tree being
//! built, so the result is shorter but not minimal.

use crate::regex::ast::Regex;

/// `left | right`, with `∅` as identity and `x | x = x`.
pub(crate) fn union(left: Regex, right: Regex) -> Regex {
    match (left, right) {
        (Regex::EmptySet, other) | (other, Regex::EmptySet) => other,
        (left, right) if left == right => left,
        (left, right) => Regex::union(left, right),
    }
}

/// `left right`, with `∅` as annihilator and `~` as identity.
pub(crate) fn concat(left: Regex, right: Regex) -> Regex {
    match (left, right) {
        (Regex::EmptySet, _) | (_, Regex::EmptySet) => Regex::EmptySet,
        (Regex::EmptyString, other) | (other, Regex::EmptyString) => other,
        (left, right) => Regex::concat(left, right),
    }
}

/// `inner*`, with `∅* = ~* = ~` and `x** = x*`.
pub(crate) fn star(inner: Regex) -> Regex {
    match inner {
        Regex::EmptySet | Regex::EmptyString => Regex::EmptyString,
        Regex::Star(_) => inner,
        inner => Regex::star(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: char) -> Regex {
        Regex::Char(value)
    }

    #[test]
    fn test_union_identities() {
        assert_eq!(union(Regex::EmptySet, c('a')), c('a'));
        assert_eq!(union(c('a'), Regex::EmptySet), c('a'));
        assert_eq!(union(c('a'), c('a')), c('a'));
        assert_eq!(union(c('a'), c('b')), Regex::union(c('a'), c('b')));
    }

    #[test]
    fn test_concat_identities() {
        assert_eq!(concat(Regex::EmptySet, c('a')), Regex::EmptySet);
        assert_eq!(concat(c('a'), Regex::EmptySet), Regex::EmptySet);
        assert_eq!(concat(Regex::EmptyString, c('a')), c('a'));
        assert_eq!(concat(c('a'), Regex::EmptyString), c('a'));
        assert_eq!(concat(c('a'), c('b')), Regex::concat(c('a'), c('b')));
    }

    #[test]
    fn test_star_identities() {
        assert_eq!(star(Regex::EmptySet), Regex::EmptyString);
        assert_eq!(star(Regex::EmptyString), Regex::EmptyString);
        assert_eq!(star(star(c('a'))), Regex::star(c('a')));
    }
}
