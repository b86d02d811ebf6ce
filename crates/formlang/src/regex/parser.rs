//! Two-stack regular expression parser.
//!
//! The text is first split into tokens, with an explicit concatenation marker
//! inserted wherever juxtaposition means concatenation. The token stream is
//! then evaluated with an operand stack of trees and an operator stack of
//! group openers, unions and concatenations.

use crate::automaton::symbol::{EMPTY_SET_CHAR, EPSILON_CHAR};
use crate::error::ParseError;
use crate::regex::ast::Regex;
use std::str::FromStr;

/// Name used for the implicit concatenation operator in error reports.
const CONCAT_MARKER: char = '·';

/// Regex token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    /// Character offset of the token in the input. Concatenation markers take
    /// the position of the token that follows them.
    pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Char(char),
    EmptyString,
    EmptySet,
    LeftParen,
    RightParen,
    Star,
    Union,
    Concat,
}

impl TokenKind {
    fn from_char(c: char) -> Self {
        match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '*' => TokenKind::Star,
            '|' => TokenKind::Union,
            EMPTY_SET_CHAR => TokenKind::EmptySet,
            EPSILON_CHAR => TokenKind::EmptyString,
            c => TokenKind::Char(c),
        }
    }
}

/// Whether juxtaposing `left` and `right` means concatenating them.
fn is_concatenation(left: TokenKind, right: TokenKind) -> bool {
    !matches!(left, TokenKind::LeftParen | TokenKind::Union)
        && !matches!(
            right,
            TokenKind::Union | TokenKind::Star | TokenKind::RightParen
        )
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(input.len() * 2);

    for (pos, c) in input.chars().enumerate() {
        let kind = TokenKind::from_char(c);
        if let Some(prev) = tokens.last() {
            if is_concatenation(prev.kind, kind) {
                tokens.push(Token {
                    kind: TokenKind::Concat,
                    pos,
                });
            }
        }
        tokens.push(Token { kind, pos });
    }

    tokens
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    /// An open group. `floor` is the operand stack height when it was opened.
    Group { floor: usize, pos: usize },
    Union { pos: usize },
    Concat { pos: usize },
}

struct Parser {
    operands: Vec<Regex>,
    operators: Vec<Operator>,
}

impl Parser {
    fn new() -> Self {
        Self {
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    /// Operand stack height below which the innermost open group cannot reach.
    fn floor(&self) -> usize {
        self.operators
            .iter()
            .rev()
            .find_map(|op| match op {
                Operator::Group { floor, .. } => Some(*floor),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn pop_operand(&mut self, operator: char, pos: usize) -> Result<Regex, ParseError> {
        if self.operands.len() <= self.floor() {
            return Err(ParseError::MissingOperand { operator, position: pos });
        }
        self.operands
            .pop()
            .ok_or(ParseError::MissingOperand { operator, position: pos })
    }

    fn pop_pair(&mut self, operator: char, pos: usize) -> Result<(Regex, Regex), ParseError> {
        let right = self.pop_operand(operator, pos)?;
        let left = self.pop_operand(operator, pos)?;
        Ok((left, right))
    }

    /// Resolve a concatenation on top of the operator stack, if there is one.
    fn resolve_concat(&mut self) -> Result<(), ParseError> {
        let Some(&Operator::Concat { pos }) = self.operators.last() else {
            return Ok(());
        };
        self.operators.pop();

        let (left, right) = self.pop_pair(CONCAT_MARKER, pos)?;
        // ~ is the identity of concatenation
        let regex = if left == Regex::EmptyString {
            right
        } else {
            Regex::concat(left, right)
        };
        self.operands.push(regex);
        Ok(())
    }

    /// Resolve every union on top of the operator stack.
    fn resolve_unions(&mut self) -> Result<(), ParseError> {
        while let Some(&Operator::Union { pos }) = self.operators.last() {
            self.operators.pop();
            let (left, right) = self.pop_pair('|', pos)?;
            self.operands.push(Regex::union(left, right));
        }
        Ok(())
    }

    fn close_group(&mut self, pos: usize) -> Result<(), ParseError> {
        self.resolve_concat()?;
        self.resolve_unions()?;

        let Some(Operator::Group { floor, .. }) = self.operators.pop() else {
            return Err(ParseError::UnopenedGroup { position: pos });
        };
        if self.operands.len() == floor {
            self.operands.push(Regex::EmptyString);
        }
        Ok(())
    }

    fn push_token(&mut self, token: Token) -> Result<(), ParseError> {
        let pos = token.pos;
        match token.kind {
            TokenKind::Char(c) => self.operands.push(Regex::Char(c)),
            TokenKind::EmptyString => self.operands.push(Regex::EmptyString),
            TokenKind::EmptySet => self.operands.push(Regex::EmptySet),
            TokenKind::Star => {
                let inner = self.pop_operand('*', pos)?;
                self.operands.push(Regex::star(inner));
            }
            TokenKind::LeftParen => self.operators.push(Operator::Group {
                floor: self.operands.len(),
                pos,
            }),
            TokenKind::RightParen => self.close_group(pos)?,
            TokenKind::Union => {
                self.resolve_concat()?;
                if self.operands.len() <= self.floor() {
                    return Err(ParseError::MissingOperand {
                        operator: '|',
                        position: pos,
                    });
                }
                self.operators.push(Operator::Union { pos });
            }
            TokenKind::Concat => {
                self.resolve_concat()?;
                self.operators.push(Operator::Concat { pos });
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Regex, ParseError> {
        self.resolve_concat()?;
        self.resolve_unions()?;

        if let Some(Operator::Group { pos, .. }) = self.operators.last() {
            return Err(ParseError::UnclosedGroup { position: *pos });
        }

        Ok(self.operands.pop().unwrap_or(Regex::EmptyString))
    }
}

/// Parse regular expression text into a syntax tree.
///
/// The empty text and the empty group `()` both denote the empty string.
pub fn parse_regex(input: &str) -> Result<Regex, ParseError> {
    let mut parser = Parser::new();
    for token in tokenize(input) {
        parser.push_token(token)?;
    }
    parser.finish()
}

impl FromStr for Regex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_regex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: char) -> Regex {
        Regex::Char(value)
    }

    #[test]
    fn test_concat_markers() {
        let kinds: Vec<TokenKind> = tokenize("a(b)*|c").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Char('a'),
                TokenKind::Concat,
                TokenKind::LeftParen,
                TokenKind::Char('b'),
                TokenKind::RightParen,
                TokenKind::Star,
                TokenKind::Union,
                TokenKind::Char('c'),
            ]
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_regex("ab|c*").unwrap(),
            Regex::union(Regex::concat(c('a'), c('b')), Regex::star(c('c')))
        );
        assert_eq!(
            parse_regex("abc").unwrap(),
            Regex::concat(Regex::concat(c('a'), c('b')), c('c'))
        );
    }

    #[test]
    fn test_unions_nest_to_the_right() {
        assert_eq!(
            parse_regex("a|b|c").unwrap(),
            Regex::union(c('a'), Regex::union(c('b'), c('c')))
        );
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            parse_regex("(a|b)*aba").unwrap(),
            Regex::concat(
                Regex::concat(
                    Regex::concat(Regex::star(Regex::union(c('a'), c('b'))), c('a')),
                    c('b')
                ),
                c('a')
            )
        );
        assert_eq!(parse_regex("(ab)").unwrap(), Regex::concat(c('a'), c('b')));
        assert_eq!(
            parse_regex("(a|bc)").unwrap(),
            Regex::union(c('a'), Regex::concat(c('b'), c('c')))
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_regex("").unwrap(), Regex::EmptyString);
        assert_eq!(parse_regex("()").unwrap(), Regex::EmptyString);
        assert_eq!(parse_regex("∅").unwrap(), Regex::EmptySet);
        assert_eq!(parse_regex("a|~").unwrap(), Regex::union(c('a'), Regex::EmptyString));
        // ~ on the left of a concatenation is dropped
        assert_eq!(parse_regex("~a").unwrap(), c('a'));
        assert_eq!(parse_regex("a~").unwrap(), Regex::concat(c('a'), Regex::EmptyString));
    }

    #[test]
    fn test_from_str() {
        let regex: Regex = "a**".parse().unwrap();
        assert_eq!(regex, Regex::star(Regex::star(c('a'))));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            parse_regex("(ab"),
            Err(ParseError::UnclosedGroup { position: 0 })
        );
        assert_eq!(
            parse_regex("a(b(c)"),
            Err(ParseError::UnclosedGroup { position: 1 })
        );
        assert_eq!(
            parse_regex("ab)"),
            Err(ParseError::UnopenedGroup { position: 2 })
        );
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(
            parse_regex("*a"),
            Err(ParseError::MissingOperand { operator: '*', position: 0 })
        );
        assert_eq!(
            parse_regex("|a"),
            Err(ParseError::MissingOperand { operator: '|', position: 0 })
        );
        assert_eq!(
            parse_regex("a|"),
            Err(ParseError::MissingOperand { operator: '|', position: 1 })
        );
        assert_eq!(
            parse_regex("a(|b)"),
            Err(ParseError::MissingOperand { operator: '|', position: 2 })
        );
        assert_eq!(
            parse_regex("(*)"),
            Err(ParseError::MissingOperand { operator: '*', position: 1 })
        );
    }
}
