//! Regular expressions: syntax tree, parser and Thompson compiler.
//!
//! The syntax has the literals `~` (empty string) and `∅` (empty language),
//! postfix `*`, infix `|`, juxtaposition for concatenation and parentheses for
//! grouping. Every other character stands for itself.

pub(crate) mod ast;
pub(crate) mod compiler;
pub(crate) mod parser;
pub(crate) mod simplify;

pub use ast::Regex;
pub use parser::parse_regex;
