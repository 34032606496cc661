/*! This module parses, compiles, and executes regular expressions.

A pattern goes through the following stages:

1. [`parser::Parser`] converts the pattern into an [`ast::Ast`].
2. [`optimizer::optimize`] simplifies the AST.
3. [`optree::compiler::Compiler`] lowers the AST into an [`optree::OpTree`],
   a graph of operations where each node knows which node follows it when
   it matches, and where repetitions are expressed as cycles.
4. [`engine::Engine`] executes the op tree with a backtracking algorithm
   that records positions and captures in a [`context::MatchContext`].

The backtracking engine makes possible features like back-references
(`(foo)\1`), which can't be implemented with finite automata. The price is
that some patterns can take exponential time with certain inputs.
 */

use thiserror::Error;

pub mod ast;
pub mod charclass;
pub mod context;
pub mod engine;
pub mod optimizer;
pub mod optree;
pub mod parser;

pub(crate) mod pool;

pub use parser::{ParseError, ParseErrorKind};

/// Maximum number of nodes in an [`optree::OpTree`].
pub const MAX_OPS: usize = 1 << 20;

/// Errors returned while compiling a regular expression.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pattern is not a valid regular expression.
    #[error("invalid regexp: {0}")]
    Parse(#[from] ParseError),

    /// The regular expression is too large.
    #[error("regexp too large")]
    TooLarge,

    /// A capture group ends before starting. The matching engine never
    /// produces this error, if it's raised there's a bug somewhere.
    #[error("undetermined capture for group {0}")]
    UndeterminedCapture(u32),
}
