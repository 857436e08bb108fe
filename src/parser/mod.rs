//! Gordian source parser
//!
//! This module transforms script text into statement trees:
//! - [`normalize`]: comment and whitespace stripping, delimiter balance checks
//! - [`segment`]: splitting normalized text into instructions and blocks
//! - [`lexer`]: tokenization of a single segment
//! - [`parse`]: the [`Parser`](parse::Parser) coordinator
//! - [`expressions`]: expression trees over token slices
//! - [`ast`]: node definitions
//!
//! # Parser Implementation
//!
//! Hand-written. Statements are found by scanning for `;` and matched braces,
//! then each one is tokenized on its own. Expressions are split at operator
//! positions rather than climbed by precedence, which gives Gordian its own
//! grouping rules (see [`expressions`]).

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod normalize;
pub mod parse;
pub mod segment;
mod statements;

pub use parse::{parse_expression_text, parse_program, Parser};
