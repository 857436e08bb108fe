//! Operator semantics over evaluated values
//!
//! - [`unary`]: `-x`, `+x`, `!x`
//! - [`binary`]: arithmetic, comparison, concatenation and logic
//! - [`access`]: `list[i]` / `string[i]` and `instance.member`

pub mod access;
pub mod binary;
pub mod unary;
