//! Gordian execution engine
//!
//! This module provides the tree-walking interpreter:
//! - [`engine`]: [`Interpreter`](engine::Interpreter), configuration, entry points
//! - [`errors`]: script failure types
//! - [`callables`]: native and script callables, overload dispatch
//! - [`classes`]: class declaration and the construction protocol
//! - [`ops`]: operator semantics over values
//!
//! # Execution Model
//!
//! Statements run one at a time against an `Arc<Scope>`. Blocks that need
//! their own bindings (`if` branches, loop iterations, calls, threads) run in
//! a fresh child scope. `return` is an [`ExecOutcome`](engine::ExecOutcome)
//! value, not an error, and stops at the nearest call.
//!
//! Interpreter methods are split across files using `impl Interpreter` blocks:
//! statements, expressions, loops, control (`if`/`try`/`thread`), callables
//! and classes each add their own.

pub mod callables;
pub mod classes;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod ops;
pub(crate) mod stack;

mod control;
mod expressions;
mod loops;
mod statements;
