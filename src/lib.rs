//! # Introduction
//!
//! Gordian is a small scripting language for writing autonomous routines and
//! preference files that a host program loads without being recompiled. The
//! host registers native callables in a root [`Scope`](memory::scope::Scope),
//! hands the interpreter script text, and gets back [`Value`](memory::value::Value)s
//! or a [`ScriptError`](interpreter::errors::ScriptError) tagged with a line.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Normalizer → Segmenter → Lexer → AST → Interpreter
//! ```
//!
//! 1. [`parser`]: strips comments and whitespace, splits statements and
//!    blocks, tokenizes each one and builds statement trees.
//! 2. [`interpreter`]: walks the trees against a scope; owns callables,
//!    classes and the `thread{}` primitive.
//! 3. [`memory`]: values and the private/public scope tables.
//!
//! ## Example
//!
//! ```
//! use gordian::{Interpreter, Scope, Signature, Value, ValueKind};
//!
//! let scope = Scope::root();
//! scope
//!     .register_returning_method("twice", Signature::new([ValueKind::Number]), |args| {
//!         Ok(Value::Number(args[0].expect_number()? * 2.0))
//!     })
//!     .unwrap();
//!
//! let interpreter = Interpreter::new();
//! interpreter.run("speed = twice(21)", &scope).unwrap();
//! assert_eq!(scope.lookup("speed").unwrap(), Value::from(42));
//! ```

pub mod interpreter;
pub mod memory;
pub mod parser;

pub use interpreter::callables::Signature;
pub use interpreter::engine::{ExecOutcome, Interpreter, InterpreterConfig};
pub use interpreter::errors::{ErrorKind, ScriptError};
pub use memory::scope::Scope;
pub use memory::value::{Instance, Value, ValueKind};
