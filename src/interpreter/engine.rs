// Execution engine for Gordian scripts

use std::cell::Cell;
use std::sync::Arc;

use tracing::error;

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_THREAD_NAME};
use crate::interpreter::errors::ScriptError;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::Program;
use crate::parser::parse::{parse_expression_text, parse_program};

/// How a statement or block finished
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// Ran to the end; continue with the next statement
    Normal,
    /// `return` was executed; unwinds to the owning call
    Return(Value),
}

/// Interpreter tuning
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Nested script calls allowed before failing with a recursion error
    pub max_call_depth: usize,
    /// Name given to threads started by `thread{}`
    pub thread_name: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// Tree-walking interpreter
///
/// An `Interpreter` holds no bindings of its own: all state lives in the
/// [`Scope`] handed to [`Interpreter::run`]. It is cheap to create and is not
/// shared between threads; each `thread{}` block gets a fresh one with the
/// same configuration.
#[derive(Debug)]
pub struct Interpreter {
    config: Arc<InterpreterConfig>,
    /// Current script call depth on this thread
    pub(crate) depth: Cell<usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Interpreter {
            config: Arc::new(config),
            depth: Cell::new(0),
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// A fresh interpreter with this one's configuration, for another thread.
    pub(crate) fn sibling(&self) -> Interpreter {
        Interpreter {
            config: Arc::clone(&self.config),
            depth: Cell::new(0),
        }
    }

    /// Parse and execute `source` against `scope`.
    ///
    /// Bindings created before a failure stay in `scope`.
    pub fn run(&self, source: &str, scope: &Arc<Scope>) -> Result<(), ScriptError> {
        let program = parse_program(source).inspect_err(|err| {
            error!(%err, "script rejected");
        })?;
        self.run_program(&program, scope)
    }

    /// Execute an already parsed script. A top-level `return` ends the run.
    pub fn run_program(&self, program: &Program, scope: &Arc<Scope>) -> Result<(), ScriptError> {
        match self.execute_block(&program.statements, scope) {
            Ok(_) => Ok(()),
            Err(err) => {
                error!(%err, "script failed");
                Err(err)
            }
        }
    }

    /// Evaluate expression text in `scope`.
    pub fn evaluate(&self, scope: &Arc<Scope>, text: &str) -> Result<Value, ScriptError> {
        let expr = parse_expression_text(text)?;
        self.eval_expr(&expr, scope)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::ErrorKind;

    fn run(source: &str) -> Arc<Scope> {
        let scope = Scope::root();
        Interpreter::new().run(source, &scope).unwrap();
        scope
    }

    #[test]
    fn test_run_binds_variables() {
        let scope = run("x = 5\ny = x * 2");
        assert_eq!(scope.lookup("y").unwrap(), Value::from(10));
    }

    #[test]
    fn test_earlier_bindings_survive_failure() {
        let scope = Scope::root();
        let err = Interpreter::new()
            .run("a = 1\nb = ghost\nc = 3", &scope)
            .unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
        assert_eq!(scope.lookup("a").unwrap(), Value::from(1));
        assert!(scope.lookup("c").is_err());
    }

    #[test]
    fn test_top_level_return_ends_run() {
        let scope = run("a = 1\nreturn\na = 2");
        assert_eq!(scope.lookup("a").unwrap(), Value::from(1));
    }

    #[test]
    fn test_recursion_limit() {
        let interp = Interpreter::with_config(InterpreterConfig {
            max_call_depth: 16,
            ..InterpreterConfig::default()
        });
        let scope = Scope::root();
        let err = interp
            .run("def forever(n){ forever(n + 1); }\nforever(0)", &scope)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionLimit { limit: 16 });
        assert_eq!(interp.depth.get(), 0);
    }

    #[test]
    fn test_evaluate() {
        let scope = run("speed = 3");
        let interp = Interpreter::new();
        assert_eq!(interp.evaluate(&scope, "speed * 2").unwrap(), Value::from(6));
    }
}
