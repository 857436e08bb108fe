//! Statement execution.
//!
//! Adds `impl Interpreter` methods that run a block statement by statement
//! and dispatch each [`StmtKind`] to its handler. Errors are stamped with the
//! line of the statement that raised them; `return` travels back up as
//! [`ExecOutcome::Return`] until a call boundary takes it.

use std::sync::Arc;

use tracing::trace;

use crate::interpreter::engine::{ExecOutcome, Interpreter};
use crate::interpreter::errors::ScriptError;
use crate::interpreter::ops::binary::apply_binary;
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::{Place, Stmt, StmtKind};

impl Interpreter {
    /// Execute `block` in `scope`, stopping early on `return`.
    pub(crate) fn execute_block(
        &self,
        block: &[Stmt],
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        ensure_sufficient_stack(|| {
            for stmt in block {
                trace!(line = stmt.line, "executing statement");
                let outcome = self
                    .execute_statement(stmt, scope)
                    .map_err(|err| err.at_line(stmt.line))?;
                if let ExecOutcome::Return(_) = outcome {
                    return Ok(outcome);
                }
            }
            Ok(ExecOutcome::Normal)
        })
    }

    fn execute_statement(
        &self,
        stmt: &Stmt,
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        match &stmt.kind {
            StmtKind::Assign { place, value } => {
                let value = self.eval_expr(value, scope)?;
                self.assign_place(place, value, scope)?;
            }
            StmtKind::Compound { place, op, value } => {
                let current = self.read_place(place, scope)?;
                let rhs = self.eval_expr(value, scope)?;
                let updated = apply_binary(*op, &current, &rhs)?;
                self.assign_place(place, updated, scope)?;
            }
            StmtKind::Step { place, delta } => {
                let current = self.read_place(place, scope)?.expect_number()?;
                self.assign_place(place, Value::Number(current + delta), scope)?;
            }
            StmtKind::Delete(place) => match place {
                Place::Name(name) => {
                    scope.remove(name)?;
                }
                Place::Member { object, name } => {
                    let object = self.eval_expr(object, scope)?;
                    object.expect_instance()?.scope().remove(name)?;
                }
            },
            StmtKind::Make(name) => scope.declare(name, Value::Null)?,
            StmtKind::Call { callee, args } => self.call_statement(callee, args, scope)?,
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                return Ok(ExecOutcome::Return(value));
            }
            StmtKind::If { branches } => return self.execute_if(branches, scope),
            StmtKind::While { condition, body } => {
                return self.execute_while(condition, body, scope)
            }
            StmtKind::For { count, body } => return self.execute_for(count, body, scope),
            StmtKind::Count {
                name,
                from,
                to,
                body,
            } => return self.execute_count(name, from, to, body, scope),
            StmtKind::Try { body, handler } => {
                return self.execute_try(body, handler.as_ref(), scope)
            }
            StmtKind::Thread { body } => self.spawn_thread(body, scope)?,
            StmtKind::Def { name, params, body } => {
                self.define_callable(name, params, body, scope)?
            }
            StmtKind::Class { name, parent, body } => {
                self.declare_class(name, parent.as_ref(), body, scope)?
            }
            StmtKind::Invalid(err) => return Err(err.clone()),
        }
        Ok(ExecOutcome::Normal)
    }

    fn read_place(&self, place: &Place, scope: &Arc<Scope>) -> Result<Value, ScriptError> {
        match place {
            Place::Name(name) => scope.lookup(name),
            Place::Member { object, name } => {
                let object = self.eval_expr(object, scope)?;
                object.expect_instance()?.get(name)
            }
        }
    }

    fn assign_place(
        &self,
        place: &Place,
        value: Value,
        scope: &Arc<Scope>,
    ) -> Result<(), ScriptError> {
        match place {
            Place::Name(name) => scope.assign(name, value),
            Place::Member { object, name } => {
                let object = self.eval_expr(object, scope)?;
                object.expect_instance()?.set(name, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::ErrorKind;

    fn run(source: &str) -> Result<Arc<Scope>, ScriptError> {
        let scope = Scope::root();
        Interpreter::new().run(source, &scope)?;
        Ok(scope)
    }

    #[test]
    fn test_step_and_compound() {
        let scope = run("x = 5; x++; x++; x--; y = 10; y -= 4; y *= 2; y %= 5").unwrap();
        assert_eq!(scope.lookup("x").unwrap(), Value::from(6));
        assert_eq!(scope.lookup("y").unwrap(), Value::from(2));
    }

    #[test]
    fn test_make_and_del() {
        let scope = run("make flag; gone = 1; del gone").unwrap();
        assert_eq!(scope.lookup("flag").unwrap(), Value::Null);
        assert!(!scope.contains("gone"));
    }

    #[test]
    fn test_del_missing_is_not_found() {
        let err = run("del ghost").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
    }

    #[test]
    fn test_invalid_statement_raises_when_reached() {
        let scope = Scope::root();
        let err = Interpreter::new()
            .run("a = 1\nb = 2\n1/0\nc = 3", &scope)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotAnInstruction { .. }));
        assert_eq!(err.line, Some(3));
        assert_eq!(scope.lookup("b").unwrap(), Value::from(2));
    }

    #[test]
    fn test_step_requires_number() {
        let err = run("s = \"a\"; s++").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_string_compound_concatenates() {
        let scope = run("s = \"ab\"; s += 1").unwrap();
        assert_eq!(scope.lookup("s").unwrap(), Value::from("ab1"));
    }
}
