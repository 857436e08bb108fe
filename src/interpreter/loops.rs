//! Loop statement execution (`while`, `for`, `count`).
//!
//! Every iteration runs its body in a fresh child of the enclosing scope.
//! Names the body inherits are shared slots, so `total = total + i` inside a
//! loop updates the outer `total`; names the body declares vanish with the
//! iteration. A `return` in the body ends the loop and propagates.

use std::sync::Arc;

use crate::interpreter::engine::{ExecOutcome, Interpreter};
use crate::interpreter::errors::ScriptError;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::{Block, Expr};

impl Interpreter {
    /// `while(cond){body}`: `cond` is evaluated in the enclosing scope before every iteration.
    pub(crate) fn execute_while(
        &self,
        condition: &Expr,
        body: &Block,
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        while self.eval_expr(condition, scope)?.expect_bool()? {
            let outcome = self.execute_block(body, &Scope::child(scope))?;
            if let ExecOutcome::Return(_) = outcome {
                return Ok(outcome);
            }
        }
        Ok(ExecOutcome::Normal)
    }

    /// `for(n){body}`: runs `body` `n` times (truncated), with no loop variable.
    pub(crate) fn execute_for(
        &self,
        count: &Expr,
        body: &Block,
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        let count = self.eval_expr(count, scope)?.expect_number()?;
        for _ in 0..iterations(0.0, count - 1.0) {
            let outcome = self.execute_block(body, &Scope::child(scope))?;
            if let ExecOutcome::Return(_) = outcome {
                return Ok(outcome);
            }
        }
        Ok(ExecOutcome::Normal)
    }

    /// `count(name, from, to){body}`: inclusive, step one, `name` bound per iteration.
    pub(crate) fn execute_count(
        &self,
        name: &str,
        from: &Expr,
        to: &Expr,
        body: &Block,
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        let from = self.eval_expr(from, scope)?.expect_number()?;
        let to = self.eval_expr(to, scope)?.expect_number()?;
        for step in 0..iterations(from, to) {
            let iteration = Scope::child(scope);
            iteration.declare(name, Value::Number(from + step as f64))?;
            let outcome = self.execute_block(body, &iteration)?;
            if let ExecOutcome::Return(_) = outcome {
                return Ok(outcome);
            }
        }
        Ok(ExecOutcome::Normal)
    }
}

/// Number of unit steps from `from` up to and including `to`.
///
/// Counted as an integer up front so large bounds, where `x + 1.0 == x`,
/// still terminate.
fn iterations(from: f64, to: f64) -> u64 {
    let span = (to - from).floor();
    if span.is_nan() || span < 0.0 {
        0
    } else {
        // float-to-int casts saturate
        (span as u64).saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::ErrorKind;
    use crate::memory::scope::Scope;
    use crate::memory::value::Value;

    fn lookup(source: &str, name: &str) -> Value {
        let scope = Scope::root();
        Interpreter::new().run(source, &scope).unwrap();
        scope.lookup(name).unwrap()
    }

    #[test]
    fn test_for_accumulates_outer_binding() {
        assert_eq!(lookup("count = 0; for(3){ count = count + 1; }", "count"), Value::from(3));
        assert_eq!(lookup("n = 0; for(2.9){ n++; }", "n"), Value::from(2));
        assert_eq!(lookup("n = 0; for(-1){ n++; }", "n"), Value::from(0));
    }

    #[test]
    fn test_while_checks_condition_each_time() {
        assert_eq!(lookup("i = 0; while(i < 5){ i++; }", "i"), Value::from(5));
    }

    #[test]
    fn test_count_is_inclusive() {
        assert_eq!(
            lookup("total = 0; count(i, 1, 4){ total += i; }", "total"),
            Value::from(10)
        );
        assert_eq!(
            lookup("total = 0; count(i, 3, 1){ total += i; }", "total"),
            Value::from(0)
        );
    }

    #[test]
    fn test_large_bounds_terminate() {
        // big + 1 == big in f64
        let big = "big = 100000000000000000; n = 0;";
        assert_eq!(
            lookup(&format!("{} count(i, big, big + 32){{ n++; }}", big), "n"),
            Value::from(33)
        );
        assert_eq!(
            lookup(&format!("{} count(i, big, big + 3){{ n++; }}", big), "n"),
            Value::from(1)
        );
    }

    #[test]
    fn test_loop_locals_do_not_leak() {
        let scope = Scope::root();
        Interpreter::new()
            .run("for(2){ inner = 1; }", &scope)
            .unwrap();
        assert!(!scope.contains("inner"));
    }

    #[test]
    fn test_return_leaves_loop() {
        let source = "def first_over(limit){ count(i, 1, 100){ if(i > limit){ return i; } } }";
        let scope = Scope::root();
        let interp = Interpreter::new();
        interp.run(source, &scope).unwrap();
        assert_eq!(interp.evaluate(&scope, "first_over(7)").unwrap(), Value::from(8));
    }

    #[test]
    fn test_condition_must_be_boolean() {
        let err = Interpreter::new()
            .run("while(1){ }", &Scope::root())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }
}
