// Expression evaluation

use std::sync::Arc;

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::ScriptError;
use crate::interpreter::ops::access::{index_value, member_value};
use crate::interpreter::ops::unary::apply_unary;
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::Expr;

impl Interpreter {
    pub(crate) fn eval_expr(&self, expr: &Expr, scope: &Arc<Scope>) -> Result<Value, ScriptError> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
    }

    fn eval_expr_inner(&self, expr: &Expr, scope: &Arc<Scope>) -> Result<Value, ScriptError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::List(items) => Ok(Value::List(self.eval_args(items, scope)?)),
            Expr::Variable(name) => scope.lookup(name),
            Expr::Call { name, args } => {
                let args = self.eval_args(args, scope)?;
                self.call_returning(name, &args, scope)
            }
            Expr::Member { object, name } => {
                let object = self.eval_expr(object, scope)?;
                member_value(&object, name)
            }
            Expr::MethodCall { object, name, args } => {
                let object = self.eval_expr(object, scope)?;
                let instance = object.expect_instance()?;
                let args = self.eval_args(args, scope)?;
                self.call_returning(name, &args, instance.scope())
            }
            Expr::Index { target, index } => {
                let target = self.eval_expr(target, scope)?;
                let index = self.eval_expr(index, scope)?;
                index_value(&target, &index)
            }
            Expr::New { class, args } => {
                let args = self.eval_args(args, scope)?;
                Ok(Value::Instance(self.instantiate(scope, class, &args)?))
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                apply_unary(*op, &operand)
            }
            Expr::Binary { op, left, right } => self.evaluate_binary_op(*op, left, right, scope),
        }
    }

    pub(crate) fn eval_args(
        &self,
        args: &[Expr],
        scope: &Arc<Scope>,
    ) -> Result<Vec<Value>, ScriptError> {
        args.iter().map(|arg| self.eval_expr(arg, scope)).collect()
    }
}
