//! Binary operator evaluation

use std::cmp::Ordering;
use std::sync::Arc;

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::ScriptError;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, Expr};

fn operand_mismatch(op: BinOp, left: &Value, right: &Value) -> ScriptError {
    ScriptError::type_mismatch(
        format!("operands for '{}'", op.symbol()),
        format!("{} and {}", left.type_name(), right.type_name()),
    )
}

fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Option<Ordering>, ScriptError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => Err(operand_mismatch(op, left, right)),
    }
}

/// Apply `op` to two evaluated operands.
///
/// `&&` and `||` are accepted here too but do not short-circuit; expression
/// evaluation handles those before the right operand is evaluated.
pub fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, ScriptError> {
    use BinOp::*;

    let value = match op {
        And | Or => {
            let (a, b) = match (left, right) {
                (Value::Boolean(a), Value::Boolean(b)) => (*a, *b),
                _ => return Err(operand_mismatch(op, left, right)),
            };
            Value::Boolean(if op == And { a && b } else { a || b })
        }
        Eq => Value::Boolean(left == right),
        Ne => Value::Boolean(left != right),
        Lt | Le | Gt | Ge => {
            // NaN compares false against everything
            let ordering = compare(op, left, right)?;
            Value::Boolean(match ordering {
                None => false,
                Some(ordering) => match op {
                    Lt => ordering == Ordering::Less,
                    Le => ordering != Ordering::Greater,
                    Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
            })
        }
        Concat => Value::String(format!("{}{}", left, right)),
        Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", left, right))
            }
            (Value::List(a), Value::List(b)) => {
                Value::List(a.iter().chain(b.iter()).cloned().collect())
            }
            _ => return Err(operand_mismatch(op, left, right)),
        },
        Sub | Mul | Div | Mod => {
            let (a, b) = match (left, right) {
                (Value::Number(a), Value::Number(b)) => (*a, *b),
                _ => return Err(operand_mismatch(op, left, right)),
            };
            Value::Number(match op {
                Sub => a - b,
                Mul => a * b,
                Div => a / b,
                _ => a % b,
            })
        }
    };
    Ok(value)
}

impl Interpreter {
    pub(crate) fn evaluate_binary_op(
        &self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        scope: &Arc<Scope>,
    ) -> Result<Value, ScriptError> {
        let left = self.eval_expr(left, scope)?;
        match op {
            BinOp::And | BinOp::Or => {
                let lhs = left.expect_bool()?;
                if (op == BinOp::And && !lhs) || (op == BinOp::Or && lhs) {
                    return Ok(Value::Boolean(lhs));
                }
                let rhs = self.eval_expr(right, scope)?.expect_bool()?;
                Ok(Value::Boolean(rhs))
            }
            _ => {
                let right = self.eval_expr(right, scope)?;
                apply_binary(op, &left, &right)
            }
        }
    }
}
