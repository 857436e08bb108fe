//! Unary operator evaluation

use crate::interpreter::errors::ScriptError;
use crate::memory::value::Value;
use crate::parser::ast::UnOp;

pub fn apply_unary(op: UnOp, operand: &Value) -> Result<Value, ScriptError> {
    match op {
        UnOp::Neg => Ok(Value::Number(-operand.expect_number()?)),
        UnOp::Plus => Ok(Value::Number(operand.expect_number()?)),
        UnOp::Not => Ok(Value::Boolean(!operand.expect_bool()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary() {
        assert_eq!(apply_unary(UnOp::Neg, &Value::from(3)).unwrap(), Value::from(-3));
        assert_eq!(apply_unary(UnOp::Not, &Value::from(false)).unwrap(), Value::from(true));
        assert!(apply_unary(UnOp::Neg, &Value::from("x")).is_err());
        assert!(apply_unary(UnOp::Not, &Value::from(0)).is_err());
    }
}
