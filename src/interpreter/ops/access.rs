//! Indexing and member access

use crate::interpreter::errors::{ErrorKind, ScriptError};
use crate::memory::value::Value;

/// `target[index]` on a list or string; the index is truncated toward zero.
pub fn index_value(target: &Value, index: &Value) -> Result<Value, ScriptError> {
    let position = index.expect_number()?.trunc();
    let len = match target {
        Value::List(items) => items.len(),
        Value::String(text) => text.chars().count(),
        other => return Err(ScriptError::type_mismatch("List or String", other.type_name())),
    };
    if !(0.0..len as f64).contains(&position) {
        return Err(ErrorKind::Index {
            index: position as i64,
            len,
        }
        .into());
    }
    let position = position as usize;
    let element = match target {
        Value::List(items) => items.get(position).cloned(),
        Value::String(text) => text.chars().nth(position).map(|c| Value::String(c.to_string())),
        _ => None,
    };
    element.ok_or_else(|| {
        ErrorKind::Index {
            index: position as i64,
            len,
        }
        .into()
    })
}

/// `object.name` on an instance.
pub fn member_value(object: &Value, name: &str) -> Result<Value, ScriptError> {
    object.expect_instance()?.get(name)
}
