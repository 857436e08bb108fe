//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of values that cross
//! every boundary in the interpreter, including the one between scripts and
//! the host program.
//!
//! # Value Types
//!
//! - [`Value::Number`]: 64-bit float, the only numeric type
//! - [`Value::Boolean`]: `true` / `false`
//! - [`Value::String`]: immutable text
//! - [`Value::List`]: ordered sequence of values
//! - [`Value::Null`]: the value of `make name;`
//! - [`Value::Instance`]: handle to a constructed class object
//!
//! Values are immutable once produced. Reassignment rebinds a name; it never
//! mutates the old value. Instances are the exception in spirit only: the
//! handle is immutable, but the scope it points at holds live bindings.

use std::fmt;
use std::sync::Arc;

use crate::interpreter::classes::Class;
use crate::interpreter::errors::ScriptError;
use crate::memory::scope::Scope;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    List(Vec<Value>),
    #[default]
    Null,
    Instance(Instance),
}

/// The kind of a [`Value`], used for overload signatures.
///
/// [`ValueKind::Any`] never describes a value; it only appears in signatures
/// and accepts every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Boolean,
    String,
    List,
    Null,
    Instance,
    Any,
}

impl ValueKind {
    pub fn accepts(self, value: &Value) -> bool {
        self == ValueKind::Any || self == value.kind()
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "Number",
            ValueKind::Boolean => "Boolean",
            ValueKind::String => "String",
            ValueKind::List => "List",
            ValueKind::Null => "Null",
            ValueKind::Instance => "Instance",
            ValueKind::Any => "Any",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constructed class object: its member scope plus the class it came from
#[derive(Clone)]
pub struct Instance {
    scope: Arc<Scope>,
    class: Arc<Class>,
}

impl Instance {
    pub(crate) fn new(scope: Arc<Scope>, class: Arc<Class>) -> Self {
        Instance { scope, class }
    }

    /// The scope holding this instance's members
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    /// Read a member variable.
    pub fn get(&self, member: &str) -> Result<Value, ScriptError> {
        self.scope.lookup(member)
    }

    /// Assign a member variable, declaring it on the instance if absent.
    pub fn set(&self, member: &str, value: Value) -> Result<(), ScriptError> {
        self.scope.assign(member, value)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.class.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Null => ValueKind::Null,
            Value::Instance(_) => ValueKind::Instance,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Expect a number, failing with a type mismatch otherwise
    pub fn expect_number(&self) -> Result<f64, ScriptError> {
        self.as_number()
            .ok_or_else(|| ScriptError::type_mismatch("Number", self.type_name()))
    }

    /// Expect a boolean, failing with a type mismatch otherwise
    pub fn expect_bool(&self) -> Result<bool, ScriptError> {
        self.as_bool()
            .ok_or_else(|| ScriptError::type_mismatch("Boolean", self.type_name()))
    }

    /// Expect an instance, failing with a type mismatch otherwise
    pub fn expect_instance(&self) -> Result<&Instance, ScriptError> {
        self.as_instance()
            .ok_or_else(|| ScriptError::type_mismatch("Instance", self.type_name()))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Value::String(s) => write!(f, "\"{}\"", s)?,
                        other => write!(f, "{}", other)?,
                    }
                }
                f.write_str("]")
            }
            Value::Null => f.write_str("null"),
            Value::Instance(instance) => write!(f, "<{} instance>", instance.class_name()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn lists_quote_their_strings() {
        let list = Value::List(vec![1.into(), "a".into(), Value::Null]);
        assert_eq!(list.to_string(), "[1, \"a\", null]");
    }

    #[test]
    fn any_accepts_every_kind() {
        assert!(ValueKind::Any.accepts(&Value::Null));
        assert!(ValueKind::Number.accepts(&Value::Number(1.0)));
        assert!(!ValueKind::Number.accepts(&Value::from("1")));
    }

    #[test]
    fn expect_number_reports_kind() {
        let err = Value::Boolean(true).expect_number().unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch: expected Number, got Boolean"
        );
    }
}
