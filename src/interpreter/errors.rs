//! Script failure types
//!
//! [`ErrorKind`] is the taxonomy of everything a script can do wrong, from
//! unbalanced quotes to calling a constructor that does not exist.
//! [`ScriptError`] pairs a kind with the source line of the statement that
//! raised it. The innermost statement wins: once a line is stamped, enclosing
//! statements leave it alone.
//!
//! Every failure is recoverable from the host's point of view. A failure
//! unwinds to the nearest `try` block or, failing that, to the runner, which
//! reports it and aborts only the current run.

use thiserror::Error;

/// Kinds of script failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// Unbalanced quotes, braces, brackets or parentheses
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// Text that cannot be evaluated to a value
    #[error("'{text}' is not a value")]
    NotAValue { text: String },

    /// Text that is not a recognised statement form
    #[error("'{text}' is not an instruction")]
    NotAnInstruction { text: String },

    /// Lookup of an undeclared variable, callable or class
    #[error("'{name}' was not found")]
    NotFound { name: String },

    /// Declaration of a name containing reserved characters
    #[error("'{name}' is not a legal name")]
    IllegalName { name: String },

    #[error("no overload of '{name}' accepts ({args})")]
    NoMatchingOverload { name: String, args: String },

    #[error("no constructor of '{class}' accepts ({args})")]
    NoMatchingConstructor { class: String, args: String },

    /// A subclass constructor neither called `super(...)` nor had a zero-arg one to fall back on
    #[error("constructor of '{class}' never invoked super")]
    SuperNotInvoked { class: String },

    /// A value-returning callable reached the end of its body
    #[error("'{name}' finished without returning a value")]
    NoValueReturned { name: String },

    #[error("index {index} is out of range for length {len}")]
    Index { index: i64, len: usize },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Call depth exceeded the configured limit
    #[error("call depth exceeded the limit of {limit}")]
    RecursionLimit { limit: usize },

    /// A host callable reported failure
    #[error("native callable '{name}' failed: {message}")]
    Native { name: String, message: String },
}

/// A script failure, optionally tagged with its originating line
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", line_suffix(.line))]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub line: Option<usize>,
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

impl ScriptError {
    pub fn new(kind: ErrorKind) -> Self {
        ScriptError { kind, line: None }
    }

    /// Stamps `line` unless a more precise line is already recorded.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        ScriptError::new(ErrorKind::Syntax {
            message: message.into(),
        })
        .at_line(line)
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        ScriptError::new(ErrorKind::NotFound { name: name.into() })
    }

    pub fn not_a_value(text: impl Into<String>) -> Self {
        ScriptError::new(ErrorKind::NotAValue { text: text.into() })
    }

    pub fn not_an_instruction(text: impl Into<String>) -> Self {
        ScriptError::new(ErrorKind::NotAnInstruction { text: text.into() })
    }

    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ScriptError::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        })
    }

    /// Convenience for host callables reporting their own failures.
    pub fn native(name: impl Into<String>, message: impl Into<String>) -> Self {
        ScriptError::new(ErrorKind::Native {
            name: name.into(),
            message: message.into(),
        })
    }
}

impl From<ErrorKind> for ScriptError {
    fn from(kind: ErrorKind) -> Self {
        ScriptError::new(kind)
    }
}
