// Constants for the Gordian interpreter

/// Substrings that may not appear in a declared name.
pub const RESERVED_FRAGMENTS: &[&str] = &[
    "\"", "'", "=", ">", "<", "(", ")", "+", "-", "*", "/", "&&", "||",
];

/// Names that may not be declared at all.
pub const RESERVED_NAMES: &[&str] = &["true", "false"];

/// Name of the constructor overloads a class body declares.
pub const CONSTRUCTOR: &str = "construct";

/// Name of the parent-constructor callables installed during construction.
pub const SUPER: &str = "super";

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

pub const DEFAULT_THREAD_NAME: &str = "gordian-thread";

/// Stack reserved for each `thread{}` block.
pub const THREAD_STACK_SIZE: usize = 8 * 1024 * 1024;
