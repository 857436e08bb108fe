//! Runtime storage
//!
//! - [`value`]: the closed set of runtime values
//! - [`scope`]: binding environments with snapshot-at-creation inheritance

pub mod scope;
pub mod value;
