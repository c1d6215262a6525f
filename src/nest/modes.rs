//! Bundled modes
//!
//! Small concrete tokenizers so the combinator is usable and testable
//! without an embedder. Real embedders supply their own language modes
//! through the registry; these two cover the common host roles.

pub mod code;
pub mod plain;

pub use code::CodeMode;
pub use plain::PlainMode;
