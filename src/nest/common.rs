//! Shared primitives for the nesting tokenizer
//!
//! This module contains the error taxonomy and the small value types used
//! across configuration compilation and the parser machine.

use std::fmt;

/// Errors raised while compiling a configuration or entering a sub-mode.
///
/// All configuration errors are unrecoverable for the configuration that
/// produced them: the compiled config is rejected, or (for dynamic `start`
/// overrides) the entry fails and the embedder must handle the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration was declared without an open delimiter.
    MissingOpen,
    /// A non-mask configuration was declared without a mode.
    MissingMode,
    /// A mode specification could not be resolved against the registry.
    UnknownMode(String),
    /// A delimiter pattern failed to compile.
    BadPattern { pattern: String, message: String },
    /// An open delimiter can match zero characters. Without
    /// `parse_delimiters` the parser could never make progress past it.
    ZeroWidthOpen(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingOpen => write!(f, "configuration has no open delimiter"),
            ConfigError::MissingMode => write!(f, "configuration has no mode"),
            ConfigError::UnknownMode(name) => write!(f, "unknown mode: {}", name),
            ConfigError::BadPattern { pattern, message } => {
                write!(f, "bad delimiter pattern {:?}: {}", pattern, message)
            }
            ConfigError::ZeroWidthOpen(pattern) => {
                write!(f, "open delimiter {:?} can match zero characters", pattern)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result of an indent query.
///
/// `Pass` is the sentinel meaning "defer to the outer scope"; the embedder
/// falls back to whatever indentation it would use without this mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentResult {
    /// Indent to this many units.
    Units(usize),
    /// Defer to the outer indent.
    Pass,
}

/// Join two optional style class lists with a single space.
///
/// Styles are space-separated CSS-class-like strings; `None` means the
/// token carries no style at all.
pub fn combine_styles(first: Option<&str>, second: Option<&str>) -> Option<String> {
    match (first, second) {
        (None, None) => None,
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (Some(a), Some(b)) => Some(format!("{} {}", a, b)),
    }
}
