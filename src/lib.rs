//! # nestlex
//!
//! A nesting tokenizer combinator for incremental syntax highlighting.
//!
//! Given a *host mode* (a line-at-a-time tokenizer) and an ordered set of
//! sub-mode configurations, [`nest::nesting::NestingMode`] produces a new
//! tokenizer that transparently switches between the host and nested
//! sub-modes based on configurable open/close delimiter patterns. Nesting
//! is recursive, supports non-exiting *mask* regions (string literals,
//! comments, escapes), and *suffix* configurations activated once after a
//! sub-mode closes. All state is line-granular and copyable, so the
//! surrounding editor can cache it per line.

pub mod nest;

pub use nest::config::{ConfigSpec, PatternSource};
pub use nest::mode::{Mode, ModeRegistry, ModeSpec};
pub use nest::nesting::NestingMode;
