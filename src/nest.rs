//! Nesting tokenizer
//!
//! This module implements the nesting state machine: delimiter search and
//! priority arbitration, the sub-mode lifecycle (enter, tokenize, resume
//! across newlines, exit), the mask sub-machine, the suffix mechanism, and
//! the line-granular copyable state that makes tokenization cacheable by
//! the embedding editor.
//!
//! Structure:
//!     Configurations are declared with [`config::ConfigSpec`] and compiled
//! once into immutable [`config::Config`] values. The compiled graph is
//! shared by all per-line [`state::NestState`] values, which carry only the
//! mutable tokenizer position: the active sub-mode, the mask stack, pending
//! matches and the parser-step discriminant.
//!
//! The per-line flow is:
//! 1. The editor hands `(stream, state)` to [`nesting::NestingMode::token`]
//! 2. The step dispatcher in [`machine`] consumes characters and returns a
//!    style string
//! 3. Between tokens the parser-step discriminant changes to reflect phase
//!    changes (delimiter seen, sub-mode entered, sub-mode exited)
//! 4. At end of line the editor copies the state and continues on the next
//!    line
//!
//! Delimiter Handling
//!
//!     Delimiter searches never mutate the line. When a delegated mode must
//!     stop at a known delimiter, the stream's visible line end is retracted
//!     and restored before the editor next observes the state. The four
//!     delimiter tokenization variants (static, separate, tokenize-with,
//!     include) share one sub-parser state machine and differ only in how
//!     delimiter text is surfaced as tokens.

pub mod common;
pub mod config;
pub mod electric;
pub mod machine;
pub mod mode;
pub mod modes;
pub mod nesting;
pub mod pattern;
pub mod search;
pub mod state;
pub mod stream;
pub mod testing;

pub use common::{ConfigError, IndentResult};
pub use config::{Config, ConfigSpec};
pub use mode::{EditorContext, Mode, ModeMeta, ModeRegistry, ModeSpec};
pub use nesting::NestingMode;
pub use pattern::Pattern;
pub use stream::LineStream;
