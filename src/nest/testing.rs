//! Testing utilities
//!
//! # Tokenizer Testing Guidelines
//!
//! Tests drive the combinator through the same contract the embedding
//! editor uses, never through the step machine directly:
//!
//! 1. **[driver::tokenize_document]** plays the editor role: one stream
//!    per line, repeated `token` calls until end of line, `blank_line` for
//!    empty lines, and a `copy_state` between lines. If a behavior cannot
//!    be observed through this driver, an editor cannot observe it either.
//! 2. **Assert full token streams**, not counts. The `styled` and
//!    `merged` helpers reduce a token stream to `(text, style)` pairs so a
//!    whole line's expectation stays readable in one `assert_eq!`.
//!
//! The [`modes`] module provides deliberately simple modes (`FlatMode`,
//! `WordMode`) so expectations stay exact: scenario tests should prefer
//! them over the bundled `code` mode unless the test is about mask
//! synthesis.

pub mod driver;
pub mod factories;
pub mod modes;

pub use driver::{
    merged, styled, tokenize_document, tokenize_document_shared, tokenize_document_with_state,
    TokenRec,
};
pub use factories::{mk_flat, mk_nesting, mk_words, tok};
pub use modes::{FlatMode, WordMode};
