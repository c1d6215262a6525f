//! Per-line parser state
//!
//! [`NestState`] is everything the combinator carries across token calls:
//! the host mode's opaque state, the active sub-mode, the mask stack, the
//! sub-mode stack, pending matches, and the parser-step discriminant that
//! selects the next step function. The whole value is cloned by the
//! editor after every line, so each field is either plain data or clones
//! through the owning mode's state copier.
//!
//! The parser step is a tagged discriminant dispatched by one `step`
//! function, never a function value stored on the state: this keeps the
//! state copyable and rules out closure capture across lines.

use crate::nest::config::Config;
use crate::nest::electric::ElectricRule;
use crate::nest::mode::{Mode, ModeState};
use crate::nest::search::MatchRecord;
use std::fmt;
use std::sync::Arc;

/// Which step function runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStep {
    /// Search for the next sub-mode entry from the cursor.
    TopEntry,
    /// Host tokenizes the retracted region before a found open delimiter.
    UntilOpen,
    /// Activate the pre-computed entry in `next_entry`.
    StartSub,
    /// The innermost active mode tokenizes to the end of the line.
    UntilEol,
    /// A line begins with a sub-mode still active.
    SubAtSol,
    /// Re-evaluate the active sub-mode: inner entries, masks, close.
    SubContinuation,
    /// Close delimiter at the cursor: emit it, then finish the sub-mode.
    FinalizeDirect,
    /// Inner tokens up to a retracted close delimiter, then `DelimClose`.
    FinalizeToDelim,
    /// Inner tokens up to a null-width close, then finish the sub-mode.
    FinalizeToNull,
    /// Emit the open delimiter token.
    DelimOpen,
    /// Emit the close delimiter token and finish the sub-mode.
    DelimClose,
    /// Activate the pre-computed mask entry in `next_entry`.
    MaskEntry,
    /// A line begins inside a mask: replay the close search from column 0.
    MaskAtSol,
    /// Masked text to the end of the line, close not on this line.
    MaskUntilEol,
    /// Arbitrate nested mask opens against the found mask close.
    MaskContinuation,
    /// Masked text up to the retracted mask close, then back to the host.
    FinalizeMaskToHost,
    /// Delegate to a nested nesting sub-mode until it settles.
    UntilSubInnerClose,
}

/// Two-valued indirection for delegated tokenization calls: the blank-line
/// swallow advances one position and styles nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenGetter {
    Default,
    BlankLineSwallow,
}

/// How a pre-computed entry will be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Sub,
    Mask,
}

/// A pre-computed sub-mode or mask entry awaiting execution.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub matched: MatchRecord,
    pub kind: EntryKind,
}

/// One element of the sub-mode stack.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub config: Arc<Config>,
    /// Snapshot of the sub-mode's own state at entry.
    pub entry_state: Box<dyn ModeState>,
    pub start_match: MatchRecord,
    pub end_match: Option<MatchRecord>,
}

/// Where control returns when the mask stack empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskReturn {
    /// The mask opened at the host level: back to the top parser.
    Host,
    /// The mask opened inside a sub-mode: back to its continuation.
    Sub,
}

/// One element of the mask stack. Masks never reuse the sub-mode fields.
#[derive(Debug, Clone)]
pub struct MaskFrame {
    pub config: Arc<Config>,
    pub return_to: MaskReturn,
}

/// The active sub-mode: its configuration, mode object, and running state.
#[derive(Clone)]
pub struct ActiveSub {
    pub config: Arc<Config>,
    pub mode: Arc<dyn Mode>,
    pub state: Box<dyn ModeState>,
    /// Helper mode instance for the tokenize-with delimiter variant.
    pub delim_mode: Option<(Arc<dyn Mode>, Box<dyn ModeState>)>,
}

impl fmt::Debug for ActiveSub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSub")
            .field("mode", &self.mode.name())
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

/// The per-line, copyable state of a nesting tokenizer.
#[derive(Debug, Clone)]
pub struct NestState {
    /// The host mode's opaque tokenizer state.
    pub host_state: Box<dyn ModeState>,
    /// The active sub-mode, if any.
    pub sub: Option<ActiveSub>,
    /// Which step function runs next.
    pub parser: ParserStep,
    /// Active mask nesting.
    pub masks: Vec<MaskFrame>,
    /// Configurations valid for the next effective open-search attempts.
    pub suffixes: Option<Vec<Arc<Config>>>,
    /// Transient: a pre-computed entry awaiting execution.
    pub next_entry: Option<PendingEntry>,
    /// Transient: a pre-computed close delimiter.
    pub pending_end: Option<MatchRecord>,
    /// Backup of the true line while the stream's visible end is
    /// retracted.
    pub original_line: Option<String>,
    /// Open non-mask sub-modes below the host.
    pub stack: Vec<StackFrame>,
    /// Depth of this instance within a chain of nesting tokenizers.
    pub nest_level: u32,
    pub token_getter: TokenGetter,
    /// Transient: cursor for the next continuation search, when it differs
    /// from the stream position (set when returning from a mask).
    pub search_from: Option<usize>,
    /// The indent context this state was started with.
    pub indent: Option<usize>,
    /// Active electric delimiter rule, if one is registered.
    pub electric: Option<ElectricRule>,
}

impl NestState {
    pub fn new(host_state: Box<dyn ModeState>, indent: Option<usize>) -> NestState {
        NestState {
            host_state,
            sub: None,
            parser: ParserStep::TopEntry,
            masks: Vec::new(),
            suffixes: None,
            next_entry: None,
            pending_end: None,
            original_line: None,
            stack: Vec::new(),
            nest_level: 0,
            token_getter: TokenGetter::Default,
            search_from: None,
            indent,
            electric: None,
        }
    }

    /// True when nothing below the host is active: no sub-mode, no masks,
    /// and the parser is back at the top entry search. An enclosing
    /// nesting tokenizer polls this to know the inner one has settled.
    pub fn settled(&self) -> bool {
        self.sub.is_none() && self.masks.is_empty() && self.parser == ParserStep::TopEntry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nest::modes::plain::PlainMode;
    use crate::nest::mode::Mode;

    #[test]
    fn test_new_state_is_settled() {
        let host = PlainMode::new();
        let state = NestState::new(host.start_state(None), None);
        assert!(state.settled());
        assert_eq!(state.parser, ParserStep::TopEntry);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let host = PlainMode::new();
        let mut state = NestState::new(host.start_state(None), Some(4));
        let copy = state.clone();
        state.parser = ParserStep::UntilEol;
        state.nest_level = 2;
        assert_eq!(copy.parser, ParserStep::TopEntry);
        assert_eq!(copy.nest_level, 0);
        assert_eq!(copy.indent, Some(4));
    }
}
