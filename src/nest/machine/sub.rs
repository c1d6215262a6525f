//! Sub-parser steps
//!
//! The shared state machine for one active sub-mode. The four delimiter
//! tokenization variants run the same steps and differ only in how the
//! delimiter text is surfaced as tokens, dispatched on the configuration's
//! variant tag.
//!
//! The continuation step re-evaluates the active sub-mode in priority
//! order: a deeper nested tokenizer that has not settled, an inner entry
//! that outranks the pending close, a mask open that outranks the pending
//! close, and finally the close itself. Every retraction it performs is
//! restored before the editor next observes the state.

use crate::nest::common::{combine_styles, ConfigError};
use crate::nest::config::{Config, DelimVariant};
use crate::nest::electric::{configure_electric, DelimKind};
use crate::nest::machine::{delim_helper_token, host_token, sub_token, StepOutcome};
use crate::nest::mode::state_ref;
use crate::nest::nesting::NestingMode;
use crate::nest::search::{beats_close, search_close, search_open, MatchRecord};
use crate::nest::state::{EntryKind, MaskFrame, MaskReturn, NestState, ParserStep, PendingEntry};
use crate::nest::stream::LineStream;

/// The innermost active mode tokenizes to the end of the line.
pub(crate) fn until_eol(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let style = if state.sub.is_some() {
        sub_token(stream, state)?
    } else {
        host_token(nesting, stream, state)?
    };
    if stream.at_eol() {
        state.parser = if state.sub.is_some() {
            ParserStep::SubAtSol
        } else {
            ParserStep::TopEntry
        };
    }
    Ok(StepOutcome::Token(style))
}

/// A line begins with a sub-mode still active: replay the continuation
/// from column zero.
pub(crate) fn sub_at_sol(state: &mut NestState) -> StepOutcome {
    state.search_from = None;
    state.parser = ParserStep::SubContinuation;
    StepOutcome::Continue
}

/// Re-evaluate the active sub-mode at the current search cursor.
pub(crate) fn continuation(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let cursor = state.search_from.take().unwrap_or(stream.pos());
    let config = state
        .sub
        .as_ref()
        .expect("continuation requires an active sub-mode")
        .config
        .clone();
    let close = search_close(&config, stream.text(), cursor, stream.sol() && cursor == 0);

    // A nested nesting tokenizer gets first claim: while it is mid-region,
    // or when its next entry outranks our close, delegate to it.
    let delegate = {
        let sub = state.sub.as_ref().expect("active sub-mode");
        match sub.mode.as_nesting() {
            None => false,
            Some(inner) => {
                let inner_state = state_ref::<NestState>(sub.state.as_ref())
                    .expect("nesting sub-mode carries a NestState");
                if !inner_state.settled() {
                    true
                } else {
                    match inner.peek_open(stream.text(), cursor, inner_state) {
                        Some(open) => match &close {
                            None => true,
                            Some(end) => beats_close(&open, end),
                        },
                        None => false,
                    }
                }
            }
        }
    };
    if delegate {
        state.pending_end = None;
        let style = sub_token(stream, state)?;
        state.parser = if stream.at_eol() {
            ParserStep::SubAtSol
        } else {
            ParserStep::UntilSubInnerClose
        };
        return Ok(StepOutcome::Token(style));
    }

    // Masks of the active sub-mode.
    if !config.masks.is_empty() {
        if let Some(open) = search_open(stream.text(), cursor, &config.masks) {
            let wins = match &close {
                None => true,
                Some(end) => beats_close(&open, end),
            };
            if wins {
                let entered = Config::start_config(&open.config, &open, nesting.context())?;
                state.masks.push(MaskFrame {
                    config: entered,
                    return_to: MaskReturn::Sub,
                });
                state.next_entry = Some(PendingEntry {
                    matched: open,
                    kind: EntryKind::Mask,
                });
                state.pending_end = None;
                state.parser = ParserStep::MaskEntry;
                return Ok(StepOutcome::Continue);
            }
        }
    }

    match close {
        Some(end) => {
            let at_pos = end.start == stream.pos();
            match (at_pos, end.is_empty()) {
                (true, true) => {
                    finally(state, Some(end));
                }
                (true, false) => {
                    state.original_line = Some(stream.truncate(end.end()));
                    state.pending_end = Some(end);
                    state.parser = ParserStep::FinalizeDirect;
                }
                (false, true) => {
                    state.original_line = Some(stream.truncate(end.start));
                    state.pending_end = Some(end);
                    state.parser = ParserStep::FinalizeToNull;
                }
                (false, false) => {
                    state.original_line = Some(stream.truncate(end.start));
                    state.pending_end = Some(end);
                    state.parser = ParserStep::FinalizeToDelim;
                }
            }
        }
        None => {
            state.pending_end = None;
            state.parser = ParserStep::UntilEol;
        }
    }
    Ok(StepOutcome::Continue)
}

/// Delegate to a nested nesting sub-mode until it settles.
pub(crate) fn until_sub_inner_close(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let settled = {
        let sub = state.sub.as_ref().expect("delegation requires an active sub-mode");
        match sub.mode.as_nesting() {
            None => true,
            Some(_) => state_ref::<NestState>(sub.state.as_ref())
                .expect("nesting sub-mode carries a NestState")
                .settled(),
        }
    };
    if settled {
        state.parser = ParserStep::SubContinuation;
        return Ok(StepOutcome::Continue);
    }
    let style = sub_token(stream, state)?;
    if stream.at_eol() {
        state.parser = ParserStep::SubAtSol;
    }
    Ok(StepOutcome::Token(style))
}

/// Emit the open delimiter token per the configuration's variant.
pub(crate) fn delim_open(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let entry = state
        .next_entry
        .take()
        .expect("delim-open requires a pre-computed entry");
    let matched = entry.matched;
    let (variant, open_style, electric, close) = {
        let config = &state.sub.as_ref().expect("active sub-mode").config;
        (
            config.variant.clone(),
            config.delim_open_style.clone(),
            config.electric.clone(),
            config.close.clone(),
        )
    };

    let style = match variant {
        DelimVariant::Static => {
            stream.advance(matched.len());
            open_style
        }
        DelimVariant::Separate => {
            let original = stream.truncate(matched.end());
            state.original_line = Some(original);
            let inner = sub_token(stream, state)?;
            if !stream.at_eol() {
                stream.skip_to_end();
            }
            let original = state.original_line.take().expect("retracted delimiter region");
            stream.restore(original);
            combine_styles(open_style.as_deref(), inner.as_deref())
        }
        DelimVariant::TokenizeWith(_) => {
            let original = stream.truncate(matched.end());
            state.original_line = Some(original);
            let inner = delim_helper_token(stream, state)?;
            if !stream.at_eol() {
                stream.skip_to_end();
            }
            let original = state.original_line.take().expect("retracted delimiter region");
            stream.restore(original);
            combine_styles(open_style.as_deref(), inner.as_deref())
        }
        DelimVariant::Include => unreachable!("include variant enters the sub-mode directly"),
    };

    if let Some(electric) = &electric {
        configure_electric(state, electric, close.as_ref(), DelimKind::Open, &matched);
    }
    if stream.at_eol() {
        state.parser = ParserStep::SubAtSol;
    } else {
        state.search_from = Some(stream.pos());
        state.parser = ParserStep::SubContinuation;
    }
    Ok(StepOutcome::Token(style))
}

/// Close delimiter at the cursor: emit it and finish the sub-mode.
pub(crate) fn finalize_direct(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    Ok(StepOutcome::Token(emit_close(stream, state)?))
}

/// Emit the close delimiter token and finish the sub-mode.
pub(crate) fn delim_close(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    Ok(StepOutcome::Token(emit_close(stream, state)?))
}

fn emit_close(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    let end = state
        .pending_end
        .take()
        .expect("close emission requires a pre-computed close");
    let (variant, close_style, electric, close) = {
        let config = &state.sub.as_ref().expect("active sub-mode").config;
        (
            config.variant.clone(),
            config.delim_close_style.clone(),
            config.electric.clone(),
            config.close.clone(),
        )
    };

    let style = match variant {
        DelimVariant::Static => {
            stream.advance(end.len());
            close_style
        }
        DelimVariant::Separate => {
            let inner = sub_token(stream, state)?;
            if !stream.at_eol() {
                stream.skip_to_end();
            }
            combine_styles(close_style.as_deref(), inner.as_deref())
        }
        DelimVariant::TokenizeWith(_) => {
            let inner = delim_helper_token(stream, state)?;
            if !stream.at_eol() {
                stream.skip_to_end();
            }
            combine_styles(close_style.as_deref(), inner.as_deref())
        }
        DelimVariant::Include => {
            let inner = sub_token(stream, state)?;
            if !stream.at_eol() {
                stream.skip_to_end();
            }
            inner
        }
    };

    let original = state
        .original_line
        .take()
        .expect("close emission runs under a retracted line");
    stream.restore(original);
    if let Some(electric) = &electric {
        configure_electric(state, electric, close.as_ref(), DelimKind::Close, &end);
    }
    finally(state, Some(end));
    Ok(style)
}

/// Inner tokens up to a retracted close delimiter, then the close itself.
pub(crate) fn finalize_to_delim(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    if stream.at_eol() {
        extend_to_delim_close(stream, state);
        return Ok(StepOutcome::Continue);
    }
    let style = sub_token(stream, state)?;
    if stream.at_eol() {
        extend_to_delim_close(stream, state);
    }
    Ok(StepOutcome::Token(style))
}

fn extend_to_delim_close(stream: &mut LineStream, state: &mut NestState) {
    let end = state
        .pending_end
        .as_ref()
        .expect("finalize-to-delim requires a pre-computed close")
        .clone();
    let original = state
        .original_line
        .take()
        .expect("finalize-to-delim runs under a retracted line");
    stream.restore(original);
    state.original_line = Some(stream.truncate(end.end()));
    state.parser = ParserStep::DelimClose;
}

/// Inner tokens up to a null-width close, then finish the sub-mode.
pub(crate) fn finalize_to_null(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    if stream.at_eol() {
        finish_null(stream, state);
        return Ok(StepOutcome::Continue);
    }
    let style = sub_token(stream, state)?;
    if stream.at_eol() {
        finish_null(stream, state);
    }
    Ok(StepOutcome::Token(style))
}

fn finish_null(stream: &mut LineStream, state: &mut NestState) {
    let end = state.pending_end.take();
    let original = state
        .original_line
        .take()
        .expect("finalize-to-null runs under a retracted line");
    stream.restore(original);
    finally(state, end);
}

/// Pop the sub-mode: record the close on its stack frame, publish its
/// suffixes, and return control to the top parser. Emits no token; an
/// enclosing nesting tokenizer observes the exit by polling `settled`.
pub(crate) fn finally(state: &mut NestState, end: Option<MatchRecord>) {
    let sub = state
        .sub
        .take()
        .expect("finally requires an active sub-mode");
    if let Some(frame) = state.stack.last_mut() {
        frame.end_match = end;
    }
    state.stack.pop();
    if !sub.config.suffixes.is_empty() {
        state.suffixes = Some(sub.config.suffixes.clone());
    }
    state.pending_end = None;
    state.next_entry = None;
    state.search_from = None;
    state.electric = None;
    state.parser = ParserStep::TopEntry;
}
