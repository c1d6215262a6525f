//! Mask sub-machine
//!
//! A mask is a non-exiting region: while it is active, neither the host's
//! sub-mode entries nor the containing sub-mode's close can fire until the
//! mask's own close has closed every mask-stack frame. Nested masks (an
//! escape sequence inside a string) recurse through the same steps.
//!
//! The close search walks the line without consuming anything; the masked
//! text itself is tokenized by whatever mode was active when the mask
//! opened (the host at top level, the sub-mode inside a sub). A host-level
//! mask that closes mid-line retracts the stream to the close end so the
//! host can tokenize the region without the delimiter search firing
//! inside it.

use crate::nest::common::{combine_styles, ConfigError};
use crate::nest::config::Config;
use crate::nest::machine::{host_token, sub_token, StepOutcome};
use crate::nest::nesting::NestingMode;
use crate::nest::search::{beats_close, search_close, search_open};
use crate::nest::state::{EntryKind, MaskFrame, MaskReturn, NestState, ParserStep, PendingEntry};
use crate::nest::stream::LineStream;

/// Activate the pre-computed mask entry: search for its close starting
/// just past the open delimiter.
pub(crate) fn mask_entry(stream: &mut LineStream, state: &mut NestState) -> StepOutcome {
    let entry = state
        .next_entry
        .take()
        .expect("mask entry requires a pre-computed open");
    check_end(stream, state, entry.matched.end());
    StepOutcome::Continue
}

/// A line begins inside a mask: replay the close search from column zero.
pub(crate) fn mask_at_sol(stream: &mut LineStream, state: &mut NestState) -> StepOutcome {
    check_end(stream, state, 0);
    StepOutcome::Continue
}

/// Search the active mask's close from `cursor` and route accordingly.
fn check_end(stream: &mut LineStream, state: &mut NestState, cursor: usize) {
    let active = state
        .masks
        .last()
        .expect("mask close search requires a mask frame")
        .config
        .clone();
    let sol = stream.sol() && cursor == 0;
    match search_close(&active, stream.text(), cursor, sol) {
        None => {
            state.search_from = None;
            state.parser = ParserStep::MaskUntilEol;
        }
        Some(end) => {
            state.pending_end = Some(end);
            state.search_from = Some(cursor);
            state.parser = ParserStep::MaskContinuation;
        }
    }
}

/// Arbitrate nested mask opens against the found close; pop frames as
/// their closes turn out to be real.
pub(crate) fn mask_continuation(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let cursor = state.search_from.take().unwrap_or_else(|| stream.pos());
    let end = state
        .pending_end
        .take()
        .expect("mask continuation requires a pre-computed close");
    let active = state
        .masks
        .last()
        .expect("mask continuation requires a mask frame")
        .clone();

    if !active.config.masks.is_empty() {
        if let Some(open) = search_open(stream.text(), cursor, &active.config.masks) {
            if beats_close(&open, &end) {
                let entered = Config::start_config(&open.config, &open, nesting.context())?;
                state.masks.push(MaskFrame {
                    config: entered,
                    return_to: active.return_to,
                });
                state.next_entry = Some(PendingEntry {
                    matched: open,
                    kind: EntryKind::Mask,
                });
                state.parser = ParserStep::MaskEntry;
                return Ok(StepOutcome::Continue);
            }
        }
    }

    if state.masks.len() > 1 {
        state.masks.pop();
        check_end(stream, state, end.end());
        return Ok(StepOutcome::Continue);
    }

    match active.return_to {
        MaskReturn::Host => {
            // Keep the frame until the region is emitted so its styling
            // still applies; the finalize step pops it.
            state.original_line = Some(stream.truncate(end.end()));
            state.parser = ParserStep::FinalizeMaskToHost;
        }
        MaskReturn::Sub => {
            state.masks.pop();
            state.search_from = Some(end.end());
            state.parser = ParserStep::SubContinuation;
        }
    }
    Ok(StepOutcome::Continue)
}

/// Masked text to the end of the line; the close is on a later line.
pub(crate) fn mask_until_eol(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let style = masked_token(nesting, stream, state)?;
    if stream.at_eol() {
        state.parser = ParserStep::MaskAtSol;
    }
    Ok(StepOutcome::Token(style))
}

/// Masked text up to the retracted close end, then back to the host.
pub(crate) fn finalize_mask_to_host(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    if stream.at_eol() {
        finish_mask(stream, state);
        return Ok(StepOutcome::Continue);
    }
    let style = masked_token(nesting, stream, state)?;
    if stream.at_eol() {
        finish_mask(stream, state);
    }
    Ok(StepOutcome::Token(style))
}

fn finish_mask(stream: &mut LineStream, state: &mut NestState) {
    state.masks.pop();
    let original = state
        .original_line
        .take()
        .expect("mask finalize runs under a retracted line");
    stream.restore(original);
    state.parser = ParserStep::TopEntry;
}

/// One token of masked text, emitted by the mode that was active when the
/// mask opened, with the active mask frame's inner style layered on.
fn masked_token(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    let (route, mask_style) = {
        let frame = state
            .masks
            .last()
            .expect("masked token requires a mask frame");
        (frame.return_to, frame.config.inner_style.clone())
    };
    let style = match route {
        MaskReturn::Host => host_token(nesting, stream, state)?,
        MaskReturn::Sub => sub_token(stream, state)?,
    };
    Ok(combine_styles(mask_style.as_deref(), style.as_deref()))
}
