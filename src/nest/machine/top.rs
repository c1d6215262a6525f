//! Top parser steps
//!
//! The host-level half of the state machine: search for the next sub-mode
//! entry, tokenize host text up to a found delimiter, and activate the
//! entry. Suffix configurations published by a closing sub-mode are
//! searched with elevated priority and are valid for exactly one open
//! search on a non-blank line.

use crate::nest::common::ConfigError;
use crate::nest::electric::{configure_electric, DelimKind};
use crate::nest::machine::{host_token, StepOutcome};
use crate::nest::mode::state_mut;
use crate::nest::nesting::NestingMode;
use crate::nest::config::{Config, DelimVariant};
use crate::nest::search::MatchRecord;
use crate::nest::state::{
    ActiveSub, EntryKind, MaskFrame, MaskReturn, NestState, ParserStep, PendingEntry, StackFrame,
};
use crate::nest::stream::LineStream;

/// Search for the next sub-mode entry from the cursor.
pub(crate) fn top_entry(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let found = nesting.peek_open(stream.text(), stream.pos(), state);
    // Suffixes are consumed by a matching entry or cleared by this search.
    state.suffixes = None;
    match found {
        Some(matched) if matched.index == 0 => {
            let kind = entry_kind_of(&matched);
            state.next_entry = Some(PendingEntry { matched, kind });
            state.parser = ParserStep::StartSub;
        }
        Some(matched) => {
            state.original_line = Some(stream.truncate(matched.start));
            let kind = entry_kind_of(&matched);
            state.next_entry = Some(PendingEntry { matched, kind });
            state.parser = ParserStep::UntilOpen;
        }
        None => {
            state.parser = ParserStep::UntilEol;
        }
    }
    Ok(StepOutcome::Continue)
}

fn entry_kind_of(matched: &MatchRecord) -> EntryKind {
    if matched.config.mask {
        EntryKind::Mask
    } else {
        EntryKind::Sub
    }
}

/// Host tokenizes the retracted region before a found open delimiter.
pub(crate) fn until_open(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    if stream.at_eol() {
        restore_for_entry(stream, state);
        return Ok(StepOutcome::Continue);
    }
    let style = host_token(nesting, stream, state)?;
    if stream.at_eol() {
        restore_for_entry(stream, state);
    }
    Ok(StepOutcome::Token(style))
}

fn restore_for_entry(stream: &mut LineStream, state: &mut NestState) {
    let original = state
        .original_line
        .take()
        .expect("until-open runs under a retracted line");
    stream.restore(original);
    state.parser = ParserStep::StartSub;
}

/// Activate the pre-computed entry: either push a mask frame or enter the
/// sub-mode proper.
pub(crate) fn start_sub(
    nesting: &NestingMode,
    _stream: &mut LineStream,
    state: &mut NestState,
) -> Result<StepOutcome, ConfigError> {
    let entry = state
        .next_entry
        .take()
        .expect("start-sub requires a pre-computed entry");
    let matched = entry.matched.at_cursor();
    let config = Config::start_config(&matched.config, &matched, nesting.context())?;

    if config.mask {
        state.masks.push(MaskFrame {
            config,
            return_to: MaskReturn::Host,
        });
        state.next_entry = Some(PendingEntry {
            matched,
            kind: EntryKind::Mask,
        });
        state.parser = ParserStep::MaskEntry;
        return Ok(StepOutcome::Continue);
    }

    let mode = config.mode.clone().ok_or(ConfigError::MissingMode)?;
    let outer_indent = state.indent.unwrap_or(0);
    let indent = config
        .entry_indent(outer_indent, &matched, state)
        .or(state.indent);
    let mut sub_state = mode.start_state(indent);
    if let Some(inner) = state_mut::<NestState>(sub_state.as_mut()) {
        inner.nest_level = state.nest_level + 1;
    }

    let delim_mode = match &config.variant {
        DelimVariant::TokenizeWith(spec) => {
            let helper = nesting.context().registry.get_mode(spec)?;
            let helper_state = helper.start_state(None);
            Some((helper, helper_state))
        }
        _ => None,
    };

    state.stack.push(StackFrame {
        config: config.clone(),
        entry_state: sub_state.clone(),
        start_match: matched.clone(),
        end_match: None,
    });
    state.sub = Some(ActiveSub {
        config: config.clone(),
        mode,
        state: sub_state,
        delim_mode,
    });

    if config.variant == DelimVariant::Include {
        // Delimiter text flows through the sub-mode as ordinary content;
        // the close search still starts past it.
        if let Some(electric) = &config.electric {
            configure_electric(state, electric, config.close.as_ref(), DelimKind::Open, &matched);
        }
        state.search_from = Some(matched.end());
        state.parser = ParserStep::SubContinuation;
    } else {
        state.next_entry = Some(PendingEntry {
            matched,
            kind: EntryKind::Sub,
        });
        state.parser = ParserStep::DelimOpen;
    }
    Ok(StepOutcome::Continue)
}
