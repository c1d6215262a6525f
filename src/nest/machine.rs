//! Step dispatcher
//!
//! One `step` function dispatches on the parser-step discriminant stored
//! in the state. Decision steps mutate the state and continue; consuming
//! steps return the token's style. The dispatcher loops until a token is
//! produced, with a backstop that force-consumes one character so a
//! misbehaving configuration can never stall the editor.

pub mod mask;
pub mod sub;
pub mod top;

use crate::nest::common::{combine_styles, ConfigError};
use crate::nest::nesting::NestingMode;
use crate::nest::state::{NestState, ParserStep, TokenGetter};
use crate::nest::stream::LineStream;

/// Outcome of one step function.
pub(crate) enum StepOutcome {
    /// A token was consumed; return its style to the editor.
    Token(Option<String>),
    /// State changed without consuming; dispatch again.
    Continue,
}

// Mask arbitration resolves whole escape chains in decision rounds before
// any token is emitted, so the backstop sits far above real content.
const MAX_DECISION_ROUNDS: usize = 4096;

/// Run step functions until one consumes a token.
pub(crate) fn step(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    for _ in 0..MAX_DECISION_ROUNDS {
        let outcome = match state.parser {
            ParserStep::TopEntry => top::top_entry(nesting, stream, state)?,
            ParserStep::UntilOpen => top::until_open(nesting, stream, state)?,
            ParserStep::StartSub => top::start_sub(nesting, stream, state)?,
            ParserStep::UntilEol => sub::until_eol(nesting, stream, state)?,
            ParserStep::SubAtSol => sub::sub_at_sol(state),
            ParserStep::SubContinuation => sub::continuation(nesting, stream, state)?,
            ParserStep::FinalizeDirect => sub::finalize_direct(stream, state)?,
            ParserStep::FinalizeToDelim => sub::finalize_to_delim(stream, state)?,
            ParserStep::FinalizeToNull => sub::finalize_to_null(stream, state)?,
            ParserStep::DelimOpen => sub::delim_open(stream, state)?,
            ParserStep::DelimClose => sub::delim_close(stream, state)?,
            ParserStep::MaskEntry => mask::mask_entry(stream, state),
            ParserStep::MaskAtSol => mask::mask_at_sol(stream, state),
            ParserStep::MaskUntilEol => mask::mask_until_eol(nesting, stream, state)?,
            ParserStep::MaskContinuation => mask::mask_continuation(nesting, stream, state)?,
            ParserStep::FinalizeMaskToHost => mask::finalize_mask_to_host(nesting, stream, state)?,
            ParserStep::UntilSubInnerClose => sub::until_sub_inner_close(stream, state)?,
        };
        if let StepOutcome::Token(style) = outcome {
            return Ok(style);
        }
    }
    // Backstop: never stall the editor.
    if !stream.at_eol() {
        stream.next();
    }
    Ok(None)
}

/// Delegate one tokenization call to the host mode.
pub(crate) fn host_token(
    nesting: &NestingMode,
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    match state.token_getter {
        TokenGetter::BlankLineSwallow => {
            stream.next();
            Ok(None)
        }
        TokenGetter::Default => nesting.host().token(stream, state.host_state.as_mut()),
    }
}

/// Delegate one tokenization call to the active sub-mode, layering the
/// configuration's inner style onto whatever the sub-mode produced.
pub(crate) fn sub_token(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    let getter = state.token_getter;
    let sub = state.sub.as_mut().expect("sub token requires an active sub-mode");
    let style = match getter {
        TokenGetter::BlankLineSwallow => {
            stream.next();
            None
        }
        TokenGetter::Default => sub.mode.token(stream, sub.state.as_mut())?,
    };
    Ok(combine_styles(
        sub.config.inner_style.as_deref(),
        style.as_deref(),
    ))
}

/// Delegate one tokenization call to the tokenize-with helper mode.
pub(crate) fn delim_helper_token(
    stream: &mut LineStream,
    state: &mut NestState,
) -> Result<Option<String>, ConfigError> {
    let sub = state.sub.as_mut().expect("helper token requires an active sub-mode");
    let (mode, helper_state) = sub
        .delim_mode
        .as_mut()
        .expect("tokenize-with variant carries a helper mode");
    mode.token(stream, helper_state.as_mut())
}
