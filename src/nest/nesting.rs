//! The composite tokenizer façade
//!
//! [`NestingMode`] wraps a host mode and an ordered set of compiled
//! sub-mode configurations into a mode of its own. It owns the per-line
//! [`NestState`], dispatches every `token` call into the step machine, and
//! bridges recursive nesting: a sub-mode that is itself a `NestingMode` is
//! reached through the [`Mode::as_nesting`] seam and arbitrated against
//! this instance's delimiters.
//!
//! Mask configurations for the host mode's strings and comments are
//! synthesized at construction and searched together with the declared
//! configurations.

use crate::nest::common::{ConfigError, IndentResult};
use crate::nest::config::{meta_masks, Config, ConfigSpec};
use crate::nest::electric::ElectricIndent;
use crate::nest::machine;
use crate::nest::mode::{
    state_mut, state_ref, EditorContext, InnerMode, Mode, ModeMeta, ModeState,
};
use crate::nest::search::{search_open, MatchRecord, Role};
use crate::nest::state::{
    EntryKind, MaskReturn, NestState, ParserStep, PendingEntry, TokenGetter,
};
use crate::nest::stream::LineStream;
use std::fmt;
use std::sync::Arc;

/// A tokenizer that nests sub-modes inside a host mode.
pub struct NestingMode {
    name: String,
    host: Arc<dyn Mode>,
    /// Declared configurations followed by the host's synthesized masks.
    top_set: Vec<Arc<Config>>,
    ctx: EditorContext,
}

impl NestingMode {
    /// Build a nesting tokenizer with the default editor context.
    pub fn new(host: Arc<dyn Mode>, specs: Vec<ConfigSpec>) -> Result<NestingMode, ConfigError> {
        NestingMode::with_context(EditorContext::default(), host, specs)
    }

    /// Build a nesting tokenizer with an explicit editor context (owned
    /// registry, tab metrics).
    pub fn with_context(
        ctx: EditorContext,
        host: Arc<dyn Mode>,
        specs: Vec<ConfigSpec>,
    ) -> Result<NestingMode, ConfigError> {
        let mut top_set = Vec::with_capacity(specs.len());
        for spec in &specs {
            top_set.push(Config::compile(spec, 0, &ctx)?);
        }
        top_set.extend(meta_masks::for_meta(&host.meta(), 0));
        Ok(NestingMode {
            name: format!("nest:{}", host.name()),
            host,
            top_set,
            ctx,
        })
    }

    /// Create a fresh per-line state with a concrete type.
    pub fn nest_start(&self, indent: Option<usize>) -> NestState {
        NestState::new(self.host.start_state(indent), indent)
    }

    pub(crate) fn host(&self) -> &Arc<dyn Mode> {
        &self.host
    }

    pub(crate) fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub(crate) fn top_set(&self) -> &[Arc<Config>] {
        &self.top_set
    }

    /// The next open delimiter this instance would act on: pending
    /// suffixes first (elevated priority), then the declared set.
    pub(crate) fn peek_open(
        &self,
        line: &str,
        from: usize,
        state: &NestState,
    ) -> Option<MatchRecord> {
        match &state.suffixes {
            None => search_open(line, from, &self.top_set),
            Some(suffixes) => {
                let mut set: Vec<Arc<Config>> = suffixes.clone();
                set.extend(self.top_set.iter().cloned());
                search_open(line, from, &set)
            }
        }
    }

    fn blank_line_state(&self, state: &mut NestState) {
        // Only inline-marked suffixes die on a blank line.
        if let Some(suffixes) = &mut state.suffixes {
            suffixes.retain(|config| !config.inline);
            if suffixes.is_empty() {
                state.suffixes = None;
            }
        }

        if !state.masks.is_empty() {
            // The mask close search resumes at the next token call.
            return;
        }

        if state.sub.is_some() {
            let closes = {
                let sub = state.sub.as_ref().expect("active sub-mode");
                match &sub.config.close {
                    None => true,
                    Some(pattern) => pattern
                        .exec("\n", 0)
                        .map(|m| m.index == 0 && !m.is_empty())
                        .unwrap_or(false),
                }
            };
            if closes {
                machine::sub::finally(state, None);
            } else {
                let sub = state.sub.as_mut().expect("active sub-mode");
                let mode = Arc::clone(&sub.mode);
                mode.blank_line(sub.state.as_mut());
            }
            return;
        }

        // An open that explicitly matches "\n" enters on the blank line.
        let newline_entry = self.top_set.iter().find_map(|config| {
            config
                .open
                .exec("\n", 0)
                .filter(|m| m.index == 0 && !m.is_empty())
                .map(|m| MatchRecord::new(Arc::clone(config), Role::Open, 0, m))
        });
        if let Some(matched) = newline_entry {
            let kind = if matched.config.mask {
                EntryKind::Mask
            } else {
                EntryKind::Sub
            };
            state.next_entry = Some(PendingEntry { matched, kind });
            state.parser = ParserStep::StartSub;
            state.token_getter = TokenGetter::BlankLineSwallow;
            let mut stream = LineStream::new("\n");
            while !stream.at_eol() {
                if machine::step(self, &mut stream, state).is_err() {
                    break;
                }
            }
            state.token_getter = TokenGetter::Default;
            state.search_from = None;
            if state.parser == ParserStep::SubContinuation {
                state.parser = ParserStep::SubAtSol;
            }
            return;
        }

        self.host.blank_line(state.host_state.as_mut());
    }
}

impl Mode for NestingMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_state(&self, indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(self.nest_start(indent))
    }

    fn token(
        &self,
        stream: &mut LineStream,
        state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        let nest_state =
            state_mut::<NestState>(state).expect("nesting mode driven with a foreign state");
        let before = stream.pos();
        let style = machine::step(self, stream, nest_state)?;
        if stream.pos() == before && !stream.at_eol() {
            // Forward progress is guaranteed even for misbehaving
            // configurations.
            stream.next();
        }
        Ok(style)
    }

    fn indent(&self, state: &dyn ModeState, text_after: &str, line: &str) -> IndentResult {
        let nest_state = match state_ref::<NestState>(state) {
            Some(nest_state) => nest_state,
            None => return IndentResult::Pass,
        };
        if let Some(rule) = &nest_state.electric {
            if rule.applies_to(line) {
                return match &rule.indent {
                    ElectricIndent::Host => {
                        self.host
                            .indent(nest_state.host_state.as_ref(), text_after, line)
                    }
                    ElectricIndent::Units(units) => IndentResult::Units(*units),
                };
            }
        }
        if let Some(sub) = &nest_state.sub {
            match sub.mode.indent(sub.state.as_ref(), text_after, line) {
                IndentResult::Pass => {}
                result => return result,
            }
        }
        self.host
            .indent(nest_state.host_state.as_ref(), text_after, line)
    }

    fn blank_line(&self, state: &mut dyn ModeState) {
        if let Some(nest_state) = state_mut::<NestState>(state) {
            self.blank_line_state(nest_state);
        }
    }

    fn inner_mode<'a>(&'a self, state: &'a dyn ModeState) -> Option<InnerMode<'a>> {
        let nest_state = state_ref::<NestState>(state)?;
        let masked_to_host = nest_state
            .masks
            .first()
            .map(|frame| frame.return_to == MaskReturn::Host)
            .unwrap_or(false);
        if !masked_to_host {
            if let Some(sub) = &nest_state.sub {
                return Some(
                    sub.mode
                        .inner_mode(sub.state.as_ref())
                        .unwrap_or(InnerMode {
                            mode: sub.mode.as_ref(),
                            state: sub.state.as_ref(),
                        }),
                );
            }
        }
        Some(InnerMode {
            mode: self.host.as_ref(),
            state: nest_state.host_state.as_ref(),
        })
    }

    fn meta(&self) -> ModeMeta {
        self.host.meta()
    }

    fn as_nesting(&self) -> Option<&NestingMode> {
        Some(self)
    }
}

impl fmt::Debug for NestingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestingMode")
            .field("name", &self.name)
            .field("host", &self.host.name())
            .field("configs", &self.top_set.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nest::modes::plain::PlainMode;

    fn simple_mode() -> Result<NestingMode, ConfigError> {
        NestingMode::new(
            Arc::new(PlainMode::new()),
            vec![ConfigSpec::new().open("<%").close("%>").mode("plain")],
        )
    }

    #[test]
    fn test_construction_compiles_configs() {
        let mode = simple_mode().unwrap();
        assert_eq!(mode.top_set().len(), 1);
        assert_eq!(mode.name(), "nest:plain");
    }

    #[test]
    fn test_bad_config_is_rejected_at_construction() {
        let err = NestingMode::new(
            Arc::new(PlainMode::new()),
            vec![ConfigSpec::new().open("<%").mode("missing-mode")],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownMode("missing-mode".to_string()));
    }

    #[test]
    fn test_start_state_is_settled() {
        let mode = simple_mode().unwrap();
        let state = mode.nest_start(None);
        assert!(state.settled());
    }

    #[test]
    fn test_forward_progress_on_host_that_stalls() {
        struct StallingMode;
        impl Mode for StallingMode {
            fn name(&self) -> &str {
                "stall"
            }
            fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
                Box::new(crate::nest::modes::plain::PlainState)
            }
            fn token(
                &self,
                _stream: &mut LineStream,
                _state: &mut dyn ModeState,
            ) -> Result<Option<String>, ConfigError> {
                Ok(None)
            }
        }

        let mode = NestingMode::new(Arc::new(StallingMode), vec![]).unwrap();
        let mut state = mode.nest_start(None);
        let mut stream = LineStream::new("abc");
        let mut rounds = 0;
        while !stream.at_eol() {
            rounds += 1;
            assert!(rounds < 16, "tokenization must reach end of line");
            let before = stream.pos();
            Mode::token(&mode, &mut stream, &mut state).unwrap();
            assert!(stream.pos() > before);
        }
    }

    #[test]
    fn test_inner_mode_reports_host_at_top_level() {
        let mode = simple_mode().unwrap();
        let state = mode.nest_start(None);
        let inner = Mode::inner_mode(&mode, &state).unwrap();
        assert_eq!(inner.mode.name(), "plain");
    }
}
