//! Indent delegation and electric delimiters.

use nestlex::nest::common::{ConfigError, IndentResult};
use nestlex::nest::config::ConfigSpec;
use nestlex::nest::electric::ElectricDelimiters;
use nestlex::nest::mode::{Mode, ModeState};
use nestlex::nest::stream::LineStream;
use nestlex::nest::testing::{mk_flat, mk_nesting, tokenize_document_with_state};
use std::sync::Arc;

/// A mode with a fixed indent answer, so delegation is observable.
struct IndentingMode {
    name: String,
    style: Option<String>,
    units: usize,
}

#[derive(Debug, Clone, Default)]
struct IndentingState;

impl Mode for IndentingMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(IndentingState)
    }

    fn token(
        &self,
        stream: &mut LineStream,
        _state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        stream.skip_to_end();
        Ok(self.style.clone())
    }

    fn indent(&self, _state: &dyn ModeState, _text_after: &str, _line: &str) -> IndentResult {
        IndentResult::Units(self.units)
    }
}

fn indenting(name: &str, style: Option<&str>, units: usize) -> Arc<dyn Mode> {
    Arc::new(IndentingMode {
        name: name.to_string(),
        style: style.map(|s| s.to_string()),
        units,
    })
}

#[test]
fn test_indent_delegates_to_active_sub() {
    let mode = mk_nesting(
        indenting("host", None, 7),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(indenting("sub", Some("js"), 3))],
    )
    .unwrap();

    // No sub active: the host answers.
    let (_, state) = tokenize_document_with_state(&mode, "plain text").unwrap();
    assert_eq!(mode.indent(state.as_ref(), "x", "x"), IndentResult::Units(7));

    // Sub active at end of document: the sub answers.
    let (_, state) = tokenize_document_with_state(&mode, "a <% x").unwrap();
    assert_eq!(mode.indent(state.as_ref(), "x", "x"), IndentResult::Units(3));
}

#[test]
fn test_indent_passes_when_nobody_answers() {
    let mode = mk_nesting(
        mk_flat("host", None),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(mk_flat("sub", Some("js")))],
    )
    .unwrap();
    let (_, state) = tokenize_document_with_state(&mode, "a <% x").unwrap();
    assert_eq!(mode.indent(state.as_ref(), "x", "x"), IndentResult::Pass);
}

#[test]
fn test_default_electric_reindents_close_lines_via_host() {
    let mode = mk_nesting(
        indenting("host", None, 7),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(indenting("sub", Some("js"), 3))
            .electric(ElectricDelimiters::Default)],
    )
    .unwrap();
    let (_, state) = tokenize_document_with_state(&mode, "a <% x").unwrap();

    // A line starting (after whitespace) with the close delimiter is
    // re-indented by the host, overriding the active sub's answer.
    assert_eq!(
        mode.indent(state.as_ref(), "%>", "  %> b"),
        IndentResult::Units(7)
    );
    // Any other line still gets the sub's indent.
    assert_eq!(
        mode.indent(state.as_ref(), "x", "  x"),
        IndentResult::Units(3)
    );
}

#[test]
fn test_electric_rule_cleared_after_close() {
    let mode = mk_nesting(
        indenting("host", None, 7),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(indenting("sub", Some("js"), 3))
            .electric(ElectricDelimiters::Default)],
    )
    .unwrap();
    let (_, state) = tokenize_document_with_state(&mode, "a <% x %> b").unwrap();
    // Region closed: no electric rule, no sub; the host answers.
    assert_eq!(
        mode.indent(state.as_ref(), "%>", "%> x"),
        IndentResult::Units(7)
    );
}

#[test]
fn test_entry_indent_hook_feeds_sub_start_state() {
    // The hook's answer is handed to the sub-mode's start_state.
    struct RecordingMode;

    #[derive(Debug, Clone)]
    struct RecordedIndent(Option<usize>);

    impl Mode for RecordingMode {
        fn name(&self) -> &str {
            "recorder"
        }
        fn start_state(&self, indent: Option<usize>) -> Box<dyn ModeState> {
            Box::new(RecordedIndent(indent))
        }
        fn token(
            &self,
            stream: &mut LineStream,
            _state: &mut dyn ModeState,
        ) -> Result<Option<String>, ConfigError> {
            stream.skip_to_end();
            Ok(None)
        }
        fn indent(&self, state: &dyn ModeState, _text_after: &str, _line: &str) -> IndentResult {
            match nestlex::nest::mode::state_ref::<RecordedIndent>(state) {
                Some(RecordedIndent(Some(units))) => IndentResult::Units(*units),
                _ => IndentResult::Pass,
            }
        }
    }

    let mode = mk_nesting(
        mk_flat("host", None),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(Arc::new(RecordingMode))
            .indent(|outer, _matched, _state| IndentResult::Units(outer + 4))],
    )
    .unwrap();
    let (_, state) = tokenize_document_with_state(&mode, "a <% x").unwrap();
    assert_eq!(mode.indent(state.as_ref(), "x", "x"), IndentResult::Units(4));
}
