//! Reference editor driver
//!
//! Drives a [`NestingMode`] across a multi-line document exactly as the
//! embedding editor contract prescribes: one stream per line, repeated
//! `token` calls until the cursor reaches end of line, `blank_line` for
//! empty lines, and a state copy between lines.

use crate::nest::common::ConfigError;
use crate::nest::mode::{Mode, ModeState};
use crate::nest::nesting::NestingMode;
use crate::nest::stream::LineStream;

/// One emitted token: its line, byte span, style, and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRec {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub style: Option<String>,
    pub text: String,
}

/// Tokenize a whole document, copying the state after every line (the
/// editor's caching contract).
pub fn tokenize_document(
    mode: &NestingMode,
    source: &str,
) -> Result<Vec<TokenRec>, ConfigError> {
    run(mode, source, true).map(|(tokens, _)| tokens)
}

/// Tokenize a whole document while mutating one shared state, without the
/// per-line copy. Line independence means this produces the same stream
/// as [`tokenize_document`].
pub fn tokenize_document_shared(
    mode: &NestingMode,
    source: &str,
) -> Result<Vec<TokenRec>, ConfigError> {
    run(mode, source, false).map(|(tokens, _)| tokens)
}

/// Like [`tokenize_document`], but also returns the state after the last
/// line, for assertions on stack balance and settledness.
pub fn tokenize_document_with_state(
    mode: &NestingMode,
    source: &str,
) -> Result<(Vec<TokenRec>, Box<dyn ModeState>), ConfigError> {
    run(mode, source, true)
}

fn run(
    mode: &NestingMode,
    source: &str,
    copy_per_line: bool,
) -> Result<(Vec<TokenRec>, Box<dyn ModeState>), ConfigError> {
    let mut state: Box<dyn ModeState> = mode.start_state(None);
    let mut tokens = Vec::new();
    for (line_no, line) in source.lines().enumerate() {
        if line.is_empty() {
            mode.blank_line(state.as_mut());
        } else {
            let mut stream = LineStream::new(line);
            while !stream.at_eol() {
                let start = stream.pos();
                let style = mode.token(&mut stream, state.as_mut())?;
                assert!(
                    stream.pos() > start,
                    "token call must consume at least one character"
                );
                tokens.push(TokenRec {
                    line: line_no,
                    start,
                    end: stream.pos(),
                    style,
                    text: line[start..stream.pos()].to_string(),
                });
            }
        }
        if copy_per_line {
            state = mode.copy_state(state.as_ref());
        }
    }
    Ok((tokens, state))
}

/// Reduce a token stream to `(text, style)` pairs.
pub fn styled(tokens: &[TokenRec]) -> Vec<(String, Option<String>)> {
    tokens
        .iter()
        .map(|t| (t.text.clone(), t.style.clone()))
        .collect()
}

/// Like [`styled`], but merges adjacent same-line tokens that carry the
/// same style, so expectations stay readable for chatty modes.
pub fn merged(tokens: &[TokenRec]) -> Vec<(String, Option<String>)> {
    let mut out: Vec<(usize, String, Option<String>)> = Vec::new();
    for token in tokens {
        match out.last_mut() {
            Some((line, text, style)) if *line == token.line && *style == token.style => {
                text.push_str(&token.text);
            }
            _ => out.push((token.line, token.text.clone(), token.style.clone())),
        }
    }
    out.into_iter().map(|(_, text, style)| (text, style)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_joins_same_style_runs() {
        let tokens = vec![
            TokenRec {
                line: 0,
                start: 0,
                end: 1,
                style: None,
                text: "a".to_string(),
            },
            TokenRec {
                line: 0,
                start: 1,
                end: 2,
                style: None,
                text: "b".to_string(),
            },
            TokenRec {
                line: 0,
                start: 2,
                end: 3,
                style: Some("x".to_string()),
                text: "c".to_string(),
            },
            TokenRec {
                line: 1,
                start: 0,
                end: 1,
                style: Some("x".to_string()),
                text: "d".to_string(),
            },
        ];
        assert_eq!(
            merged(&tokens),
            vec![
                ("ab".to_string(), None),
                ("c".to_string(), Some("x".to_string())),
                ("d".to_string(), Some("x".to_string())),
            ]
        );
    }
}
