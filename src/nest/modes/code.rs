//! Code demo mode
//!
//! A small C-like tokenizer built on the logos lexer. It exists to
//! exercise the combinator end to end: it styles words, numbers, strings
//! and comments, and exposes the meta fields that drive automatic mask
//! synthesis (strings and comments must not terminate an enclosing
//! region).

use crate::nest::common::ConfigError;
use crate::nest::mode::{Mode, ModeMeta, ModeState};
use crate::nest::stream::LineStream;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 3)]
    Word,

    #[regex(r"[0-9]+(\.[0-9]+)?", priority = 3)]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#, priority = 5)]
    Str,

    #[regex(r"//[^\n]*", priority = 5)]
    Comment,

    // Single-line block comments only; an unterminated "/*" falls through
    // to Punct and the mask machinery carries the region across lines.
    #[regex(r"/\*([^*]|\*[^/])*\*/", priority = 5)]
    BlockComment,

    #[regex(r"[ \t]+", priority = 3)]
    Whitespace,

    #[regex(r".", priority = 1)]
    Punct,
}

const KEYWORDS: &[&str] = &[
    "else", "false", "fn", "for", "if", "let", "return", "true", "while",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeState;

pub struct CodeMode;

impl CodeMode {
    pub fn new() -> CodeMode {
        CodeMode
    }
}

impl Default for CodeMode {
    fn default() -> CodeMode {
        CodeMode::new()
    }
}

impl Mode for CodeMode {
    fn name(&self) -> &str {
        "code"
    }

    fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(CodeState)
    }

    fn token(
        &self,
        stream: &mut LineStream,
        _state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        let rest = stream.rest().to_string();
        let mut lexer = RawToken::lexer(&rest);
        match lexer.next() {
            Some(Ok(token)) => {
                let span = lexer.span();
                let text = &rest[span.clone()];
                let style = match token {
                    RawToken::Word if KEYWORDS.contains(&text) => Some("keyword"),
                    RawToken::Word => Some("variable"),
                    RawToken::Number => Some("number"),
                    RawToken::Str => Some("string"),
                    RawToken::Comment => Some("comment"),
                    RawToken::BlockComment => Some("comment"),
                    RawToken::Whitespace => None,
                    RawToken::Punct => Some("operator"),
                };
                stream.advance(span.end);
                Ok(style.map(|s| s.to_string()))
            }
            Some(Err(())) => {
                stream.next();
                Ok(None)
            }
            None => {
                stream.skip_to_end();
                Ok(None)
            }
        }
    }

    fn meta(&self) -> ModeMeta {
        ModeMeta {
            string_quotes: vec!['"'],
            string_escape: Some('\\'),
            line_comments: vec!["//".to_string()],
            block_comment: Some(("/*".to_string(), "*/".to_string())),
            electric_chars: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(line: &str) -> Vec<(String, Option<String>)> {
        let mode = CodeMode::new();
        let mut state = mode.start_state(None);
        let mut stream = LineStream::new(line);
        let mut out = Vec::new();
        while !stream.at_eol() {
            let start = stream.pos();
            let style = mode.token(&mut stream, state.as_mut()).unwrap();
            assert!(stream.pos() > start, "token must consume");
            out.push((line[start..stream.pos()].to_string(), style));
        }
        out
    }

    #[test]
    fn test_words_numbers_and_punct() {
        let tokens = tokens_of("let x = 42;");
        assert_eq!(
            tokens,
            vec![
                ("let".to_string(), Some("keyword".to_string())),
                (" ".to_string(), None),
                ("x".to_string(), Some("variable".to_string())),
                (" ".to_string(), None),
                ("=".to_string(), Some("operator".to_string())),
                (" ".to_string(), None),
                ("42".to_string(), Some("number".to_string())),
                (";".to_string(), Some("operator".to_string())),
            ]
        );
    }

    #[test]
    fn test_string_with_escape_is_one_token() {
        let tokens = tokens_of(r#"a "x\"y" b"#);
        assert_eq!(
            tokens[2],
            (r#""x\"y""#.to_string(), Some("string".to_string()))
        );
    }

    #[test]
    fn test_line_comment() {
        let tokens = tokens_of("x // rest");
        assert_eq!(
            tokens.last().unwrap(),
            &("// rest".to_string(), Some("comment".to_string()))
        );
    }

    #[test]
    fn test_block_comment_is_one_token() {
        let tokens = tokens_of("a /* x */ b");
        assert_eq!(
            tokens[2],
            ("/* x */".to_string(), Some("comment".to_string()))
        );
    }

    #[test]
    fn test_meta_announces_masks() {
        let meta = CodeMode::new().meta();
        assert_eq!(meta.string_quotes, vec!['"']);
        assert_eq!(meta.line_comments, vec!["//".to_string()]);
        assert_eq!(
            meta.block_comment,
            Some(("/*".to_string(), "*/".to_string()))
        );
        assert!(!meta.is_empty());
    }
}
