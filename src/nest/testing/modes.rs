//! Deliberately simple modes for exact test expectations.

use crate::nest::common::ConfigError;
use crate::nest::mode::{Mode, ModeState};
use crate::nest::stream::LineStream;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatState;

/// Consumes to the end of the visible line and styles everything with one
/// fixed style. One token per (possibly retracted) line region.
pub struct FlatMode {
    name: String,
    style: Option<String>,
}

impl FlatMode {
    pub fn new(name: &str, style: Option<&str>) -> FlatMode {
        FlatMode {
            name: name.to_string(),
            style: style.map(|s| s.to_string()),
        }
    }
}

impl Mode for FlatMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(FlatState)
    }

    fn token(
        &self,
        stream: &mut LineStream,
        _state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        stream.skip_to_end();
        Ok(self.style.clone())
    }
}

/// Tokenizes word by word: alphanumeric runs get the configured style,
/// everything else is consumed one character at a time, unstyled.
pub struct WordMode {
    name: String,
    style: String,
}

impl WordMode {
    pub fn new(name: &str, style: &str) -> WordMode {
        WordMode {
            name: name.to_string(),
            style: style.to_string(),
        }
    }
}

impl Mode for WordMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(FlatState)
    }

    fn token(
        &self,
        stream: &mut LineStream,
        _state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        if stream.eat_while(|c| c.is_alphanumeric()) {
            Ok(Some(self.style.clone()))
        } else {
            stream.next();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_mode_single_token() {
        let mode = FlatMode::new("js", Some("js"));
        let mut state = mode.start_state(None);
        let mut stream = LineStream::new(" 1+2 ");
        let style = mode.token(&mut stream, state.as_mut()).unwrap();
        assert_eq!(style, Some("js".to_string()));
        assert!(stream.at_eol());
    }

    #[test]
    fn test_word_mode_tokens() {
        let mode = WordMode::new("w", "word");
        let mut state = mode.start_state(None);
        let mut stream = LineStream::new("ab c");
        assert_eq!(
            mode.token(&mut stream, state.as_mut()).unwrap(),
            Some("word".to_string())
        );
        assert_eq!(mode.token(&mut stream, state.as_mut()).unwrap(), None);
        assert_eq!(
            mode.token(&mut stream, state.as_mut()).unwrap(),
            Some("word".to_string())
        );
        assert!(stream.at_eol());
    }
}
