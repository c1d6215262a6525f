//! Plain text mode
//!
//! Styles nothing and consumes everything. Useful as a host mode when only
//! the embedded regions need highlighting.

use crate::nest::common::ConfigError;
use crate::nest::mode::{Mode, ModeState};
use crate::nest::stream::LineStream;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainState;

pub struct PlainMode;

impl PlainMode {
    pub fn new() -> PlainMode {
        PlainMode
    }
}

impl Default for PlainMode {
    fn default() -> PlainMode {
        PlainMode::new()
    }
}

impl Mode for PlainMode {
    fn name(&self) -> &str {
        "plain"
    }

    fn start_state(&self, _indent: Option<usize>) -> Box<dyn ModeState> {
        Box::new(PlainState)
    }

    fn token(
        &self,
        stream: &mut LineStream,
        _state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError> {
        stream.skip_to_end();
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumes_whole_line_unstyled() {
        let mode = PlainMode::new();
        let mut state = mode.start_state(None);
        let mut stream = LineStream::new("hello world");
        let style = mode.token(&mut stream, state.as_mut()).unwrap();
        assert_eq!(style, None);
        assert!(stream.at_eol());
    }
}
