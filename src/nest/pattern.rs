//! Delimiter patterns
//!
//! Normalizes string and regex delimiter specifications into a single
//! compiled [`Pattern`] with a canonical `exec(text, from)` search over a
//! line suffix. Searches slice the haystack at `from` and preserve the
//! returned relative index; absolute positions are computed by callers.
//!
//! The `regex` crate has no lookaround, so zero-width "close before X"
//! delimiters are expressed with [`Pattern::before`]: the underlying match
//! is located normally but reported as a zero-length match at its start
//! index. Null-width matches participate in priority arbitration exactly
//! like any other match.

use crate::nest::common::ConfigError;
use regex::Regex;

/// A compiled delimiter pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
    source: String,
    zero_width: bool,
}

/// A successful pattern search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Byte offset of the match relative to the search offset.
    pub index: usize,
    /// The matched text. Empty for zero-width matches.
    pub text: String,
    /// Capture groups (group 0 excluded).
    pub groups: Vec<Option<String>>,
}

impl PatternMatch {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Pattern {
    /// Compile a literal string: every character is regex-escaped.
    pub fn literal(text: &str) -> Pattern {
        let escaped = regex::escape(text);
        Pattern {
            re: Regex::new(&escaped).expect("escaped literal is a valid pattern"),
            source: text.to_string(),
            zero_width: false,
        }
    }

    /// Compile a regex pattern verbatim.
    pub fn regex(pattern: &str) -> Result<Pattern, ConfigError> {
        let re = Regex::new(pattern).map_err(|e| ConfigError::BadPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Pattern {
            re,
            source: pattern.to_string(),
            zero_width: false,
        })
    }

    /// Compile a zero-width pattern: the match is located normally but
    /// reported with zero length at its start index.
    pub fn before(pattern: &str) -> Result<Pattern, ConfigError> {
        let mut compiled = Pattern::regex(pattern)?;
        compiled.zero_width = true;
        Ok(compiled)
    }

    /// Search `text` starting at byte offset `from`.
    ///
    /// The returned index is relative to `from`. Out-of-bounds or
    /// non-boundary offsets yield no match, as does any regex failure:
    /// tokenization degrades to pass-through rather than erroring.
    pub fn exec(&self, text: &str, from: usize) -> Option<PatternMatch> {
        let slice = text.get(from..)?;
        let caps = self.re.captures(slice)?;
        let whole = caps.get(0)?;
        let text = if self.zero_width {
            String::new()
        } else {
            whole.as_str().to_string()
        };
        let groups = caps
            .iter()
            .skip(1)
            .map(|g| g.map(|m| m.as_str().to_string()))
            .collect();
        Some(PatternMatch {
            index: whole.start(),
            text,
            groups,
        })
    }

    /// True if the pattern can succeed without consuming any characters.
    pub fn matches_empty(&self) -> bool {
        self.zero_width || self.re.is_match("")
    }

    /// The original pattern text (for diagnostics).
    pub fn source(&self) -> &str {
        &self.source
    }
}
