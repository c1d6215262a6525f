//! Delimiter search and priority arbitration
//!
//! [`search_open`] iterates configurations in declaration order, running
//! each open pattern against the line suffix and keeping a running best
//! match. A candidate replaces the held best only when the best's own
//! comparator rejects it, so the comparator is always asked on the
//! currently-held candidate. This asymmetry is load-bearing: when the
//! default comparator leaves a tie undetermined, declaration order decides.
//!
//! The default comparator yields the tie-break rule: at the same offset a
//! null-width match wins over a consuming one (needed for "close
//! immediately on newline"), among consuming matches the longest wins, and
//! otherwise the leftmost wins.

use crate::nest::config::Config;
use crate::nest::pattern::PatternMatch;
use std::sync::Arc;

/// Whether a match is an open or a close delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Open,
    Close,
}

/// A delimiter match enriched with its configuration and position.
///
/// `index` is relative to the search cursor the match was found from;
/// `start` is the absolute byte offset in the line. Both are kept, so
/// nothing needs to be mutated to express "at cursor" (the entry path
/// records `original_index` before re-anchoring `index` to zero).
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub config: Arc<Config>,
    pub role: Role,
    /// Byte offset relative to the search cursor.
    pub index: usize,
    /// The relative index as originally returned by the pattern search.
    pub original_index: usize,
    /// Absolute byte offset in the line.
    pub start: usize,
    /// Matched text. Empty for null-width matches.
    pub text: String,
    /// Capture groups of the delimiter pattern.
    pub groups: Vec<Option<String>>,
}

impl MatchRecord {
    pub fn new(config: Arc<Config>, role: Role, from: usize, m: PatternMatch) -> MatchRecord {
        MatchRecord {
            config,
            role,
            index: m.index,
            original_index: m.index,
            start: from + m.index,
            text: m.text,
            groups: m.groups,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Absolute byte offset just past the matched text.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Re-anchor the relative index to the cursor, preserving the
    /// original.
    pub fn at_cursor(mut self) -> MatchRecord {
        self.original_index = self.index;
        self.index = 0;
        self
    }
}

/// Default priority ordering: true if `this` outranks `other`.
pub fn default_comp(this: &MatchRecord, other: &MatchRecord) -> bool {
    if this.index == other.index {
        this.is_empty() || (this.len() >= other.len() && !other.is_empty())
    } else {
        this.index < other.index
    }
}

/// Find the highest-priority open delimiter at or after `from`.
///
/// Configurations are tried in declaration order; ties fall to the
/// earliest declared because the comparator is only ever asked on the
/// currently-held best.
pub fn search_open(line: &str, from: usize, configs: &[Arc<Config>]) -> Option<MatchRecord> {
    let mut best: Option<MatchRecord> = None;
    for config in configs {
        if let Some(m) = config.open.exec(line, from) {
            let candidate = MatchRecord::new(Arc::clone(config), Role::Open, from, m);
            best = match best {
                None => Some(candidate),
                Some(held) => {
                    if (held.config.comp.as_ref())(&held, &candidate) {
                        Some(held)
                    } else {
                        Some(candidate)
                    }
                }
            };
        }
    }
    best
}

/// Find the close delimiter of `config` at or after `from`.
///
/// A configuration without a close pattern closes at start of line: it
/// yields a null-width match only when the search begins at the start of
/// the line (`sol`).
pub fn search_close(
    config: &Arc<Config>,
    line: &str,
    from: usize,
    sol: bool,
) -> Option<MatchRecord> {
    match &config.close {
        Some(pattern) => pattern
            .exec(line, from)
            .map(|m| MatchRecord::new(Arc::clone(config), Role::Close, from, m)),
        None => {
            if sol && from == 0 {
                Some(MatchRecord {
                    config: Arc::clone(config),
                    role: Role::Close,
                    index: 0,
                    original_index: 0,
                    start: 0,
                    text: String::new(),
                    groups: Vec::new(),
                })
            } else {
                None
            }
        }
    }
}

/// True if a candidate open outranks the known close of the active
/// region. The candidate's own comparator is asked, so a configuration
/// can prefer one over the other by role.
pub fn beats_close(candidate: &MatchRecord, close: &MatchRecord) -> bool {
    (candidate.config.comp.as_ref())(candidate, close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nest::config::{Config, ConfigSpec};
    use crate::nest::mode::EditorContext;

    fn compile(spec: ConfigSpec) -> Arc<Config> {
        Config::compile(&spec, 0, &EditorContext::default()).unwrap()
    }

    fn open_config(open: &str) -> Arc<Config> {
        compile(ConfigSpec::new().open(open).close("!").mode("plain"))
    }

    #[test]
    fn test_leftmost_wins() {
        let configs = vec![open_config("bb"), open_config("aa")];
        let best = search_open("xx aa bb", 0, &configs).unwrap();
        assert_eq!(best.text, "aa");
        assert_eq!(best.start, 3);
        assert_eq!(best.index, 3);
    }

    #[test]
    fn test_longest_wins_at_same_offset() {
        let configs = vec![open_config("ab"), open_config("abc")];
        let best = search_open("x abc", 0, &configs).unwrap();
        assert_eq!(best.text, "abc");
    }

    #[test]
    fn test_declaration_order_breaks_equal_length_ties() {
        let first = open_config("ab");
        let second = open_config("ab");
        let best = search_open("ab", 0, &[Arc::clone(&first), second]).unwrap();
        assert!(Arc::ptr_eq(&best.config, &first));
    }

    #[test]
    fn test_null_width_beats_consuming_at_same_offset() {
        let consuming = MatchRecord {
            config: open_config("ab"),
            role: Role::Open,
            index: 2,
            original_index: 2,
            start: 2,
            text: "ab".to_string(),
            groups: Vec::new(),
        };
        let null_width = MatchRecord {
            config: open_config("cd"),
            role: Role::Close,
            index: 2,
            original_index: 2,
            start: 2,
            text: String::new(),
            groups: Vec::new(),
        };
        assert!(default_comp(&null_width, &consuming));
        assert!(!default_comp(&consuming, &null_width));
    }

    #[test]
    fn test_relative_index_is_preserved() {
        let configs = vec![open_config("<%")];
        let best = search_open("ab <% cd", 3, &configs).unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.start, 3);

        let re_anchored = search_open("ab <% cd", 0, &configs).unwrap().at_cursor();
        assert_eq!(re_anchored.index, 0);
        assert_eq!(re_anchored.original_index, 3);
        assert_eq!(re_anchored.start, 3);
    }

    #[test]
    fn test_close_at_sol_only_fires_at_line_start() {
        let config = compile(ConfigSpec::new().open("#").mode("plain"));
        assert!(search_close(&config, "hello", 2, false).is_none());
        let close = search_close(&config, "hello", 0, true).unwrap();
        assert!(close.is_empty());
        assert_eq!(close.start, 0);
    }

    #[test]
    fn test_explicit_close_search() {
        let config = compile(ConfigSpec::new().open("<%").close("%>").mode("plain"));
        let close = search_close(&config, "<% 1+2 %>", 2, false).unwrap();
        assert_eq!(close.start, 7);
        assert_eq!(close.text, "%>");
        assert_eq!(close.role, Role::Close);
    }
}
