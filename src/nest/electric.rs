//! Electric delimiters
//!
//! An optional per-config indent hook. Immediately after the parser
//! consumes a delimiter token, the config's electric behavior may register
//! an [`ElectricRule`] on the state; on the next indent query the rule
//! takes precedence over the mode-owned indent, conditional on its line
//! test.
//!
//! The default behavior re-indents any line that begins (after leading
//! whitespace) with the close delimiter, using the host mode's indent. An
//! inner nesting combinator registers its rule on its *own* state; outer
//! indent queries reach it through sub-mode delegation.

use crate::nest::pattern::Pattern;
use crate::nest::search::MatchRecord;
use crate::nest::state::NestState;
use std::fmt;
use std::sync::Arc;

/// Which delimiter was just consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimKind {
    Open,
    Close,
}

/// Custom electric behavior: called after a delimiter token is consumed;
/// a returned rule registers itself on the state.
pub trait ElectricHook: Send + Sync {
    fn configure(&self, kind: DelimKind, matched: &MatchRecord) -> Option<ElectricRule>;
}

/// Per-config electric delimiter behavior.
#[derive(Clone)]
pub enum ElectricDelimiters {
    /// Re-indent close-delimiter lines using the host mode's indent.
    Default,
    Custom(Arc<dyn ElectricHook>),
}

impl fmt::Debug for ElectricDelimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElectricDelimiters::Default => write!(f, "ElectricDelimiters::Default"),
            ElectricDelimiters::Custom(_) => write!(f, "ElectricDelimiters::Custom(..)"),
        }
    }
}

/// How an electric rule indents the line it fires on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElectricIndent {
    /// Use the host mode's indent.
    Host,
    /// Indent to a fixed number of units.
    Units(usize),
}

/// An active electric rule, registered on the state until the sub-mode
/// exits or the close delimiter is consumed.
#[derive(Debug, Clone)]
pub struct ElectricRule {
    /// Fires when the line, after leading whitespace, starts with this.
    pub test: Pattern,
    pub indent: ElectricIndent,
}

impl ElectricRule {
    /// True if `line` (after leading whitespace) starts with the test
    /// pattern.
    pub fn applies_to(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.test
            .exec(trimmed, 0)
            .map(|m| m.index == 0)
            .unwrap_or(false)
    }
}

/// Apply a config's electric behavior after a delimiter token.
pub(crate) fn configure_electric(
    state: &mut NestState,
    electric: &ElectricDelimiters,
    close: Option<&Pattern>,
    kind: DelimKind,
    matched: &MatchRecord,
) {
    match electric {
        ElectricDelimiters::Default => match kind {
            DelimKind::Open => {
                if let Some(close) = close {
                    state.electric = Some(ElectricRule {
                        test: close.clone(),
                        indent: ElectricIndent::Host,
                    });
                }
            }
            DelimKind::Close => {
                state.electric = None;
            }
        },
        ElectricDelimiters::Custom(hook) => {
            if let Some(rule) = hook.configure(kind, matched) {
                state.electric = Some(rule);
            }
        }
    }
}
