//! Sub-mode configuration
//!
//! Configurations are declared with the [`ConfigSpec`] builder and
//! compiled once into immutable [`Config`] values. The compiled graph is
//! shared by every per-line state; nothing in it is mutated after
//! compilation, so it is safe to share across documents.
//!
//! Compilation normalizes delimiter specifications into [`Pattern`]s,
//! resolves the tokenization variant from the behavior flags, resolves the
//! sub-mode against the registry, precomputes the delimiter style lists,
//! and recursively compiles nested masks and suffixes (one configuration
//! level deeper). Dynamic per-instance overrides are expressed as a
//! [`ConfigDelta`] returned by a `start` callback; applying a delta always
//! produces a fresh `Config` and is idempotent.

pub mod meta_masks;

use crate::nest::common::{ConfigError, IndentResult};
use crate::nest::electric::ElectricDelimiters;
use crate::nest::mode::{EditorContext, Mode, ModeSpec};
use crate::nest::pattern::Pattern;
use crate::nest::search::{default_comp, MatchRecord};
use crate::nest::state::NestState;
use std::fmt;
use std::sync::Arc;

/// Priority comparator: true if the first match outranks the second.
pub type Comparator = Arc<dyn Fn(&MatchRecord, &MatchRecord) -> bool + Send + Sync>;

/// Dynamic per-instance override hook, invoked on every entry.
pub type StartHook = Arc<dyn Fn(&MatchRecord, &EditorContext) -> ConfigDelta + Send + Sync>;

/// Entry indent hook: maps (outer indent, start match, state) to the
/// indent the sub-mode starts with.
pub type IndentHook = Arc<dyn Fn(usize, &MatchRecord, &NestState) -> IndentResult + Send + Sync>;

/// An uncompiled delimiter specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// Every character is matched literally.
    Literal(String),
    /// A verbatim regex.
    Regex(String),
    /// A zero-width match at the start of the underlying match.
    Before(String),
}

impl PatternSource {
    pub fn compile(&self) -> Result<Pattern, ConfigError> {
        match self {
            PatternSource::Literal(text) => Ok(Pattern::literal(text)),
            PatternSource::Regex(pattern) => Pattern::regex(pattern),
            PatternSource::Before(pattern) => Pattern::before(pattern),
        }
    }
}

impl From<&str> for PatternSource {
    fn from(text: &str) -> PatternSource {
        PatternSource::Literal(text.to_string())
    }
}

/// A verbatim regex delimiter.
pub fn regex(pattern: &str) -> PatternSource {
    PatternSource::Regex(pattern.to_string())
}

/// A zero-width delimiter matching just before `pattern`.
pub fn before(pattern: &str) -> PatternSource {
    PatternSource::Before(pattern.to_string())
}

/// How delimiter text is surfaced as tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelimVariant {
    /// One token per delimiter, styled with the precomputed style lists.
    Static,
    /// Delimiter text is re-tokenized by the sub-mode, prefixed with the
    /// delimiter style list.
    Separate,
    /// Delimiter text is tokenized by a dedicated helper mode.
    TokenizeWith(ModeSpec),
    /// Delimiter text is passed through the sub-mode as ordinary content.
    Include,
}

#[derive(Clone)]
enum SpecMode {
    Spec(ModeSpec),
    Object(Arc<dyn Mode>),
}

impl fmt::Debug for SpecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecMode::Spec(spec) => write!(f, "Spec({:?})", spec.name),
            SpecMode::Object(mode) => write!(f, "Object({:?})", mode.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenizeDelims {
    Sub,
    With(ModeSpec),
}

/// Builder for a sub-mode configuration.
#[derive(Clone, Default)]
pub struct ConfigSpec {
    open: Option<PatternSource>,
    close: Option<PatternSource>,
    mode: Option<SpecMode>,
    mask: bool,
    masks: Vec<ConfigSpec>,
    suffixes: Vec<ConfigSpec>,
    inline: bool,
    parse_delimiters: bool,
    tokenize_delimiters: Option<TokenizeDelims>,
    delim_style: Option<String>,
    inner_style: Option<String>,
    comp: Option<Comparator>,
    start: Option<StartHook>,
    indent: Option<IndentHook>,
    electric: Option<ElectricDelimiters>,
}

impl ConfigSpec {
    pub fn new() -> ConfigSpec {
        ConfigSpec::default()
    }

    /// The open delimiter (required).
    pub fn open(mut self, source: impl Into<PatternSource>) -> ConfigSpec {
        self.open = Some(source.into());
        self
    }

    /// The close delimiter. Absent means "close at start of next line".
    pub fn close(mut self, source: impl Into<PatternSource>) -> ConfigSpec {
        self.close = Some(source.into());
        self
    }

    /// The sub-mode, resolved against the registry at compile time.
    pub fn mode(mut self, spec: impl Into<ModeSpec>) -> ConfigSpec {
        self.mode = Some(SpecMode::Spec(spec.into()));
        self
    }

    /// The sub-mode as a concrete object.
    pub fn mode_object(mut self, mode: Arc<dyn Mode>) -> ConfigSpec {
        self.mode = Some(SpecMode::Object(mode));
        self
    }

    /// Mark this configuration as a mask: a non-exiting region that
    /// suppresses all delimiter searches except its own close.
    pub fn mask(mut self, mask: bool) -> ConfigSpec {
        self.mask = mask;
        self
    }

    /// Alias for [`ConfigSpec::mask`] (older configurations call masks
    /// "literals").
    pub fn literal(self, literal: bool) -> ConfigSpec {
        self.mask(literal)
    }

    /// Nested mask configurations, compiled one level deeper.
    pub fn masks(mut self, masks: Vec<ConfigSpec>) -> ConfigSpec {
        self.masks = masks;
        self
    }

    /// Alias for [`ConfigSpec::masks`].
    pub fn literals(self, literals: Vec<ConfigSpec>) -> ConfigSpec {
        self.masks(literals)
    }

    /// Configurations attempted once, with elevated priority, after this
    /// sub-mode closes.
    pub fn suffixes(mut self, suffixes: Vec<ConfigSpec>) -> ConfigSpec {
        self.suffixes = suffixes;
        self
    }

    /// Inline suffixes are discarded on blank lines.
    pub fn inline(mut self, inline: bool) -> ConfigSpec {
        self.inline = inline;
        self
    }

    /// Pass delimiter text through the sub-mode as ordinary content.
    pub fn parse_delimiters(mut self, parse: bool) -> ConfigSpec {
        self.parse_delimiters = parse;
        self
    }

    /// Re-tokenize delimiter text with the sub-mode.
    pub fn tokenize_delimiters(mut self, tokenize: bool) -> ConfigSpec {
        self.tokenize_delimiters = if tokenize {
            Some(TokenizeDelims::Sub)
        } else {
            None
        };
        self
    }

    /// Tokenize delimiter text with a dedicated helper mode.
    pub fn tokenize_delimiters_with(mut self, spec: impl Into<ModeSpec>) -> ConfigSpec {
        self.tokenize_delimiters = Some(TokenizeDelims::With(spec.into()));
        self
    }

    /// Base style class for delimiter tokens. Expanded at compile time to
    /// `"<style> <style>-open"` and `"<style> <style>-close"`.
    pub fn delim_style(mut self, style: &str) -> ConfigSpec {
        self.delim_style = Some(style.to_string());
        self
    }

    /// Style class appended to every token the sub-mode emits.
    pub fn inner_style(mut self, style: &str) -> ConfigSpec {
        self.inner_style = Some(style.to_string());
        self
    }

    /// Custom priority comparator.
    pub fn comp(
        mut self,
        comp: impl Fn(&MatchRecord, &MatchRecord) -> bool + Send + Sync + 'static,
    ) -> ConfigSpec {
        self.comp = Some(Arc::new(comp));
        self
    }

    /// Dynamic per-instance override hook, invoked on every entry.
    pub fn start(
        mut self,
        hook: impl Fn(&MatchRecord, &EditorContext) -> ConfigDelta + Send + Sync + 'static,
    ) -> ConfigSpec {
        self.start = Some(Arc::new(hook));
        self
    }

    /// Entry indent hook.
    pub fn indent(
        mut self,
        hook: impl Fn(usize, &MatchRecord, &NestState) -> IndentResult + Send + Sync + 'static,
    ) -> ConfigSpec {
        self.indent = Some(Arc::new(hook));
        self
    }

    /// Electric delimiter behavior.
    pub fn electric(mut self, electric: ElectricDelimiters) -> ConfigSpec {
        self.electric = Some(electric);
        self
    }
}

impl fmt::Debug for ConfigSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSpec")
            .field("open", &self.open)
            .field("close", &self.close)
            .field("mode", &self.mode)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}

/// Overrides returned by a `start` callback. Each field replaces the
/// corresponding compiled attribute for this entry only.
#[derive(Debug, Clone, Default)]
pub struct ConfigDelta {
    pub mode: Option<ModeSpec>,
    pub close: Option<PatternSource>,
    pub inner_style: Option<String>,
    pub delim_style: Option<String>,
    pub mask: Option<bool>,
}

/// A compiled, immutable sub-mode configuration.
#[derive(Clone)]
pub struct Config {
    pub open: Pattern,
    /// Absent means the region closes at the start of the next line.
    pub close: Option<Pattern>,
    /// The sub-mode. `None` only for masks, whose region is tokenized by
    /// whatever mode was active when the mask opened.
    pub mode: Option<Arc<dyn Mode>>,
    pub variant: DelimVariant,
    pub mask: bool,
    pub masks: Vec<Arc<Config>>,
    pub suffixes: Vec<Arc<Config>>,
    pub inline: bool,
    pub inner_style: Option<String>,
    pub delim_open_style: Option<String>,
    pub delim_close_style: Option<String>,
    pub comp: Comparator,
    /// Configuration nesting level: 0 at root, incremented inside masks
    /// and suffixes.
    pub clv: u32,
    pub(crate) start: Option<StartHook>,
    pub(crate) indent: Option<IndentHook>,
    pub electric: Option<ElectricDelimiters>,
}

impl Config {
    /// Compile a specification at configuration level `clv`.
    pub fn compile(
        spec: &ConfigSpec,
        clv: u32,
        ctx: &EditorContext,
    ) -> Result<Arc<Config>, ConfigError> {
        let open = spec
            .open
            .as_ref()
            .ok_or(ConfigError::MissingOpen)?
            .compile()?;
        let close = spec.close.as_ref().map(|c| c.compile()).transpose()?;

        let variant = if spec.parse_delimiters {
            DelimVariant::Include
        } else {
            match &spec.tokenize_delimiters {
                None => DelimVariant::Static,
                Some(TokenizeDelims::Sub) => DelimVariant::Separate,
                Some(TokenizeDelims::With(mode)) => DelimVariant::TokenizeWith(mode.clone()),
            }
        };

        if open.matches_empty() && variant != DelimVariant::Include {
            return Err(ConfigError::ZeroWidthOpen(open.source().to_string()));
        }

        let mode = if spec.mask {
            None
        } else {
            let spec_mode = spec.mode.as_ref().ok_or(ConfigError::MissingMode)?;
            Some(match spec_mode {
                SpecMode::Spec(mode_spec) => ctx.registry.get_mode(mode_spec)?,
                SpecMode::Object(mode) => Arc::clone(mode),
            })
        };

        let mut masks = Vec::with_capacity(spec.masks.len());
        for mask_spec in &spec.masks {
            let mut forced = mask_spec.clone();
            forced.mask = true;
            masks.push(Config::compile(&forced, clv + 1, ctx)?);
        }
        if let Some(mode) = &mode {
            masks.extend(meta_masks::for_meta(&mode.meta(), clv + 1));
        }

        let mut suffixes = Vec::with_capacity(spec.suffixes.len());
        for suffix_spec in &spec.suffixes {
            suffixes.push(Config::compile(suffix_spec, clv + 1, ctx)?);
        }

        let (delim_open_style, delim_close_style) = match &spec.delim_style {
            None => (None, None),
            Some(style) => (
                Some(format!("{} {}-open", style, style)),
                Some(format!("{} {}-close", style, style)),
            ),
        };

        Ok(Arc::new(Config {
            open,
            close,
            mode,
            variant,
            mask: spec.mask,
            masks,
            suffixes,
            inline: spec.inline,
            inner_style: spec.inner_style.clone(),
            delim_open_style,
            delim_close_style,
            comp: spec.comp.clone().unwrap_or_else(|| Arc::new(default_comp)),
            clv,
            start: spec.start.clone(),
            indent: spec.indent.clone(),
            electric: spec.electric.clone(),
        }))
    }

    /// The configuration to activate for `matched`: the config itself, or
    /// a fresh one with the `start` callback's delta applied.
    pub(crate) fn start_config(
        config: &Arc<Config>,
        matched: &MatchRecord,
        ctx: &EditorContext,
    ) -> Result<Arc<Config>, ConfigError> {
        match &config.start {
            None => Ok(Arc::clone(config)),
            Some(hook) => {
                let delta = (hook.as_ref())(matched, ctx);
                config.apply_delta(&delta, ctx)
            }
        }
    }

    fn apply_delta(&self, delta: &ConfigDelta, ctx: &EditorContext) -> Result<Arc<Config>, ConfigError> {
        let mut config = self.clone();
        if let Some(mode_spec) = &delta.mode {
            let mode = ctx.registry.get_mode(mode_spec)?;
            config
                .masks
                .extend(meta_masks::for_meta(&mode.meta(), self.clv + 1));
            config.mode = Some(mode);
        }
        if let Some(close) = &delta.close {
            config.close = Some(close.compile()?);
        }
        if let Some(style) = &delta.inner_style {
            config.inner_style = Some(style.clone());
        }
        if let Some(style) = &delta.delim_style {
            config.delim_open_style = Some(format!("{} {}-open", style, style));
            config.delim_close_style = Some(format!("{} {}-close", style, style));
        }
        if let Some(mask) = delta.mask {
            config.mask = mask;
        }
        Ok(Arc::new(config))
    }

    pub(crate) fn entry_indent(
        &self,
        outer: usize,
        matched: &MatchRecord,
        state: &NestState,
    ) -> Option<usize> {
        match &self.indent {
            None => None,
            Some(hook) => match (hook.as_ref())(outer, matched, state) {
                IndentResult::Units(units) => Some(units),
                IndentResult::Pass => None,
            },
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("open", &self.open.source())
            .field("close", &self.close.as_ref().map(|c| c.source().to_string()))
            .field("mode", &self.mode.as_ref().map(|m| m.name().to_string()))
            .field("variant", &self.variant)
            .field("mask", &self.mask)
            .field("masks", &self.masks.len())
            .field("suffixes", &self.suffixes.len())
            .field("clv", &self.clv)
            .finish_non_exhaustive()
    }
}
