//! Mode contract and registry
//!
//! A *mode* is a line-at-a-time tokenizer: it produces one style string per
//! `token` call, keeps its position in an opaque per-line state, and can be
//! copied after every line (the editor's caching contract).
//!
//! The [`Mode`] trait is the seam between the nesting combinator and
//! concrete tokenizers. Host modes, sub-modes, and the combinator itself
//! all implement it, which is what makes nesting recursive.
//!
//! Mode states are type-erased behind [`ModeState`] so heterogeneous modes
//! can share one stack; `Box<dyn ModeState>` is `Clone` by delegating to
//! the state's own clone, so composite states copy their children through
//! the respective mode's copier.

use crate::nest::common::{ConfigError, IndentResult};
use crate::nest::nesting::NestingMode;
use crate::nest::stream::LineStream;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Type-erased, clonable per-line tokenizer state.
///
/// Implemented automatically for every `Any + Clone + Debug + Send` type.
pub trait ModeState: Any + fmt::Debug + Send {
    fn clone_state(&self) -> Box<dyn ModeState>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ModeState for T
where
    T: Any + Clone + fmt::Debug + Send,
{
    fn clone_state(&self) -> Box<dyn ModeState> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for Box<dyn ModeState> {
    fn clone(&self) -> Self {
        ModeState::clone_state(self.as_ref())
    }
}

/// Downcast a state reference to a concrete state type.
pub fn state_ref<T: Any>(state: &dyn ModeState) -> Option<&T> {
    state.as_any().downcast_ref::<T>()
}

/// Downcast a mutable state reference to a concrete state type.
pub fn state_mut<T: Any>(state: &mut dyn ModeState) -> Option<&mut T> {
    state.as_any_mut().downcast_mut::<T>()
}

/// Meta fields a mode may expose so that mask configurations for its
/// strings, escapes, and comments can be synthesized automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModeMeta {
    /// Quote characters that open and close string literals.
    pub string_quotes: Vec<char>,
    /// Escape character valid inside string literals.
    pub string_escape: Option<char>,
    /// Line comment markers. A comment runs to the end of the line.
    pub line_comments: Vec<String>,
    /// Block comment open/close marker pair.
    pub block_comment: Option<(String, String)>,
    /// Characters that should trigger re-indentation when typed.
    pub electric_chars: Option<String>,
}

impl ModeMeta {
    pub fn is_empty(&self) -> bool {
        self.string_quotes.is_empty()
            && self.line_comments.is_empty()
            && self.block_comment.is_none()
    }
}

/// The innermost mode/state pair currently responsible for styling.
pub struct InnerMode<'a> {
    pub mode: &'a dyn Mode,
    pub state: &'a dyn ModeState,
}

/// A line-at-a-time tokenizer.
pub trait Mode: Send + Sync {
    /// Short identifying name, used by the registry and diagnostics.
    fn name(&self) -> &str;

    /// Create the state for the first line. `indent` is the indentation
    /// context the mode starts in, when known.
    fn start_state(&self, indent: Option<usize>) -> Box<dyn ModeState>;

    /// Deep-copy a state. The default delegates to the state's own clone,
    /// which is correct for every state that owns its data.
    fn copy_state(&self, state: &dyn ModeState) -> Box<dyn ModeState> {
        state.clone_state()
    }

    /// Consume at least one character and return the style for the
    /// consumed token, or `None` for unstyled text.
    ///
    /// The only error a mode may produce is a configuration error raised
    /// at first entry into a dynamically resolved sub-mode; leaf modes
    /// always return `Ok`.
    fn token(
        &self,
        stream: &mut LineStream,
        state: &mut dyn ModeState,
    ) -> Result<Option<String>, ConfigError>;

    /// Indentation for a line starting with `text_after`. `Pass` defers to
    /// the outer scope.
    fn indent(&self, _state: &dyn ModeState, _text_after: &str, _line: &str) -> IndentResult {
        IndentResult::Pass
    }

    /// Notification that the editor skipped a blank line.
    fn blank_line(&self, _state: &mut dyn ModeState) {}

    /// The mode/state pair currently responsible for styling, if this mode
    /// delegates to an inner one. `None` means this mode is innermost.
    fn inner_mode<'a>(&'a self, _state: &'a dyn ModeState) -> Option<InnerMode<'a>> {
        None
    }

    /// Meta fields used to synthesize mask configurations.
    fn meta(&self) -> ModeMeta {
        ModeMeta::default()
    }

    /// Recursion seam: a mode that is itself a nesting combinator returns
    /// itself here so the enclosing combinator can arbitrate delimiters
    /// across the boundary.
    fn as_nesting(&self) -> Option<&NestingMode> {
        None
    }
}

/// A mode specification: a registered name plus options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    pub name: String,
    pub options: Vec<(String, String)>,
}

impl ModeSpec {
    pub fn new(name: &str) -> ModeSpec {
        ModeSpec {
            name: name.to_string(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: &str) -> ModeSpec {
        self.options.push((key.to_string(), value.to_string()));
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<&str> for ModeSpec {
    fn from(name: &str) -> ModeSpec {
        ModeSpec::new(name)
    }
}

type ModeFactory = Arc<dyn Fn(&ModeSpec) -> Arc<dyn Mode> + Send + Sync>;

/// Resolves mode specifications to concrete mode objects.
///
/// Registries are owned values passed in through [`EditorContext`]; the
/// conventional process-wide registry from [`ModeRegistry::global`] exists
/// for embedding convenience and comes pre-loaded with the bundled modes.
pub struct ModeRegistry {
    factories: RwLock<HashMap<String, ModeFactory>>,
}

impl ModeRegistry {
    /// An empty registry.
    pub fn new() -> ModeRegistry {
        ModeRegistry {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// A registry pre-loaded with the bundled modes.
    pub fn with_builtin_modes() -> ModeRegistry {
        let registry = ModeRegistry::new();
        registry.register("plain", |_spec| {
            Arc::new(crate::nest::modes::plain::PlainMode::new())
        });
        registry.register("code", |_spec| {
            Arc::new(crate::nest::modes::code::CodeMode::new())
        });
        registry
    }

    /// The conventional process-wide registry.
    pub fn global() -> Arc<ModeRegistry> {
        static GLOBAL: Lazy<Arc<ModeRegistry>> =
            Lazy::new(|| Arc::new(ModeRegistry::with_builtin_modes()));
        GLOBAL.clone()
    }

    /// Register a mode factory under `name`, replacing any previous entry.
    pub fn register(
        &self,
        name: &str,
        factory: impl Fn(&ModeSpec) -> Arc<dyn Mode> + Send + Sync + 'static,
    ) {
        self.factories
            .write()
            .expect("mode registry lock poisoned")
            .insert(name.to_string(), Arc::new(factory));
    }

    /// Resolve a specification to a mode object.
    pub fn get_mode(&self, spec: &ModeSpec) -> Result<Arc<dyn Mode>, ConfigError> {
        let factories = self.factories.read().expect("mode registry lock poisoned");
        match factories.get(&spec.name) {
            Some(factory) => Ok(factory(spec)),
            None => Err(ConfigError::UnknownMode(spec.name.clone())),
        }
    }

    /// Registered mode names, sorted.
    pub fn names(&self) -> Vec<String> {
        let factories = self.factories.read().expect("mode registry lock poisoned");
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ModeRegistry {
    fn default() -> ModeRegistry {
        ModeRegistry::new()
    }
}

impl fmt::Debug for ModeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeRegistry")
            .field("modes", &self.names())
            .finish()
    }
}

/// Handle to the embedding editor, passed through dynamic `start`
/// callbacks and recorded on the combinator at construction.
#[derive(Clone)]
pub struct EditorContext {
    pub tab_size: usize,
    pub indent_unit: usize,
    pub registry: Arc<ModeRegistry>,
}

impl Default for EditorContext {
    fn default() -> EditorContext {
        EditorContext {
            tab_size: 4,
            indent_unit: 2,
            registry: ModeRegistry::global(),
        }
    }
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("tab_size", &self.tab_size)
            .field("indent_unit", &self.indent_unit)
            .finish()
    }
}
