//! Mask synthesis from mode meta
//!
//! Modes that expose string quotes, a string escape, or comment markers
//! get mask configurations synthesized for them, so an embedder gets
//! "strings, escapes, and comments do not terminate me" for free.
//!
//! Synthesis is memoized in an append-only, key-addressed cache. The key
//! is the full meta (including the escape character, so different escape
//! alphabets do not collide) plus the configuration level the masks are
//! attached at. Compilation is idempotent, so concurrent readers at worst
//! build the same value twice.

use crate::nest::config::{Config, DelimVariant};
use crate::nest::mode::ModeMeta;
use crate::nest::pattern::Pattern;
use crate::nest::search::default_comp;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

static CACHE: Lazy<Mutex<HashMap<(ModeMeta, u32), Vec<Arc<Config>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Mask configurations for a mode's meta, attached at level `clv`.
pub fn for_meta(meta: &ModeMeta, clv: u32) -> Vec<Arc<Config>> {
    if meta.is_empty() {
        return Vec::new();
    }
    let key = (meta.clone(), clv);
    let mut cache = CACHE.lock().expect("meta mask cache lock poisoned");
    cache.entry(key).or_insert_with(|| build(meta, clv)).clone()
}

fn build(meta: &ModeMeta, clv: u32) -> Vec<Arc<Config>> {
    let mut masks = Vec::new();

    for quote in &meta.string_quotes {
        let nested = match meta.string_escape {
            None => Vec::new(),
            Some(escape) => vec![escape_mask(escape, clv + 1)],
        };
        let quote_text = quote.to_string();
        masks.push(mask_config(
            Pattern::literal(&quote_text),
            Some(Pattern::literal(&quote_text)),
            nested,
            clv,
        ));
    }

    for marker in &meta.line_comments {
        // No close: the comment ends at the start of the next line.
        masks.push(mask_config(Pattern::literal(marker), None, Vec::new(), clv));
    }

    if let Some((open, close)) = &meta.block_comment {
        masks.push(mask_config(
            Pattern::literal(open),
            Some(Pattern::literal(close)),
            Vec::new(),
            clv,
        ));
    }

    masks
}

fn escape_mask(escape: char, clv: u32) -> Arc<Config> {
    // The escape region is the escape character plus the one character it
    // escapes, which the close consumes.
    mask_config(
        Pattern::literal(&escape.to_string()),
        Some(Pattern::regex(".").expect("single-char pattern is valid")),
        Vec::new(),
        clv,
    )
}

fn mask_config(
    open: Pattern,
    close: Option<Pattern>,
    masks: Vec<Arc<Config>>,
    clv: u32,
) -> Arc<Config> {
    Arc::new(Config {
        open,
        close,
        mode: None,
        variant: DelimVariant::Static,
        mask: true,
        masks,
        suffixes: Vec::new(),
        inline: false,
        inner_style: None,
        delim_open_style: None,
        delim_close_style: None,
        comp: Arc::new(default_comp),
        clv,
        start: None,
        indent: None,
        electric: None,
    })
}
