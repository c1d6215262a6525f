//! Factories for test fixtures.

use crate::nest::common::ConfigError;
use crate::nest::config::ConfigSpec;
use crate::nest::mode::Mode;
use crate::nest::nesting::NestingMode;
use crate::nest::testing::modes::{FlatMode, WordMode};
use std::sync::Arc;

/// A flat mode: one token per line region, fixed style.
pub fn mk_flat(name: &str, style: Option<&str>) -> Arc<dyn Mode> {
    Arc::new(FlatMode::new(name, style))
}

/// A word mode: alphanumeric runs styled, everything else unstyled.
pub fn mk_words(name: &str, style: &str) -> Arc<dyn Mode> {
    Arc::new(WordMode::new(name, style))
}

/// A nesting tokenizer over `host` with the given configurations.
pub fn mk_nesting(
    host: Arc<dyn Mode>,
    specs: Vec<ConfigSpec>,
) -> Result<NestingMode, ConfigError> {
    NestingMode::new(host, specs)
}

/// An expected `(text, style)` pair.
pub fn tok(text: &str, style: Option<&str>) -> (String, Option<String>) {
    (text.to_string(), style.map(|s| s.to_string()))
}
