//! Theme configuration for the render command
//!
//! Maps style classes to terminal colors. A token's style string is a
//! space-separated class list; the first class with a mapping wins, so a
//! theme can color `"tag tag-open"` with just a `tag` entry.
//!
//! **YAML Configuration:** themes load from YAML files:
//!
//! ```yaml
//! styles:
//!   keyword: magenta
//!   string: green
//!   tag: cyan
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

/// On-disk theme shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub styles: HashMap<String, String>,
}

/// A resolved theme: style class to ANSI color sequence.
#[derive(Debug, Clone)]
pub struct Theme {
    colors: HashMap<String, String>,
}

const COLOR_CODES: &[(&str, &str)] = &[
    ("black", "30"),
    ("red", "31"),
    ("green", "32"),
    ("yellow", "33"),
    ("blue", "34"),
    ("magenta", "35"),
    ("cyan", "36"),
    ("white", "37"),
    ("gray", "90"),
];

fn color_code(name: &str) -> Option<&'static str> {
    COLOR_CODES
        .iter()
        .find(|(color, _)| *color == name)
        .map(|(_, code)| *code)
}

impl Theme {
    /// Load a theme from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Theme, Box<dyn std::error::Error>> {
        let config: ThemeConfig = serde_yaml::from_str(yaml)?;
        Ok(Theme::from_config(&config))
    }

    /// Load a theme from a YAML file.
    pub fn from_yaml_file(path: &str) -> Result<Theme, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Theme::from_yaml(&contents)
    }

    fn from_config(config: &ThemeConfig) -> Theme {
        let colors = config
            .styles
            .iter()
            .filter_map(|(style, color)| {
                color_code(color).map(|code| (style.clone(), code.to_string()))
            })
            .collect();
        Theme { colors }
    }

    /// Color `text` according to the first mapped class in `style`.
    pub fn paint(&self, style: Option<&str>, text: &str) -> String {
        let code = style.and_then(|classes| {
            classes
                .split_whitespace()
                .find_map(|class| self.colors.get(class))
        });
        match code {
            Some(code) => format!("\x1b[{}m{}\x1b[0m", code, text),
            None => text.to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Theme {
        let mut styles = HashMap::new();
        styles.insert("keyword".to_string(), "magenta".to_string());
        styles.insert("string".to_string(), "green".to_string());
        styles.insert("comment".to_string(), "gray".to_string());
        styles.insert("number".to_string(), "yellow".to_string());
        styles.insert("variable".to_string(), "blue".to_string());
        styles.insert("tag".to_string(), "cyan".to_string());
        styles.insert("bracket".to_string(), "cyan".to_string());
        styles.insert("note".to_string(), "yellow".to_string());
        Theme::from_config(&ThemeConfig { styles })
    }
}
