//! Configuration - Per-Session Settings From TOML
//!
//! ```toml
//! [editor]
//! brand_logo = "https://cdn.example.com/logo.png"
//!
//! [editor.colors]
//! primary = "#ff5a00"
//!
//! [editor.default_footer]
//! company_name = "Acme"
//! address = "1 Main St\nSpringfield"
//!
//! [[editor.variables]]
//! key = "first_name"
//! label = "First name"
//!
//! [preview]
//! command = "npx"
//! args = ["mjml", "-i", "-s"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl BuilderConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Editing-surface configuration, built once per session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Overrides for the default theme palette
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub brand_logo: Option<String>,
    #[serde(default)]
    pub default_footer: Option<DefaultFooter>,
    #[serde(default)]
    pub variables: Vec<EmailVariable>,
}

impl EditorConfig {
    /// Colours offered by pickers: the default theme with overrides applied
    pub fn palette(&self) -> BTreeMap<String, String> {
        let mut palette = default_colors();
        palette.extend(self.colors.clone());
        palette
    }
}

fn default_colors() -> BTreeMap<String, String> {
    [
        ("primary", "#007bff"),
        ("secondary", "#6c757d"),
        ("success", "#28a745"),
        ("danger", "#dc3545"),
        ("warning", "#ffc107"),
        ("info", "#17a2b8"),
        ("light", "#f8f9fa"),
        ("dark", "#343a40"),
        ("white", "#ffffff"),
        ("black", "#000000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFooter {
    pub company_name: String,
    pub address: String,
}

/// A personalization variable, inserted into text as `{{key}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVariable {
    pub key: String,
    pub label: String,
}

impl EmailVariable {
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_command")]
    pub command: String,
    #[serde(default = "default_preview_args")]
    pub args: Vec<String>,
}

fn default_preview_command() -> String {
    "mjml".to_string()
}

fn default_preview_args() -> Vec<String> {
    ["-i", "-s", "--config.validationLevel", "soft"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            command: default_preview_command(),
            args: default_preview_args(),
        }
    }
}
