use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use which::which;

use crate::{BitError, Result};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root of the site; relative paths below resolve against it
    pub site_root: PathBuf,

    /// JSON file holding the list of bits, newest first
    pub bits_file: PathBuf,

    /// Editor command; shell-style words, the file path is appended
    pub editor_command: Option<String>,

    /// Command that rebuilds the site, run in `site_root`. `None` skips it.
    pub rebuild_command: Option<String>,

    /// Model asked to structure the input
    pub model: String,

    /// Response token cap for the structuring call
    pub max_tokens: u32,

    /// Base URL of the messages API
    pub api_base_url: String,

    /// Where edit sessions create their temp files (platform default if unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            bits_file: PathBuf::from("data").join("bits.json"),
            editor_command: None,
            rebuild_command: Some("python3 build_bits.py".to_string()),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            temp_dir: None,
        }
    }
}

impl Config {
    /// Loads settings from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| BitError::ConfigError {
            message: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&text).map_err(|e| BitError::ConfigError {
            message: format!("Invalid config {}: {}", path.display(), e),
        })
    }

    /// Applies `ANTHROPIC_BASE_URL` / `ANTHROPIC_MODEL` style overrides
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup("ANTHROPIC_BASE_URL")) {
            self.api_base_url = url;
        }
        if let Some(model) = non_empty(lookup("ANTHROPIC_MODEL")) {
            self.model = model;
        }
    }

    /// Path of the bits store with `site_root` applied
    pub fn bits_path(&self) -> PathBuf {
        self.site_root.join(&self.bits_file)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        // First try the configured editor
        if let Some(editor) = non_empty(self.editor_command.clone()) {
            return editor;
        }

        // Then the usual environment variables
        for var in ["EDITOR", "VISUAL"] {
            if let Some(editor) = non_empty(lookup(var)) {
                return editor;
            }
        }

        for editor in &["vim", "vi", "nano"] {
            if which(editor).is_ok() {
                return editor.to_string();
            }
        }
        "vim".to_string()
    }

    /// Fixes the editor choice into the config so later stages never consult
    /// the environment
    pub fn resolve_editor<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let editor = self.get_editor_command(lookup);
        debug!("Using editor: {}", editor);
        self.editor_command = Some(editor);
    }
}

/// Reads the API key, failing when it is unset or blank
pub fn api_key_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(API_KEY_VAR)).ok_or_else(|| BitError::ConfigError {
        message: format!("{} environment variable not set", API_KEY_VAR),
    })
}

/// Environment lookup backed by the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
