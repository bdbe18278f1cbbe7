//! Configuration management for Aura
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/aura/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use url::Url;

use crate::core::error::{AuraError, Result};
use crate::llm::envelope::{GenerationConfig, SafetySetting};

/// Value shipped in sample configs in place of a real key
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_AI_API_KEY_HERE";

/// Where to get a Gemini API key
pub const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// Main configuration for Aura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion service connection
    pub gemini: GeminiConfig,
    /// Sampling parameters sent with every request
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Content-safety thresholds sent with every request
    #[serde(default = "SafetySetting::defaults")]
    pub safety: Vec<SafetySetting>,
    /// Conversation limits
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Persona preamble
    #[serde(default)]
    pub persona: PersonaConfig,
    /// Terminal front-end settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Gemini API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (GOOGLE_AI_API_KEY)
    pub api_key: String,
    /// API root, without the model path
    pub base_url: String,
    /// Model name, e.g. gemini-2.0-flash-exp
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Conversation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum number of turns kept (and sent) before the oldest is dropped
    /// Default: 50
    pub max_history: usize,
}

/// Persona preamble sent ahead of the history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// System instruction, sent in the user role
    pub system_prompt: String,
    /// Model acknowledgment that follows the instruction
    pub acknowledgment: String,
}

/// Terminal front-end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether to show debug logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            generation: GenerationConfig::default(),
            safety: SafetySetting::defaults(),
            conversation: ConversationConfig::default(),
            persona: PersonaConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("GOOGLE_AI_API_KEY")
                .unwrap_or_else(|_| API_KEY_PLACEHOLDER.to_string()),
            base_url: env::var("AURA_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            model: env::var("AURA_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: env::var("AURA_MAX_HISTORY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(50),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: crate::agent::persona::SYSTEM_PROMPT.to_string(),
            acknowledgment: crate::agent::persona::ACKNOWLEDGMENT.to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debug: env::var("AURA_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Hide all but the last four characters of a real key.
///
/// Empty and placeholder values carry no secret and are shown as they are.
pub fn mask_key(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() || key == API_KEY_PLACEHOLDER {
        return key.to_string();
    }

    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

impl GeminiConfig {
    /// Whether a usable key is set: non-empty and not the placeholder
    pub fn has_valid_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    /// Full generateContent URL, without the key
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        Url::parse(&raw)
            .map_err(|e| AuraError::config(format!("Invalid endpoint '{}': {}", raw, e)))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aura")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_or_default(&Self::config_file())
    }

    /// Load the file at `path`, falling back to defaults (which respect env
    /// vars) when it is missing or unusable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unusable config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        Self::load_from_path(&Self::config_file())
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuraError::config("Config file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AuraError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        // The message alone: the full error quotes the offending line, which
        // may be the key
        let config: Config = toml::from_str(content).map_err(|e| {
            AuraError::config(format!("Failed to parse config: {}", e.message()))
        })?;

        if config.conversation.max_history == 0 {
            return Err(AuraError::config("conversation.max_history must be at least 1"));
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| AuraError::config(format!("Failed to create config dir: {}", e)))?;
        }

        fs::write(&config_path, self.to_toml()?)
            .map_err(|e| AuraError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        self.save()?;
        Ok(Self::config_file())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AuraError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Serialize to TOML with the API key masked, for display
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.gemini.api_key = mask_key(&self.gemini.api_key);
        shown.to_toml()
    }

    /// Whether the API key is usable
    pub fn is_api_configured(&self) -> bool {
        self.gemini.has_valid_key()
    }

    /// Update the API key
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.gemini.api_key = key.into();
    }

    /// Update the model
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.gemini.model = model.into();
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        Config::default()
            .to_display_toml()
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
