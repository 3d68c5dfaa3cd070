//! Configuration management for latelier.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so an empty or partial file is valid.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variables consulted, in order, when no key is configured.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

impl GeminiConfig {
    /// The configured key, else the first non-empty key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub model: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-pro-preview".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub model: String,
    pub voice: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub default_speed: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            sample_rate: 24000,
            channels: 1,
            default_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub cjk_font: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub analysis: AnalysisConfig,
    pub speech: SpeechConfig,
    pub history: HistoryConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/latelier/config.yaml
    /// 3. /etc/latelier/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/latelier/config.yaml")),
                Some(PathBuf::from("/etc/latelier/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(contents)
    }
}
