use crate::platform::RecognizerSettings;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voice-search".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub default_language: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
    pub test_capture_timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_language: "en-US".to_string(),
            continuous: false,
            interim_results: true,
            max_alternatives: 1,
            test_capture_timeout_secs: 5,
        }
    }
}

impl VoiceConfig {
    /// Recognizer settings for the configured default language
    pub fn recognizer_settings(&self) -> RecognizerSettings {
        RecognizerSettings {
            lang: self.default_language.clone(),
            continuous: self.continuous,
            interim_results: self.interim_results,
            max_alternatives: self.max_alternatives,
        }
    }

    pub fn test_capture_timeout(&self) -> Duration {
        Duration::from_secs(self.test_capture_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// How many registry entries the selector shows as popular
    pub popular_count: usize,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self { popular_count: 8 }
    }
}

impl Config {
    /// Load from a config file, with `VOICE_SEARCH__SECTION__KEY` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VOICE_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
