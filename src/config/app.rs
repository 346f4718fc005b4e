//! Main application configuration
//!
//! This module defines the primary configuration structures for the quiz,
//! including TOML file and environment variable loading and validation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::rating::RatingConfig;
use crate::storage::{StateKeys, DEFAULT_KEY_PREFIX};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub storage: StorageSettings,
    pub quiz: QuizSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name shown in logs
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where and under which keys quiz state is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file holding the key-value store
    pub state_path: PathBuf,
    /// Prefix for the rating, history and statistics keys
    pub key_prefix: String,
}

/// Quiz front end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Bank files played when none are given on the command line
    pub bank_paths: Vec<PathBuf>,
    /// Label of a bank combined from several files
    pub general_label: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "quiz-elo".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("quiz-state.json"),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            bank_paths: Vec::new(),
            general_label: "General Knowledge".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn state_keys(&self) -> StateKeys {
        StateKeys::with_prefix(&self.key_prefix)
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&contents)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides looked up by environment variable name
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Some(rating) = lookup("QUIZ_INITIAL_RATING") {
            self.rating.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid QUIZ_INITIAL_RATING value: {}", rating))?;
        }
        if let Some(k) = lookup("QUIZ_BASE_K_FACTOR") {
            self.rating.k_factor.base = k
                .parse()
                .map_err(|_| anyhow!("Invalid QUIZ_BASE_K_FACTOR value: {}", k))?;
        }

        // Storage settings
        if let Some(path) = lookup("QUIZ_STATE_PATH") {
            self.storage.state_path = PathBuf::from(path);
        }
        if let Some(prefix) = lookup("QUIZ_KEY_PREFIX") {
            self.storage.key_prefix = prefix;
        }

        // Quiz settings
        if let Some(label) = lookup("QUIZ_GENERAL_LABEL") {
            self.quiz.general_label = label;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    // Validate storage settings
    if config.storage.state_path.as_os_str().is_empty() {
        return Err(anyhow!("State path cannot be empty"));
    }

    if config.quiz.general_label.trim().is_empty() {
        return Err(anyhow!("General bank label cannot be empty"));
    }

    Ok(())
}
