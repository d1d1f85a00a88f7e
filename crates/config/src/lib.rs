//! Configuration management for the voice ordering agent
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`VOICE_ORDER__` prefix, `__` separator)
//!
//! Menu catalog, intent keyword tables and prompt templates are ordinary
//! settings sections, so a deployment can localize or extend them without a
//! rebuild.

pub mod constants;
pub mod menu;
pub mod nlu;
pub mod prompts;
pub mod providers;
pub mod settings;

pub use menu::{MenuConfig, MenuItemConfig};
pub use nlu::{IntentKeywords, NluConfig};
pub use prompts::{render, PromptsConfig};
pub use providers::{
    OrdersConfig, SttConfig, SttProviderKind, TelephonyConfig, TtsConfig, TtsProviderKind,
};
pub use settings::{
    load_settings, load_settings_from, DialogueConfig, ObservabilityConfig,
    RuntimeEnvironment, ServerConfig, SessionsConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for voice_order_core::Error {
    fn from(err: ConfigError) -> Self {
        voice_order_core::Error::Configuration(err.to_string())
    }
}
