//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{dialogue, sessions, timeouts};
use crate::{
    ConfigError, MenuConfig, NluConfig, OrdersConfig, PromptsConfig, SttConfig, SttProviderKind,
    TelephonyConfig, TtsConfig, TtsProviderKind,
};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Session store sizing and expiry
    #[serde(default)]
    pub sessions: SessionsConfig,

    #[serde(default)]
    pub dialogue: DialogueConfig,

    #[serde(default)]
    pub menu: MenuConfig,

    #[serde(default)]
    pub nlu: NluConfig,

    #[serde(default)]
    pub prompts: PromptsConfig,

    #[serde(default)]
    pub stt: SttConfig,

    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub orders: OrdersConfig,

    #[serde(default)]
    pub telephony: TelephonyConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_sessions()?;
        self.validate_dialogue()?;
        self.menu.validate()?;
        self.nlu.validate()?;
        self.prompts.validate()?;
        self.validate_providers()?;

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::invalid("server.port", "Port cannot be 0"));
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "server.timeout_seconds",
                "Timeout must be at least 1 second",
            ));
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        if self.tts.provider != TtsProviderKind::Telephony && server.public_base_url.is_none() {
            tracing::warn!(
                "server.public_base_url is not set; synthesized audio will be linked relative to the webhook host"
            );
        }

        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        let sessions = &self.sessions;

        if sessions.max_sessions == 0 {
            return Err(ConfigError::invalid(
                "sessions.max_sessions",
                "Must allow at least 1 concurrent call",
            ));
        }

        if sessions.history_cap == 0 {
            return Err(ConfigError::invalid(
                "sessions.history_cap",
                "History cap must be at least 1",
            ));
        }

        if sessions.idle_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "sessions.idle_timeout_secs",
                "Idle timeout must be at least 1 second",
            ));
        }

        if sessions.cleanup_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "sessions.cleanup_interval_secs",
                "Cleanup interval must be at least 1 second",
            ));
        }

        Ok(())
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        if self.dialogue.eta_minutes == 0 {
            return Err(ConfigError::invalid(
                "dialogue.eta_minutes",
                "ETA must be at least 1 minute",
            ));
        }

        if self.dialogue.max_quantity == 0 {
            return Err(ConfigError::invalid(
                "dialogue.max_quantity",
                "Max quantity must be at least 1",
            ));
        }

        Ok(())
    }

    fn validate_providers(&self) -> Result<(), ConfigError> {
        if self.tts.provider == TtsProviderKind::ElevenLabs {
            if self.tts.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::invalid(
                    "tts.api_key",
                    "ElevenLabs requires an API key (VOICE_ORDER__TTS__API_KEY)",
                ));
            }
            if self.tts.voice_id.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::invalid(
                    "tts.voice_id",
                    "ElevenLabs requires a voice id",
                ));
            }
        }

        if self.stt.provider == SttProviderKind::Whisper && self.stt.api_key.is_none() {
            if self.environment.is_strict() {
                return Err(ConfigError::invalid(
                    "stt.api_key",
                    "Whisper transcription requires an API key outside development",
                ));
            }
            tracing::warn!("Whisper STT configured without an API key");
        }

        if self.stt.timeout_ms == 0 || self.tts.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "stt.timeout_ms/tts.timeout_ms",
                "Provider timeouts must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Externally reachable base URL, used for `<Play>` audio links
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    timeouts::SERVER_REQUEST_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            public_base_url: None,
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum concurrent calls
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Calls idle for longer than this are dropped by the cleanup task
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Turns of history kept per call
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_max_sessions() -> usize {
    sessions::MAX_SESSIONS
}
fn default_idle_timeout() -> u64 {
    sessions::IDLE_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    sessions::CLEANUP_INTERVAL_SECS
}
fn default_history_cap() -> usize {
    sessions::HISTORY_CAP
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
            history_cap: default_history_cap(),
        }
    }
}

/// Dialogue behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Minutes from placement to estimated arrival
    #[serde(default = "default_eta_minutes")]
    pub eta_minutes: u32,

    /// Per-mention quantity ceiling
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

fn default_eta_minutes() -> u32 {
    dialogue::ETA_MINUTES
}
fn default_max_quantity() -> u32 {
    dialogue::MAX_QUANTITY
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            eta_minutes: default_eta_minutes(),
            max_quantity: default_max_quantity(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder and serve /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOICE_ORDER__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    if let Some(env_name) = env {
        let env_file = config_dir.join(env_name);
        if !env_file.with_extension("yaml").exists() && !env_file.with_extension("yml").exists() {
            tracing::warn!(
                path = %env_file.display(),
                "Environment config file not found, using defaults"
            );
        }
        builder = builder.add_source(File::from(env_file).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_ORDER")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_order_core::Intent;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.sessions.idle_timeout_secs, 3600);
        assert_eq!(settings.dialogue.eta_minutes, 30);
        assert_eq!(settings.telephony.language, "ar-SY");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();

        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
        settings.server.timeout_seconds = 30;

        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_session_validation() {
        let mut settings = Settings::default();

        settings.sessions.max_sessions = 0;
        assert!(settings.validate_sessions().is_err());
        settings.sessions.max_sessions = 10;

        settings.sessions.history_cap = 0;
        assert!(settings.validate_sessions().is_err());
        settings.sessions.history_cap = 5;

        assert!(settings.validate_sessions().is_ok());
    }

    #[test]
    fn test_zero_eta_rejected() {
        let mut settings = Settings::default();
        settings.dialogue.eta_minutes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_elevenlabs_requires_credentials() {
        let mut settings = Settings::default();
        settings.tts.provider = TtsProviderKind::ElevenLabs;
        assert!(settings.validate_providers().is_err());

        settings.tts.api_key = Some("key".to_string());
        assert!(settings.validate_providers().is_err());

        settings.tts.voice_id = Some("voice".to_string());
        assert!(settings.validate_providers().is_ok());
    }

    #[test]
    fn test_production_server_needs_no_credentials() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.server.cors_origins = vec!["https://orders.example.com".to_string()];
        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_load_from_yaml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.yaml"),
            "server:\n  port: 9000\ndialogue:\n  eta_minutes: 45\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.yaml"),
            "environment: staging\nsessions:\n  max_sessions: 5\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.dialogue.eta_minutes, 45);
        assert_eq!(settings.sessions.max_sessions, 5);
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        // untouched sections keep compiled defaults
        assert_eq!(settings.menu.items.len(), 6);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "dialogue:\n  eta_minutes: 0\n").unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_keyword_table_round_trips_through_yaml() {
        let settings = Settings::default();
        let yaml = serde_yaml::to_string(&settings.nlu).unwrap();
        let parsed: NluConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.intents.len(), settings.nlu.intents.len());
        assert_eq!(parsed.intents[0].intent, Intent::Menu);
    }
}
