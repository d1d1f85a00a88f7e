//! Upstream provider, order storage and telephony settings

use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, models, telephony, timeouts};

/// Speech-to-text backend, chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SttProviderKind {
    /// OpenAI-compatible `/v1/audio/transcriptions`
    Whisper,
    /// Transcripts arrive from the telephony provider; audio turns fail
    #[default]
    Disabled,
}

impl SttProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SttProviderKind::Whisper => "whisper",
            SttProviderKind::Disabled => "disabled",
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    #[serde(default)]
    pub provider: SttProviderKind,

    #[serde(default = "default_stt_endpoint")]
    pub endpoint: String,

    /// Set via VOICE_ORDER__STT__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_stt_model")]
    pub model: String,

    /// ISO-639-1 language hint
    #[serde(default = "default_stt_language")]
    pub language: String,

    #[serde(default = "default_stt_timeout")]
    pub timeout_ms: u64,
}

fn default_stt_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_stt_model() -> String {
    models::WHISPER.to_string()
}
fn default_stt_language() -> String {
    "ar".to_string()
}
fn default_stt_timeout() -> u64 {
    timeouts::STT_TIMEOUT_MS
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: SttProviderKind::default(),
            endpoint: default_stt_endpoint(),
            api_key: None,
            model: default_stt_model(),
            language: default_stt_language(),
            timeout_ms: default_stt_timeout(),
        }
    }
}

/// Text-to-speech backend, chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsProviderKind {
    ElevenLabs,
    /// No synthesis; the telephony provider speaks the text
    #[default]
    Telephony,
}

impl TtsProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsProviderKind::ElevenLabs => "elevenlabs",
            TtsProviderKind::Telephony => "telephony",
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: TtsProviderKind,

    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// Set via VOICE_ORDER__TTS__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub voice_id: Option<String>,

    #[serde(default = "default_tts_model")]
    pub model_id: String,

    #[serde(default = "default_tts_timeout")]
    pub timeout_ms: u64,

    /// Where synthesized clips are written and served from
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
}

fn default_tts_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}
fn default_tts_model() -> String {
    models::ELEVENLABS_MULTILINGUAL.to_string()
}
fn default_tts_timeout() -> u64 {
    timeouts::TTS_TIMEOUT_MS
}
fn default_audio_dir() -> String {
    "data/audio".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProviderKind::default(),
            endpoint: default_tts_endpoint(),
            api_key: None,
            voice_id: None,
            model_id: default_tts_model(),
            timeout_ms: default_tts_timeout(),
            audio_dir: default_audio_dir(),
        }
    }
}

/// Order storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// JSON file holding all placed orders
    #[serde(default = "default_orders_path")]
    pub storage_path: String,
}

fn default_orders_path() -> String {
    "data/orders.json".to_string()
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            storage_path: default_orders_path(),
        }
    }
}

/// Telephony webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// BCP-47 language for `<Gather>` and `<Say>`
    #[serde(default = "default_language")]
    pub language: String,

    /// Seconds of silence before `<Gather>` gives up
    #[serde(default = "default_gather_timeout")]
    pub gather_timeout_secs: u32,
}

fn default_language() -> String {
    telephony::LANGUAGE.to_string()
}
fn default_gather_timeout() -> u32 {
    telephony::GATHER_TIMEOUT_SECS
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            gather_timeout_secs: default_gather_timeout(),
        }
    }
}
