//! Centralized defaults for the voice ordering agent
//!
//! Settings structs take their serde defaults from here so the compiled
//! defaults and `config/default.yaml` do not drift apart silently.

/// Upstream service endpoints
pub mod endpoints {
    /// OpenAI-compatible transcription API
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com";

    /// ElevenLabs synthesis API
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";
}

/// Upstream request timeouts
pub mod timeouts {
    /// STT request timeout
    pub const STT_TIMEOUT_MS: u64 = 10_000;

    /// TTS request timeout
    pub const TTS_TIMEOUT_MS: u64 = 15_000;

    /// HTTP request timeout for the server
    pub const SERVER_REQUEST_SECS: u64 = 30;
}

/// Model identifiers
pub mod models {
    pub const WHISPER: &str = "whisper-1";
    pub const ELEVENLABS_MULTILINGUAL: &str = "eleven_multilingual_v2";
}

/// Session store sizing
pub mod sessions {
    pub const MAX_SESSIONS: usize = 1000;

    /// Calls whose hangup webhook never arrived are dropped after this long
    pub const IDLE_TIMEOUT_SECS: u64 = 3600;

    pub const CLEANUP_INTERVAL_SECS: u64 = 60;

    /// Turns of history kept per call
    pub const HISTORY_CAP: usize = 50;
}

/// Dialogue behavior
pub mod dialogue {
    pub const ETA_MINUTES: u32 = 30;

    /// Quantities above this are clamped
    pub const MAX_QUANTITY: u32 = 20;
}

/// Telephony defaults
pub mod telephony {
    /// Syrian Arabic
    pub const LANGUAGE: &str = "ar-SY";

    pub const GATHER_TIMEOUT_SECS: u32 = 5;

    /// Call statuses that end a call
    pub const TERMINAL_STATUSES: &[&str] = &["completed", "busy", "failed", "no-answer", "canceled"];
}
