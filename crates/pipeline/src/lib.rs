//! Speech providers and audio storage
//!
//! - **STT**: OpenAI-compatible Whisper transcription, or disabled when the
//!   telephony provider already transcribes
//! - **TTS**: ElevenLabs synthesis
//! - **Audio store**: synthesized clips on disk, served back to the telephony
//!   provider by file name
//!
//! Providers are chosen once at startup by [`factory`]; everything downstream
//! sees only the `SpeechToText` / `TextToSpeech` traits.

pub mod audio_store;
pub mod factory;
pub mod stt;
pub mod tts;

mod error;

pub use audio_store::AudioStore;
pub use error::PipelineError;
pub use factory::{create_stt, create_tts};
pub use stt::{DisabledStt, WhisperStt};
pub use tts::ElevenLabsTts;
