//! Speech processing traits

use crate::{AudioClip, AudioRef, Result};
use async_trait::async_trait;

/// Speech-to-Text interface
///
/// Implementations:
/// - `WhisperStt` - OpenAI-compatible transcription endpoint
/// - `DisabledStt` - rejects every request, for text-only deployments
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a recorded utterance
    async fn transcribe(&self, audio: &AudioRef) -> Result<String>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Text-to-Speech interface
///
/// Implementations:
/// - `ElevenLabsTts` - ElevenLabs multilingual voices
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize a prompt into encoded audio
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
