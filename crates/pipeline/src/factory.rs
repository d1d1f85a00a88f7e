//! Provider selection
//!
//! Providers are resolved once from configuration at startup. Call handling
//! never inspects which provider is in use.

use std::sync::Arc;
use voice_order_config::{SttConfig, SttProviderKind, TtsConfig, TtsProviderKind};
use voice_order_core::{SpeechToText, TextToSpeech};

use crate::{DisabledStt, ElevenLabsTts, PipelineError, WhisperStt};

/// Build the configured speech-to-text provider
pub fn create_stt(config: &SttConfig) -> Result<Arc<dyn SpeechToText>, PipelineError> {
    let stt: Arc<dyn SpeechToText> = match config.provider {
        SttProviderKind::Whisper => Arc::new(WhisperStt::new(config)?),
        SttProviderKind::Disabled => Arc::new(DisabledStt),
    };

    tracing::info!(provider = stt.provider_name(), "Speech-to-text provider ready");
    Ok(stt)
}

/// Build the configured text-to-speech provider.
///
/// `None` means the telephony provider speaks prompts itself.
pub fn create_tts(config: &TtsConfig) -> Result<Option<Arc<dyn TextToSpeech>>, PipelineError> {
    let tts: Option<Arc<dyn TextToSpeech>> = match config.provider {
        TtsProviderKind::ElevenLabs => Some(Arc::new(ElevenLabsTts::new(config)?)),
        TtsProviderKind::Telephony => None,
    };

    tracing::info!(
        provider = tts.as_ref().map_or("telephony", |t| t.provider_name()),
        "Text-to-speech provider ready"
    );
    Ok(tts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_providers() {
        let stt = create_stt(&SttConfig::default()).unwrap();
        assert_eq!(stt.provider_name(), "disabled");

        let tts = create_tts(&TtsConfig::default()).unwrap();
        assert!(tts.is_none());
    }

    #[test]
    fn test_selects_configured_providers() {
        let stt = create_stt(&SttConfig {
            provider: SttProviderKind::Whisper,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(stt.provider_name(), "whisper");

        let tts = create_tts(&TtsConfig {
            provider: TtsProviderKind::ElevenLabs,
            api_key: Some("key".to_string()),
            voice_id: Some("voice".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tts.map(|t| t.provider_name().to_string()), Some("elevenlabs".to_string()));
    }

    #[test]
    fn test_elevenlabs_without_key_fails() {
        let result = create_tts(&TtsConfig {
            provider: TtsProviderKind::ElevenLabs,
            ..Default::default()
        });
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }
}
