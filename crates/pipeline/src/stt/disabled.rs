use async_trait::async_trait;
use voice_order_core::{AudioRef, Error, Result, SpeechToText};

/// Placeholder for deployments where the telephony provider transcribes.
///
/// Every audio turn fails with a transcription error, which the orchestrator
/// turns into an apology and hangup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStt;

#[async_trait]
impl SpeechToText for DisabledStt {
    async fn transcribe(&self, audio: &AudioRef) -> Result<String> {
        tracing::warn!(file = %audio.file_name, "Audio turn received but speech-to-text is disabled");
        Err(Error::Transcription(
            "speech-to-text provider is disabled".to_string(),
        ))
    }

    fn provider_name(&self) -> &str {
        "disabled"
    }
}
