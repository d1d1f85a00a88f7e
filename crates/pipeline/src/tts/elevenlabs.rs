//! ElevenLabs synthesis
//!
//! `POST {endpoint}/v1/text-to-speech/{voice_id}` with the `xi-api-key`
//! header. The response body is the encoded audio.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use voice_order_config::TtsConfig;
use voice_order_core::{AudioClip, Error, Result, TextToSpeech};

use crate::PipelineError;

const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// ElevenLabs TTS over HTTP
pub struct ElevenLabsTts {
    client: Client,
    endpoint: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTts {
    pub fn new(config: &TtsConfig) -> std::result::Result<Self, PipelineError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PipelineError::Configuration("ElevenLabs API key not set".to_string()))?;
        let voice_id = config
            .voice_id
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::Configuration("ElevenLabs voice id not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PipelineError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            voice_id,
            model_id: config.model_id.clone(),
        })
    }

    async fn request(&self, text: &str) -> std::result::Result<AudioClip, PipelineError> {
        let body = SynthesisRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/text-to-speech/{}", self.endpoint, self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, DEFAULT_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| v.starts_with("audio/"))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(PipelineError::InvalidResponse(
                "ElevenLabs returned empty audio".to_string(),
            ));
        }

        Ok(AudioClip::new(bytes.to_vec(), content_type))
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("Nothing to synthesize".to_string()));
        }

        let clip = self
            .request(text)
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        tracing::debug!(bytes = clip.bytes.len(), content_type = %clip.content_type, "Synthesized prompt");
        Ok(clip)
    }

    fn provider_name(&self) -> &str {
        "elevenlabs"
    }
}
