//! OpenAI-compatible Whisper transcription
//!
//! Posts the recording as multipart form data to
//! `{endpoint}/v1/audio/transcriptions` and returns the `text` field.
//! Works against OpenAI and self-hosted servers exposing the same route.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use voice_order_config::SttConfig;
use voice_order_core::{AudioRef, Error, Result, SpeechToText};

use crate::PipelineError;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Whisper STT over HTTP
pub struct WhisperStt {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    language: String,
}

impl WhisperStt {
    pub fn new(config: &SttConfig) -> std::result::Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PipelineError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            language: config.language.clone(),
        })
    }

    async fn load_audio(&self, audio: &AudioRef) -> std::result::Result<Vec<u8>, PipelineError> {
        if audio.is_remote() {
            let response = self.client.get(&audio.location).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PipelineError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            return Ok(response.bytes().await?.to_vec());
        }

        Ok(tokio::fs::read(&audio.location).await?)
    }

    async fn request(&self, audio: &AudioRef) -> std::result::Result<String, PipelineError> {
        let bytes = self.load_audio(audio).await?;
        if bytes.is_empty() {
            return Err(PipelineError::InvalidResponse(format!(
                "Audio '{}' is empty",
                audio.file_name
            )));
        }

        let part = Part::bytes(bytes)
            .file_name(audio.file_name.clone())
            .mime_str(&audio.content_type)?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "json");

        let mut request = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.endpoint))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text.trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperStt {
    async fn transcribe(&self, audio: &AudioRef) -> Result<String> {
        let text = self
            .request(audio)
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        tracing::debug!(file = %audio.file_name, chars = text.chars().count(), "Transcribed audio");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "whisper"
    }
}
