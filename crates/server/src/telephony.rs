//! Telephony webhooks
//!
//! Twilio-style form posts in, TwiML out. Each webhook is an independent
//! request; the orchestrator ties them together by `CallSid`.

use axum::extract::State;
use axum::Form;
use serde::Deserialize;
use voice_order_agent::{EndOutcome, TurnOutcome};
use voice_order_config::constants::telephony::TERMINAL_STATUSES;
use voice_order_core::AudioRef;

use crate::state::AppState;
use crate::twiml::TwimlResponse;

/// Where `<Gather>` posts the caller's speech
pub const SPEECH_ACTION: &str = "/sip/handle_speech";

/// `POST /sip/incoming_call`
#[derive(Debug, Deserialize)]
pub struct IncomingCallForm {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "To", default)]
    pub to: String,
}

/// `POST /sip/handle_speech`
#[derive(Debug, Deserialize)]
pub struct SpeechForm {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
    #[serde(rename = "Confidence", default)]
    pub confidence: Option<f32>,
    /// Raw recording, used when the provider sent no transcript
    #[serde(rename = "RecordingUrl", default)]
    pub recording_url: Option<String>,
}

/// `POST /sip/call_status`
#[derive(Debug, Deserialize)]
pub struct CallStatusForm {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "CallStatus", default)]
    pub call_status: String,
}

/// Telephony settings copied out of the config lock
struct VoiceSettings {
    language: String,
    gather_timeout_secs: u32,
    public_base_url: Option<String>,
    no_input_goodbye: String,
}

impl VoiceSettings {
    fn from_state(state: &AppState) -> Self {
        let config = state.get_config();
        Self {
            language: config.telephony.language.clone(),
            gather_timeout_secs: config.telephony.gather_timeout_secs,
            public_base_url: config.server.public_base_url.clone(),
            no_input_goodbye: config.prompts.no_input_goodbye.clone(),
        }
    }

    /// The outcome's prompt as `<Play>` when a clip exists, else `<Say>`
    fn speak(&self, outcome: &TurnOutcome) -> TwimlResponse {
        match &outcome.audio {
            Some(audio) => TwimlResponse::new().play(self.audio_url(audio)),
            None => TwimlResponse::new().say(outcome.prompt.as_str(), self.language.as_str()),
        }
    }

    fn audio_url(&self, audio: &AudioRef) -> String {
        let base = self
            .public_base_url
            .as_deref()
            .map(|b| b.trim_end_matches('/'))
            .unwrap_or_default();
        format!("{}/audio/{}", base, audio.file_name)
    }

    /// Continue listening, or say the prompt and hang up
    fn respond(&self, outcome: &TurnOutcome) -> TwimlResponse {
        if outcome.hangup {
            return self.speak(outcome).hangup();
        }

        TwimlResponse::new()
            .gather(
                SPEECH_ACTION,
                self.language.as_str(),
                self.gather_timeout_secs,
                self.speak(outcome),
            )
            .say(self.no_input_goodbye.as_str(), self.language.as_str())
            .hangup()
    }
}

pub async fn incoming_call(
    State(state): State<AppState>,
    Form(form): Form<IncomingCallForm>,
) -> TwimlResponse {
    tracing::info!(call_id = %form.call_sid, from = %form.from, to = %form.to, "Incoming call");

    let outcome = state
        .orchestrator
        .start_call(&form.call_sid, &form.from, &form.to)
        .await;

    VoiceSettings::from_state(&state).respond(&outcome)
}

pub async fn handle_speech(
    State(state): State<AppState>,
    Form(form): Form<SpeechForm>,
) -> TwimlResponse {
    let speech = form.speech_result.trim();
    tracing::debug!(
        call_id = %form.call_sid,
        confidence = ?form.confidence,
        chars = speech.chars().count(),
        "Speech received"
    );

    let outcome = match form.recording_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) if speech.is_empty() => {
            let recording = AudioRef::remote(url, "audio/wav");
            state
                .orchestrator
                .handle_audio_turn(&form.call_sid, &recording)
                .await
        }
        _ => state.orchestrator.handle_turn(&form.call_sid, speech).await,
    };

    // the session is released by the status callback once the caller has
    // heard the last clip
    VoiceSettings::from_state(&state).respond(&outcome)
}

pub async fn call_status(
    State(state): State<AppState>,
    Form(form): Form<CallStatusForm>,
) -> TwimlResponse {
    let status = form.call_status.to_ascii_lowercase();

    if TERMINAL_STATUSES.contains(&status.as_str()) {
        if let EndOutcome::Ended(context) = state.orchestrator.end_call(&form.call_sid).await {
            tracing::info!(
                call_id = %form.call_sid,
                status = %status,
                duration_secs = context.duration().num_seconds(),
                "Call ended"
            );
        }
    } else {
        tracing::debug!(call_id = %form.call_sid, status = %status, "Call status update");
    }

    TwimlResponse::new()
}
