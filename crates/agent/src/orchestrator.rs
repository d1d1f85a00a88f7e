//! Call orchestration
//!
//! Maps the three telephony events (call start, turn, call end) onto the
//! session store and dialogue engine. Speech synthesis, transcription and
//! order submission all run outside the session lock on a private copy of
//! the call's state.
//!
//! Failures stay scoped to the call: a speech provider error ends that call
//! with an apology, an order submission error is logged and the conversation
//! carries on.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use voice_order_config::render;
use voice_order_core::{
    AudioRef, DialogueStage, Intent, OrderReceipt, OrderSubmitter, SpeechToText, TextToSpeech,
};
use voice_order_pipeline::AudioStore;

use crate::{
    AgentError, CommitOutcome, DialogueEngine, DialogueState, EndOutcome, SessionStore,
};

/// Per-stage latencies of one turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnTimings {
    pub stt_ms: Option<u64>,
    pub submit_ms: Option<u64>,
    pub tts_ms: Option<u64>,
    pub total_ms: u64,
}

/// What to say back to the caller after an event
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub call_id: String,
    pub prompt: String,
    /// Synthesized prompt, when a synthesizer is configured
    pub audio: Option<AudioRef>,
    pub intent: Option<Intent>,
    pub stage: DialogueStage,
    /// Set when this turn placed an order and submission succeeded
    pub order: Option<OrderReceipt>,
    /// Set when this turn placed an order and submission failed
    pub order_error: Option<String>,
    /// The call should be hung up after the prompt
    pub hangup: bool,
    pub timings: TurnTimings,
}

impl TurnOutcome {
    fn new(call_id: &str, prompt: String, stage: DialogueStage) -> Self {
        Self {
            call_id: call_id.to_string(),
            prompt,
            audio: None,
            intent: None,
            stage,
            order: None,
            order_error: None,
            hangup: false,
            timings: TurnTimings::default(),
        }
    }
}

/// Ties the session store, dialogue engine and collaborators together
pub struct CallOrchestrator {
    store: Arc<SessionStore>,
    engine: Arc<DialogueEngine>,
    stt: Arc<dyn SpeechToText>,
    tts: Option<Arc<dyn TextToSpeech>>,
    audio: Option<AudioStore>,
    submitter: Arc<dyn OrderSubmitter>,
}

impl CallOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        engine: Arc<DialogueEngine>,
        stt: Arc<dyn SpeechToText>,
        submitter: Arc<dyn OrderSubmitter>,
    ) -> Self {
        Self {
            store,
            engine,
            stt,
            tts: None,
            audio: None,
            submitter,
        }
    }

    /// Synthesize prompts and keep the clips in `audio`
    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>, audio: AudioStore) -> Self {
        self.tts = Some(tts);
        self.audio = Some(audio);
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn engine(&self) -> &Arc<DialogueEngine> {
        &self.engine
    }

    pub fn audio_store(&self) -> Option<&AudioStore> {
        self.audio.as_ref()
    }

    pub fn stt_provider(&self) -> &str {
        self.stt.provider_name()
    }

    pub fn tts_provider(&self) -> Option<&str> {
        self.tts.as_ref().map(|t| t.provider_name())
    }

    /// Call-start event: register the call and produce the welcome prompt
    pub async fn start_call(&self, call_id: &str, from_number: &str, to_number: &str) -> TurnOutcome {
        let started = Instant::now();

        if let Err(e) = self.store.create(call_id, from_number, to_number) {
            return self.refuse(call_id, e);
        }
        metrics::counter!("voice_order_calls_started_total").increment(1);
        metrics::gauge!("voice_order_active_calls").set(self.store.count() as f64);

        let mut outcome = TurnOutcome::new(
            call_id,
            self.engine.welcome_prompt().to_string(),
            DialogueStage::Greeting,
        );

        if !self.speak(&mut outcome).await {
            return self.fail_call(call_id, "tts").await;
        }

        outcome.timings.total_ms = elapsed_ms(started);
        outcome
    }

    /// Turn event with text already transcribed by the telephony provider
    pub async fn handle_turn(&self, call_id: &str, utterance: &str) -> TurnOutcome {
        let started = Instant::now();

        let (mut state, generation) = match self.store.get_or_create(call_id, "", "") {
            Ok(found) => found,
            Err(e) => return self.refuse(call_id, e),
        };

        let result = self.engine.process(utterance, &mut state);
        let intent_label = result.intent.map_or("empty", |i| i.as_str());
        metrics::counter!("voice_order_turns_total", "intent" => intent_label).increment(1);

        let mut outcome = TurnOutcome::new(call_id, result.prompt.clone(), result.stage);
        outcome.intent = result.intent;
        outcome.hangup = result.intent == Some(Intent::Goodbye);

        if result.order_ready() {
            let submit_started = Instant::now();
            self.submit(call_id, &mut state, &mut outcome).await;
            outcome.timings.submit_ms = Some(elapsed_ms(submit_started));
        }

        if self.store.commit(call_id, generation, state) == CommitOutcome::Discarded {
            // nobody is listening any more
            outcome.hangup = true;
            outcome.timings.total_ms = elapsed_ms(started);
            return outcome;
        }

        if !self.speak(&mut outcome).await {
            return self.fail_call(call_id, "tts").await;
        }

        outcome.timings.total_ms = elapsed_ms(started);
        metrics::histogram!("voice_order_turn_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        tracing::info!(
            call_id = %call_id,
            intent = ?outcome.intent,
            stage = ?outcome.stage,
            order_id = ?outcome.order.as_ref().map(|o| o.order_id.as_str()),
            total_ms = outcome.timings.total_ms,
            "Turn handled"
        );
        outcome
    }

    /// Turn event carrying a recording that still needs transcription
    pub async fn handle_audio_turn(&self, call_id: &str, audio: &AudioRef) -> TurnOutcome {
        let started = Instant::now();

        let text = match self.stt.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    provider = self.stt.provider_name(),
                    error = %e,
                    "Transcription failed"
                );
                return self.fail_call(call_id, "stt").await;
            }
        };
        let stt_ms = elapsed_ms(started);
        metrics::histogram!("voice_order_stt_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(call_id = %call_id, stt_ms, chars = text.chars().count(), "Transcribed");

        let mut outcome = self.handle_turn(call_id, &text).await;
        outcome.timings.stt_ms = Some(stt_ms);
        outcome.timings.total_ms = elapsed_ms(started);
        outcome
    }

    /// Call-end event: drop the session and any stored clips
    pub async fn end_call(&self, call_id: &str) -> EndOutcome {
        let ended = self.store.end(call_id);

        if matches!(ended, EndOutcome::Ended(_)) {
            metrics::counter!("voice_order_calls_ended_total").increment(1);
            metrics::gauge!("voice_order_active_calls").set(self.store.count() as f64);
        }

        if let Some(audio) = &self.audio {
            if let Err(e) = audio.remove_for_call(call_id).await {
                tracing::warn!(call_id = %call_id, error = %e, "Failed to remove call audio");
            }
        }

        ended
    }

    async fn submit(&self, call_id: &str, state: &mut DialogueState, outcome: &mut TurnOutcome) {
        let customer_name = state.customer_name().unwrap_or_default().to_string();
        let items = state.order_items().to_line_items();

        match self.submitter.submit_order(&customer_name, &items).await {
            Ok(receipt) => {
                metrics::counter!("voice_order_orders_submitted_total").increment(1);
                tracing::info!(
                    call_id = %call_id,
                    order_id = %receipt.order_id,
                    items = items.len(),
                    "Order submitted"
                );

                let reference = render(
                    &self.engine.prompts().order_reference,
                    &[("order_id", receipt.order_id.as_str())],
                );
                if !reference.trim().is_empty() {
                    outcome.prompt = format!("{} {}", outcome.prompt, reference);
                    state.amend_last_prompt(&outcome.prompt);
                }
                outcome.order = Some(receipt);
            }
            Err(e) => {
                metrics::counter!("voice_order_orders_failed_total").increment(1);
                tracing::warn!(
                    call_id = %call_id,
                    customer = %customer_name,
                    items = items.len(),
                    error = %e,
                    "Order submission failed, order confirmed to caller only"
                );
                outcome.order_error = Some(e.to_string());
            }
        }
    }

    /// Synthesize the outcome's prompt. Returns false if synthesis failed.
    async fn speak(&self, outcome: &mut TurnOutcome) -> bool {
        let (Some(tts), Some(audio)) = (&self.tts, &self.audio) else {
            return true;
        };

        let started = Instant::now();
        let clip = match tts.synthesize(&outcome.prompt).await {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!(
                    call_id = %outcome.call_id,
                    provider = tts.provider_name(),
                    error = %e,
                    "Synthesis failed"
                );
                return false;
            }
        };

        match audio.save(&outcome.call_id, &clip).await {
            Ok(stored) if self.store.context(&outcome.call_id).is_none() => {
                // ended during synthesis; its clips were already swept
                tracing::debug!(call_id = %outcome.call_id, "Call ended before clip was stored");
                if let Err(e) = audio.remove(&stored.file_name).await {
                    tracing::warn!(call_id = %outcome.call_id, error = %e, "Failed to remove audio clip");
                }
                outcome.hangup = true;
                true
            }
            Ok(stored) => {
                outcome.audio = Some(stored);
                outcome.timings.tts_ms = Some(elapsed_ms(started));
                metrics::histogram!("voice_order_tts_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                true
            }
            Err(e) => {
                tracing::warn!(call_id = %outcome.call_id, error = %e, "Failed to store audio clip");
                false
            }
        }
    }

    /// Apologize and end the call after a provider failure
    async fn fail_call(&self, call_id: &str, provider: &'static str) -> TurnOutcome {
        metrics::counter!("voice_order_upstream_failures_total", "provider" => provider)
            .increment(1);

        let stage = self
            .store
            .get(call_id)
            .map_or(DialogueStage::Greeting, |s| s.stage());
        self.end_call(call_id).await;

        let mut outcome = TurnOutcome::new(
            call_id,
            self.engine.prompts().technical_error.clone(),
            stage,
        );
        outcome.hangup = true;
        outcome
    }

    fn refuse(&self, call_id: &str, error: AgentError) -> TurnOutcome {
        metrics::counter!("voice_order_calls_rejected_total").increment(1);
        tracing::warn!(call_id = %call_id, error = %error, "Call refused");

        let mut outcome = TurnOutcome::new(
            call_id,
            self.engine.prompts().capacity_exceeded.clone(),
            DialogueStage::Greeting,
        );
        outcome.hangup = true;
        outcome
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
