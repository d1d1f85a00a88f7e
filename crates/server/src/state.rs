//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use voice_order_agent::{CallOrchestrator, DialogueEngine, SessionStore};
use voice_order_config::Settings;
use voice_order_persistence::{JsonOrderStore, OrderStore};
use voice_order_pipeline::{create_stt, create_tts, AudioStore};
use voice_order_text_processing::{KeywordIntentClassifier, MenuEntityExtractor};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Settings the process was started with
    pub config: Arc<RwLock<Settings>>,
    pub orchestrator: Arc<CallOrchestrator>,
    pub orders: Arc<dyn OrderStore>,
    /// Concrete backends, also exposed through `/api/nlu/analyze`
    pub classifier: Arc<KeywordIntentClassifier>,
    pub extractor: Arc<MenuEntityExtractor>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire every component from settings
    pub fn build(config: Settings) -> Result<Self, ServerError> {
        let classifier = Arc::new(KeywordIntentClassifier::new(&config.nlu));
        let extractor = Arc::new(MenuEntityExtractor::new(&config.menu, &config.nlu)?);

        let engine = Arc::new(DialogueEngine::new(
            classifier.clone(),
            extractor.clone(),
            config.prompts.clone(),
            &config.menu,
            &config.dialogue,
        ));

        let order_store = Arc::new(JsonOrderStore::new(
            &config.orders.storage_path,
            config.dialogue.eta_minutes,
        ));
        let sessions = Arc::new(SessionStore::new(&config.sessions));
        let stt = create_stt(&config.stt)?;

        let mut orchestrator =
            CallOrchestrator::new(sessions, engine, stt, order_store.clone());
        if let Some(tts) = create_tts(&config.tts)? {
            orchestrator = orchestrator.with_tts(tts, AudioStore::new(&config.tts.audio_dir));
        }

        tracing::info!(
            menu_items = config.menu.items.len(),
            max_sessions = config.sessions.max_sessions,
            orders_path = %config.orders.storage_path,
            stt = orchestrator.stt_provider(),
            tts = orchestrator.tts_provider().unwrap_or("telephony"),
            "Application state ready"
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            orchestrator: Arc::new(orchestrator),
            orders: order_store,
            classifier,
            extractor,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.orchestrator.store()
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}
