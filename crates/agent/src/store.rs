//! Session store
//!
//! One entry per call id, holding the call's context and dialogue state.
//! The map lock is only held for lookups and swaps. A turn works on a cloned
//! state and commits it back afterwards, tagged with the generation it was
//! read under; a commit for a call that was ended (or ended and started
//! again) in the meantime is discarded.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use voice_order_config::SessionsConfig;
use voice_order_core::CallContext;

use crate::{AgentError, DialogueState, Result};

struct Entry {
    context: CallContext,
    state: DialogueState,
    generation: u64,
    last_activity: Instant,
}

impl Entry {
    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// An entry for the same call id existed and was overwritten
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The session was ended or replaced while the turn was in flight
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// Session removed; carries the closed call context
    Ended(CallContext),
    Unknown,
}

/// Read-only copy of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub context: CallContext,
    pub state: DialogueState,
}

/// In-memory per-call session store
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    next_generation: AtomicU64,
    max_sessions: usize,
    idle_timeout: Duration,
    cleanup_interval: Duration,
    history_cap: usize,
}

impl SessionStore {
    pub fn new(config: &SessionsConfig) -> Self {
        Self::with_limits(
            config.max_sessions,
            Duration::from_secs(config.idle_timeout_secs),
            Duration::from_secs(config.cleanup_interval_secs),
            config.history_cap,
        )
    }

    pub fn with_limits(
        max_sessions: usize,
        idle_timeout: Duration,
        cleanup_interval: Duration,
        history_cap: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            max_sessions,
            idle_timeout,
            cleanup_interval,
            history_cap,
        }
    }

    /// Start a background task that periodically removes idle sessions.
    ///
    /// Returns a sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let interval = store.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = store.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = store.count(),
                                "Session cleanup removed idle calls"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Register a call. An existing entry for the id is overwritten.
    pub fn create(&self, call_id: &str, from_number: &str, to_number: &str) -> Result<CreateOutcome> {
        let mut sessions = self.sessions.write();

        let replacing = sessions.contains_key(call_id);
        if !replacing {
            self.ensure_capacity(&mut sessions)?;
        }

        sessions.insert(call_id.to_string(), self.new_entry(call_id, from_number, to_number));

        if replacing {
            tracing::warn!(call_id = %call_id, "Call started twice, previous session replaced");
            Ok(CreateOutcome::Replaced)
        } else {
            tracing::info!(call_id = %call_id, from = %from_number, "Session created");
            Ok(CreateOutcome::Created)
        }
    }

    /// Copy of a call's state and the generation to commit against,
    /// creating the session if the call is unknown
    pub fn get_or_create(
        &self,
        call_id: &str,
        from_number: &str,
        to_number: &str,
    ) -> Result<(DialogueState, u64)> {
        let mut sessions = self.sessions.write();

        if let Some(entry) = sessions.get_mut(call_id) {
            entry.last_activity = Instant::now();
            return Ok((entry.state.clone(), entry.generation));
        }

        self.ensure_capacity(&mut sessions)?;
        let entry = self.new_entry(call_id, from_number, to_number);
        let found = (entry.state.clone(), entry.generation);
        sessions.insert(call_id.to_string(), entry);

        tracing::info!(call_id = %call_id, "Turn for unknown call, session created");
        Ok(found)
    }

    pub fn get(&self, call_id: &str) -> Option<DialogueState> {
        self.sessions.read().get(call_id).map(|e| e.state.clone())
    }

    pub fn context(&self, call_id: &str) -> Option<CallContext> {
        self.sessions.read().get(call_id).map(|e| e.context.clone())
    }

    pub fn snapshot(&self, call_id: &str) -> Option<SessionSnapshot> {
        self.sessions.read().get(call_id).map(|e| SessionSnapshot {
            context: e.context.clone(),
            state: e.state.clone(),
        })
    }

    /// Write a turn's state back, unless the session it was read from is gone
    pub fn commit(&self, call_id: &str, generation: u64, state: DialogueState) -> CommitOutcome {
        let mut sessions = self.sessions.write();

        match sessions.get_mut(call_id) {
            Some(entry) if entry.generation == generation => {
                entry.state = state;
                entry.last_activity = Instant::now();
                CommitOutcome::Committed
            }
            _ => {
                tracing::warn!(
                    call_id = %call_id,
                    generation,
                    "Call ended during turn, state discarded"
                );
                CommitOutcome::Discarded
            }
        }
    }

    /// Remove a call's session. Unknown ids are a no-op.
    pub fn end(&self, call_id: &str) -> EndOutcome {
        let removed = self.sessions.write().remove(call_id);

        match removed {
            Some(mut entry) => {
                entry.context.end();
                tracing::info!(
                    call_id = %call_id,
                    duration_secs = entry.context.duration().num_seconds(),
                    turns = entry.state.turn_count(),
                    stage = ?entry.state.stage(),
                    "Session ended"
                );
                EndOutcome::Ended(entry.context)
            }
            None => {
                tracing::warn!(call_id = %call_id, "End for unknown call ignored");
                EndOutcome::Unknown
            }
        }
    }

    /// Active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// All call ids
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Remove idle sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Entry>) -> usize {
        let timeout = self.idle_timeout;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let keep = !entry.is_expired(timeout);
            if !keep {
                tracing::info!(call_id = %id, "Expired idle session");
            }
            keep
        });

        before - sessions.len()
    }

    fn ensure_capacity(&self, sessions: &mut HashMap<String, Entry>) -> Result<()> {
        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(sessions);

            if sessions.len() >= self.max_sessions {
                return Err(AgentError::SessionLimit {
                    max: self.max_sessions,
                });
            }
        }
        Ok(())
    }

    fn new_entry(&self, call_id: &str, from_number: &str, to_number: &str) -> Entry {
        Entry {
            context: CallContext::new(call_id, from_number, to_number),
            state: DialogueState::new(self.history_cap),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            last_activity: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max: usize) -> SessionStore {
        SessionStore::with_limits(max, Duration::from_secs(60), Duration::from_secs(60), 50)
    }

    #[test]
    fn test_create_and_get() {
        let store = store(10);
        assert_eq!(store.create("CA1", "+1", "+2").unwrap(), CreateOutcome::Created);

        assert!(store.get("CA1").is_some());
        assert_eq!(store.context("CA1").unwrap().from_number, "+1");
        assert!(store.get("CA2").is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_duplicate_create_overwrites() {
        let store = store(1);
        store.create("CA1", "+1", "+2").unwrap();
        let (_, first) = store.get_or_create("CA1", "", "").unwrap();

        assert_eq!(store.create("CA1", "+9", "+2").unwrap(), CreateOutcome::Replaced);
        assert_eq!(store.context("CA1").unwrap().from_number, "+9");

        let (_, second) = store.get_or_create("CA1", "", "").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_get_or_create_unknown_call() {
        let store = store(10);
        let (state, _) = store.get_or_create("CA1", "", "").unwrap();
        assert_eq!(state.turn_count(), 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_commit_and_read_back() {
        let store = store(10);
        let (mut state, generation) = store.get_or_create("CA1", "", "").unwrap();
        state.set_pending_action(Some("x".into()));

        assert_eq!(store.commit("CA1", generation, state), CommitOutcome::Committed);
        assert_eq!(store.get("CA1").unwrap().pending_action(), Some("x"));
    }

    #[test]
    fn test_commit_after_end_is_discarded() {
        let store = store(10);
        let (state, generation) = store.get_or_create("CA1", "", "").unwrap();

        assert!(matches!(store.end("CA1"), EndOutcome::Ended(_)));
        assert_eq!(store.commit("CA1", generation, state.clone()), CommitOutcome::Discarded);
        assert_eq!(store.count(), 0);

        // ended and started again: the old turn still must not land
        store.create("CA1", "", "").unwrap();
        assert_eq!(store.commit("CA1", generation, state), CommitOutcome::Discarded);
    }

    #[test]
    fn test_end_unknown_is_noop() {
        let store = store(10);
        assert_eq!(store.end("nope"), EndOutcome::Unknown);
    }

    #[test]
    fn test_end_closes_context() {
        let store = store(10);
        store.create("CA1", "+1", "+2").unwrap();
        match store.end("CA1") {
            EndOutcome::Ended(ctx) => {
                assert!(!ctx.is_active());
                assert!(ctx.ended_at().is_some());
            }
            EndOutcome::Unknown => panic!("expected ended"),
        }
    }

    #[test]
    fn test_capacity_limit() {
        let store = store(2);
        store.create("CA1", "", "").unwrap();
        store.create("CA2", "", "").unwrap();

        assert!(matches!(
            store.create("CA3", "", ""),
            Err(AgentError::SessionLimit { max: 2 })
        ));
        assert!(store.get_or_create("CA3", "", "").is_err());

        // replacing an existing call does not need a free slot
        assert!(store.create("CA1", "", "").is_ok());
    }

    #[test]
    fn test_capacity_purges_expired_first() {
        let store =
            SessionStore::with_limits(1, Duration::from_millis(10), Duration::from_secs(60), 50);
        store.create("CA1", "", "").unwrap();
        std::thread::sleep(Duration::from_millis(30));

        assert!(store.create("CA2", "", "").is_ok());
        assert_eq!(store.list(), vec!["CA2".to_string()]);
    }

    #[test]
    fn test_cleanup_expired() {
        let store =
            SessionStore::with_limits(10, Duration::from_millis(10), Duration::from_secs(60), 50);
        store.create("CA1", "", "").unwrap();
        store.create("CA2", "", "").unwrap();
        std::thread::sleep(Duration::from_millis(30));
        store.create("CA3", "", "").unwrap();

        assert_eq!(store.cleanup_expired(), 2);
        assert_eq!(store.list(), vec!["CA3".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_task_stops() {
        let store = Arc::new(SessionStore::with_limits(
            10,
            Duration::from_millis(5),
            Duration::from_millis(10),
            50,
        ));
        store.create("CA1", "", "").unwrap();

        let shutdown = store.start_cleanup_task();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.count(), 0);

        shutdown.send(true).unwrap();
    }

    #[test]
    fn test_calls_are_independent() {
        let store = store(10);
        let (mut a, gen_a) = store.get_or_create("A", "", "").unwrap();
        let (b, gen_b) = store.get_or_create("B", "", "").unwrap();

        a.set_pending_action(Some("a".into()));
        store.commit("A", gen_a, a);
        store.commit("B", gen_b, b);

        assert_eq!(store.get("A").unwrap().pending_action(), Some("a"));
        assert!(store.get("B").unwrap().pending_action().is_none());
    }
}
