//! Per-call dialogue state
//!
//! Fields are private. The stage and the basket only change through the
//! dialogue engine; callers outside the crate can read everything but may
//! only set the pending-action marker.

use serde::Serialize;
use std::collections::VecDeque;
use voice_order_core::{DialogueStage, HistoryTurn, OrderItems};

/// Mutable conversational context for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueState {
    stage: DialogueStage,
    order_items: OrderItems,
    customer_name: Option<String>,
    pending_action: Option<String>,
    last_prompt: Option<String>,
    history: VecDeque<HistoryTurn>,
    #[serde(skip)]
    history_cap: usize,
    turn_count: u64,
}

impl DialogueState {
    /// Fresh state in the `Greeting` stage, keeping at most `history_cap` turns
    pub fn new(history_cap: usize) -> Self {
        Self {
            stage: DialogueStage::Greeting,
            order_items: OrderItems::new(),
            customer_name: None,
            pending_action: None,
            last_prompt: None,
            history: VecDeque::new(),
            history_cap: history_cap.max(1),
            turn_count: 0,
        }
    }

    pub fn stage(&self) -> DialogueStage {
        self.stage
    }

    pub fn order_items(&self) -> &OrderItems {
        &self.order_items
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn pending_action(&self) -> Option<&str> {
        self.pending_action.as_deref()
    }

    /// Mark an action awaiting confirmation. Carried across turns untouched
    /// and cleared on goodbye.
    pub fn set_pending_action(&mut self, action: Option<String>) {
        self.pending_action = action;
    }

    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    /// Most recent turns, oldest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryTurn> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Turns processed over the whole call, including ones dropped from history
    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    pub(crate) fn set_stage(&mut self, next: DialogueStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "transition {:?} -> {:?} not in table",
            self.stage,
            next
        );
        if !self.stage.can_transition_to(next) {
            tracing::warn!(from = ?self.stage, to = ?next, "Unexpected stage transition");
        }
        self.stage = next;
    }

    /// Merge an item into the basket, returning the line's new quantity
    pub(crate) fn add_item(&mut self, key: String, name: &str, quantity: u32) -> u32 {
        self.order_items.merge(key, name, quantity)
    }

    pub(crate) fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = Some(name.into());
    }

    /// Goodbye reset: basket, name and pending action go; history stays
    pub(crate) fn reset_order(&mut self) {
        self.order_items.clear();
        self.customer_name = None;
        self.pending_action = None;
    }

    /// Empty the basket for a new order on the same call, keeping the name
    pub(crate) fn start_fresh_basket(&mut self) {
        self.order_items.clear();
        self.pending_action = None;
    }

    pub(crate) fn record_turn(&mut self, utterance: &str, prompt: &str) {
        if self.history.len() >= self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(HistoryTurn {
            utterance: utterance.to_string(),
            prompt: prompt.to_string(),
        });
        self.last_prompt = Some(prompt.to_string());
        self.turn_count += 1;
    }

    /// Extend the last spoken prompt, e.g. with an order reference
    pub(crate) fn amend_last_prompt(&mut self, prompt: &str) {
        if let Some(turn) = self.history.back_mut() {
            turn.prompt = prompt.to_string();
        }
        self.last_prompt = Some(prompt.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = DialogueState::new(10);
        assert_eq!(state.stage(), DialogueStage::Greeting);
        assert!(state.order_items().is_empty());
        assert!(state.customer_name().is_none());
        assert!(state.last_prompt().is_none());
        assert_eq!(state.history_len(), 0);
    }

    #[test]
    fn test_history_is_capped() {
        let mut state = DialogueState::new(3);
        for i in 0..5 {
            state.record_turn(&format!("u{}", i), &format!("p{}", i));
        }

        let kept: Vec<_> = state.history().map(|t| t.utterance.as_str()).collect();
        assert_eq!(kept, vec!["u2", "u3", "u4"]);
        assert_eq!(state.last_prompt(), Some("p4"));
        assert_eq!(state.turn_count(), 5);
    }

    #[test]
    fn test_reset_keeps_history() {
        let mut state = DialogueState::new(10);
        state.add_item("pepsi".into(), "بيبسي", 2);
        state.set_customer_name("أحمد");
        state.set_pending_action(Some("confirm_order".into()));
        state.record_turn("بيبسي", "تمام");

        state.reset_order();

        assert!(state.order_items().is_empty());
        assert!(state.customer_name().is_none());
        assert!(state.pending_action().is_none());
        assert_eq!(state.history_len(), 1);
    }

    #[test]
    fn test_fresh_basket_keeps_name() {
        let mut state = DialogueState::new(10);
        state.add_item("pepsi".into(), "بيبسي", 1);
        state.set_customer_name("أحمد");

        state.start_fresh_basket();

        assert!(state.order_items().is_empty());
        assert_eq!(state.customer_name(), Some("أحمد"));
    }

    #[test]
    fn test_amend_last_prompt() {
        let mut state = DialogueState::new(10);
        state.record_turn("أكيد", "شكراً");
        state.amend_last_prompt("شكراً رقم طلبك 1");

        assert_eq!(state.last_prompt(), Some("شكراً رقم طلبك 1"));
        assert_eq!(state.history().last().unwrap().prompt, "شكراً رقم طلبك 1");
    }
}
