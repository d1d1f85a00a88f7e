//! Dialogue engine
//!
//! One call to [`DialogueEngine::process`] is one turn: classify the
//! utterance, apply exactly one rule, record the turn and return the prompt.
//! Rules are checked in a fixed order:
//!
//! 1. Goodbye (any stage): reset the order, back to `Greeting`
//! 2. Greeting while in `Greeting`: welcome, on to `AwaitingRequest`
//! 3. Menu (any stage): list featured items, stage unchanged
//! 4. Order (any stage): merge extracted items, on to `OrderInProgress`
//! 5. Confirmation in `OrderInProgress`: ask for the name
//! 6. Anything in `AwaitingName`: the trimmed utterance is the name
//! 7. Confirmation in `OrderSummary`: place the order
//! 8. Complaint, then Clarification (any stage), stage unchanged
//! 9. Otherwise the stage's fallback prompt, stage unchanged
//!
//! The engine never talks to speech or order-submission collaborators. A
//! turn that moves into `OrderPlaced` is the signal for the caller to submit.

use std::sync::Arc;
use voice_order_config::{render, DialogueConfig, MenuConfig, PromptsConfig};
use voice_order_core::{DialogueStage, EntityExtractor, Intent, IntentClassifier, OrderItems};

use crate::DialogueState;

/// What one turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub prompt: String,
    /// `None` when the utterance was empty and never classified
    pub intent: Option<Intent>,
    pub previous_stage: DialogueStage,
    pub stage: DialogueStage,
}

impl TurnResult {
    /// The turn confirmed the order and it should be submitted now
    pub fn order_ready(&self) -> bool {
        self.stage == DialogueStage::OrderPlaced && self.previous_stage != DialogueStage::OrderPlaced
    }

    pub fn stage_changed(&self) -> bool {
        self.stage != self.previous_stage
    }
}

/// Stateless turn processor shared by all calls
pub struct DialogueEngine {
    classifier: Arc<dyn IntentClassifier>,
    extractor: Arc<dyn EntityExtractor>,
    prompts: PromptsConfig,
    menu_listing: String,
    eta_minutes: u32,
    max_quantity: u32,
}

impl DialogueEngine {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        extractor: Arc<dyn EntityExtractor>,
        prompts: PromptsConfig,
        menu: &MenuConfig,
        dialogue: &DialogueConfig,
    ) -> Self {
        let menu_listing = menu
            .featured()
            .map(|item| {
                if item.name_ar.trim().is_empty() {
                    item.name_en.as_str()
                } else {
                    item.name_ar.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" و ");

        Self {
            classifier,
            extractor,
            prompts,
            menu_listing,
            eta_minutes: dialogue.eta_minutes,
            max_quantity: dialogue.max_quantity.max(1),
        }
    }

    pub fn prompts(&self) -> &PromptsConfig {
        &self.prompts
    }

    /// Opening line spoken when a call connects
    pub fn welcome_prompt(&self) -> &str {
        &self.prompts.welcome
    }

    /// Process one utterance against a call's state
    pub fn process(&self, utterance: &str, state: &mut DialogueState) -> TurnResult {
        let previous_stage = state.stage();
        let text = utterance.trim();

        if text.is_empty() {
            tracing::debug!(stage = ?previous_stage, "Empty utterance, re-prompting");
            return TurnResult {
                prompt: self.prompts.no_speech.clone(),
                intent: None,
                previous_stage,
                stage: previous_stage,
            };
        }

        let intent = self.classifier.classify(text);
        let prompt = self.apply(intent, text, state);
        state.record_turn(text, &prompt);

        tracing::debug!(
            intent = ?intent,
            from = ?previous_stage,
            to = ?state.stage(),
            items = state.order_items().len(),
            "Processed turn"
        );

        TurnResult {
            prompt,
            intent: Some(intent),
            previous_stage,
            stage: state.stage(),
        }
    }

    fn apply(&self, intent: Intent, text: &str, state: &mut DialogueState) -> String {
        let stage = state.stage();

        match (intent, stage) {
            (Intent::Goodbye, _) => {
                state.reset_order();
                state.set_stage(DialogueStage::Greeting);
                self.prompts.farewell.clone()
            }
            (Intent::Greeting, DialogueStage::Greeting) => {
                state.set_stage(DialogueStage::AwaitingRequest);
                self.prompts.welcome.clone()
            }
            (Intent::Menu, _) => {
                render(&self.prompts.menu, &[("menu", self.menu_listing.as_str())])
            }
            (Intent::Order, _) => self.take_order(text, state),
            (Intent::Confirmation, DialogueStage::OrderInProgress) => {
                if state.order_items().is_empty() {
                    self.prompts.order_empty.clone()
                } else {
                    state.set_stage(DialogueStage::AwaitingName);
                    self.prompts.ask_name.clone()
                }
            }
            (_, DialogueStage::AwaitingName) => {
                state.set_customer_name(text);
                state.set_stage(DialogueStage::OrderSummary);
                render(
                    &self.prompts.order_summary,
                    &[("name", text), ("items", summarize(state.order_items()).as_str())],
                )
            }
            (Intent::Confirmation, DialogueStage::OrderSummary) => {
                if state.order_items().is_empty() {
                    state.set_stage(DialogueStage::OrderInProgress);
                    self.prompts.order_empty.clone()
                } else {
                    state.set_stage(DialogueStage::OrderPlaced);
                    render(
                        &self.prompts.order_placed,
                        &[("eta_minutes", self.eta_minutes.to_string().as_str())],
                    )
                }
            }
            (Intent::Complaint, _) => self.prompts.complaint.clone(),
            (Intent::Clarification, _) => match state.last_prompt() {
                Some(last) => render(&self.prompts.clarify, &[("last_prompt", last)]),
                None => self.prompts.clarify_unknown.clone(),
            },
            _ => render(
                self.prompts.fallback_for(stage),
                &[("items", summarize(state.order_items()).as_str())],
            ),
        }
    }

    fn take_order(&self, text: &str, state: &mut DialogueState) -> String {
        if state.stage() == DialogueStage::OrderPlaced {
            // the placed order was already handed off
            state.start_fresh_basket();
        }

        let entities = self.extractor.extract(text);
        let quantity = entities.quantity.clamp(1, self.max_quantity);

        let added: Vec<&str> = entities
            .items
            .iter()
            .map(|item| {
                let key = self.extractor.item_key(&item.name);
                let total = state.add_item(key, &item.name, quantity);
                tracing::debug!(item = %item.id, quantity, total, "Added item");
                item.name.as_str()
            })
            .collect();

        state.set_stage(DialogueStage::OrderInProgress);

        if added.is_empty() {
            self.prompts.order_prompt.clone()
        } else {
            render(&self.prompts.items_added, &[("items", added.join(", ").as_str())])
        }
    }
}

/// "name xN" for each basket line, comma separated
fn summarize(items: &OrderItems) -> String {
    items
        .iter()
        .map(|item| format!("{} x{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}
