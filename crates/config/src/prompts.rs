//! Prompt templates
//!
//! Templates use `{placeholder}` substitution. Unknown placeholders are left
//! in place so a typo shows up in the spoken text instead of vanishing.

use serde::{Deserialize, Serialize};
use voice_order_core::DialogueStage;

use crate::ConfigError;

/// Substitute `{key}` placeholders in a template
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}

/// All caller-facing prompt text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub welcome: String,
    /// `{menu}`: featured item names
    pub menu: String,
    /// `{items}`: items just added
    pub items_added: String,
    pub order_prompt: String,
    pub ask_name: String,
    pub order_empty: String,
    /// `{name}`, `{items}`
    pub order_summary: String,
    /// `{eta_minutes}`
    pub order_placed: String,
    /// `{order_id}`, appended after a successful submission
    pub order_reference: String,
    pub farewell: String,
    pub complaint: String,
    /// `{last_prompt}`
    pub clarify: String,
    pub clarify_unknown: String,
    pub no_speech: String,
    pub no_input_goodbye: String,
    pub technical_error: String,
    pub capacity_exceeded: String,
    pub fallback_greeting: String,
    pub fallback_awaiting_request: String,
    pub fallback_order_in_progress: String,
    pub fallback_awaiting_name: String,
    /// `{items}`
    pub fallback_order_summary: String,
    pub fallback_generic: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            welcome: "مرحباً بك في تشيكن تشاركو! شو اقدر أساعدك فيه اليوم؟".to_string(),
            menu: "في اليوم {menu}. شو تحب تطلب؟".to_string(),
            items_added: "تمام، حطيت {items} بالطلب. شي تاني؟".to_string(),
            order_prompt: "حاضر، شو طلبك؟".to_string(),
            ask_name: "تمام. شو اسمك عشان نسجل الطلب؟".to_string(),
            order_empty: "ما في شي بالطلب حالياً. شو تحب تسوي طلب؟".to_string(),
            order_summary: "تمام {name}، طلبك يحتوي على: {items}. صح هذا؟".to_string(),
            order_placed:
                "شكراً لطلبك! طلبك قيد التنفيذ والوقت المتوقع للوصول هو {eta_minutes} دقيقة."
                    .to_string(),
            order_reference: "رقم طلبك {order_id}.".to_string(),
            farewell: "شكراً على اتصالك! سلام!".to_string(),
            complaint: "المعذرة على الإزعاج. شو المشكلة تحديداً؟".to_string(),
            clarify: "قلت: {last_prompt}. صح هذا؟".to_string(),
            clarify_unknown: "أعتذر، شو تحتاج توضحه؟".to_string(),
            no_speech: "المعذرة, ما سمعت أي شيء. شو اكدر أساعدك فيه؟".to_string(),
            no_input_goodbye: "المعذرة, ما سمعت أي شيء. ودّع!".to_string(),
            technical_error: "أعتذر، في مشكلة تقنية حالياً.".to_string(),
            capacity_exceeded: "أعتذر، كل الخطوط مشغولة حالياً. جرب تتصل بعد شوي.".to_string(),
            fallback_greeting: "مرحباً! شو اكدر أساعدك فيه؟".to_string(),
            fallback_awaiting_request: "أعتذر، ما فهمت. شو اكدر أساعدك فيه؟".to_string(),
            fallback_order_in_progress: "أعتذر، ما فهمت. شو الشيء تحب تضيفه للطلب؟".to_string(),
            fallback_awaiting_name: "أعتذر، شو اسمك؟".to_string(),
            fallback_order_summary: "أعتذر، طلبك هو {items}. صح هذا؟".to_string(),
            fallback_generic: "أعتذر، ما فهمت. شو اكدر أساعدك فيه؟".to_string(),
        }
    }
}

impl PromptsConfig {
    /// "Didn't understand" template for a stage
    pub fn fallback_for(&self, stage: DialogueStage) -> &str {
        match stage {
            DialogueStage::Greeting => &self.fallback_greeting,
            DialogueStage::AwaitingRequest => &self.fallback_awaiting_request,
            DialogueStage::OrderInProgress => &self.fallback_order_in_progress,
            DialogueStage::AwaitingName => &self.fallback_awaiting_name,
            DialogueStage::OrderSummary => &self.fallback_order_summary,
            DialogueStage::OrderPlaced => &self.fallback_generic,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("prompts.welcome", &self.welcome),
            ("prompts.menu", &self.menu),
            ("prompts.items_added", &self.items_added),
            ("prompts.order_prompt", &self.order_prompt),
            ("prompts.ask_name", &self.ask_name),
            ("prompts.order_empty", &self.order_empty),
            ("prompts.order_summary", &self.order_summary),
            ("prompts.order_placed", &self.order_placed),
            ("prompts.farewell", &self.farewell),
            ("prompts.complaint", &self.complaint),
            ("prompts.clarify", &self.clarify),
            ("prompts.clarify_unknown", &self.clarify_unknown),
            ("prompts.no_speech", &self.no_speech),
            ("prompts.technical_error", &self.technical_error),
            ("prompts.fallback_generic", &self.fallback_generic),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
        }

        for stage in DialogueStage::ALL {
            if self.fallback_for(stage).trim().is_empty() {
                return Err(ConfigError::MissingField(format!(
                    "prompts.fallback for stage {}",
                    stage
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let text = render("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(text, "x and x then y");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        assert_eq!(render("hi {name}", &[("other", "z")]), "hi {name}");
    }

    #[test]
    fn test_every_stage_has_fallback() {
        let prompts = PromptsConfig::default();
        for stage in DialogueStage::ALL {
            assert!(!prompts.fallback_for(stage).is_empty());
        }
        assert!(prompts.validate().is_ok());
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let prompts = PromptsConfig {
            farewell: " ".to_string(),
            ..Default::default()
        };
        assert!(prompts.validate().is_err());
    }
}
