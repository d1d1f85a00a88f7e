//! Closed set of caller intents

use serde::{Deserialize, Serialize};

/// What a caller's utterance is trying to do.
///
/// Classification is total: anything a classifier cannot place maps to
/// [`Intent::Fallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Menu,
    Order,
    Confirmation,
    Clarification,
    Complaint,
    Goodbye,
    Fallback,
}

impl Intent {
    /// Every intent, in declaration order
    pub const ALL: [Intent; 8] = [
        Intent::Greeting,
        Intent::Menu,
        Intent::Order,
        Intent::Confirmation,
        Intent::Clarification,
        Intent::Complaint,
        Intent::Goodbye,
        Intent::Fallback,
    ];

    /// Stable lowercase label, used for logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Menu => "menu",
            Intent::Order => "order",
            Intent::Confirmation => "confirmation",
            Intent::Clarification => "clarification",
            Intent::Complaint => "complaint",
            Intent::Goodbye => "goodbye",
            Intent::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
