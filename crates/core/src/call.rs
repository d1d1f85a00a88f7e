//! Telephony call context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for one telephone call, created on the call-start webhook.
///
/// Fields are a closed set; updates go through the methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub call_id: String,
    pub from_number: String,
    pub to_number: String,
    active: bool,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl CallContext {
    pub fn new(
        call_id: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            from_number: from_number.into(),
            to_number: to_number.into(),
            active: true,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Mark the call as ended. Idempotent: the first end time sticks.
    pub fn end(&mut self) {
        if self.active {
            self.active = false;
            self.ended_at = Some(Utc::now());
        }
    }

    /// Elapsed call time, up to the end time if the call is over
    pub fn duration(&self) -> chrono::Duration {
        self.ended_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_is_idempotent() {
        let mut ctx = CallContext::new("CA1", "+963111", "+963222");
        assert!(ctx.is_active());

        ctx.end();
        let first = ctx.ended_at();
        ctx.end();

        assert!(!ctx.is_active());
        assert_eq!(ctx.ended_at(), first);
        assert!(ctx.duration() >= chrono::Duration::zero());
    }
}
