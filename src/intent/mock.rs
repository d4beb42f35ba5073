//! Deterministic pattern-matching intent resolver.
//!
//! Used whenever no OpenAI credential is configured. The order id is the
//! first standalone run of ASCII digits in the message (digits bounded by
//! word boundaries); any later numbers are ignored. A `cancel` keyword,
//! case-insensitive, selects the cancel action; any other message with an
//! order id is a status check.

use super::{Action, Intent, IntentResolver, Resolution};
use crate::conversation::Message;
use async_trait::async_trait;
use regex::Regex;

pub struct MockResolver {
    order_id: Regex,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            order_id: Regex::new(r"\b\d+\b").expect("static pattern"),
        }
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentResolver for MockResolver {
    async fn resolve(&self, text: &str, _history: &[Message]) -> Resolution {
        let Some(m) = self.order_id.find(text) else {
            tracing::debug!("no order id in message");
            return Resolution::Unrecognized;
        };
        let action = if text.to_lowercase().contains("cancel") {
            Action::Cancel
        } else {
            Action::Check
        };
        Resolution::Intent(Intent {
            action,
            order_id: m.as_str().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
