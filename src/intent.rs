//! Intent resolution: mapping free text to a structured order action.
//!
//! Two interchangeable strategies sit behind the [`IntentResolver`] trait:
//! a deterministic pattern matcher and an OpenAI function-calling client.
//! The strategy is chosen once at startup from the environment; request
//! handlers only ever see `Arc<dyn IntentResolver>`.

mod mock;
mod openai;

pub use mock::MockResolver;
pub use openai::OpenAiResolver;

use crate::conversation::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The two order operations a user message can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Check,
    Cancel,
}

/// A resolved action and its target order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub action: Action,
    pub order_id: String,
}

/// Resolver output. User-input problems (no order id, unintelligible text)
/// and external-API failures all land on `Unrecognized`; the resolver never
/// errors for a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Intent(Intent),
    Unrecognized,
}

/// Common interface for intent resolution strategies.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Resolve a user message against the conversation so far. `history`
    /// holds the messages exchanged before `text`.
    async fn resolve(&self, text: &str, history: &[Message]) -> Resolution;

    /// Strategy name for the startup log.
    fn name(&self) -> &'static str;
}

/// Resolver-relevant environment configuration, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub openai_api_key: Option<String>,
    /// Model override (`OPENAI_MODEL`).
    pub model: Option<String>,
    /// Base URL override for gateways and tests (`OPENAI_BASE_URL`).
    pub base_url: Option<String>,
}

impl ResolverConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            model: std::env::var("OPENAI_MODEL").ok(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
        }
    }

    /// Pick the strategy: OpenAI when a credential is present, otherwise the
    /// deterministic mock. Running without a credential is a fully supported
    /// mode, not a degraded one.
    pub fn build(&self) -> Arc<dyn IntentResolver> {
        match &self.openai_api_key {
            Some(key) => Arc::new(OpenAiResolver::new(
                key.clone(),
                self.model.clone(),
                self.base_url.as_deref(),
            )),
            None => Arc::new(MockResolver::new()),
        }
    }
}
