//! HTTP API for the order-status chatbot.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::conversation::ConversationStore;
use crate::intent::IntentResolver;
use crate::orders::OrderStore;
use std::sync::Arc;

/// Application state shared across handlers. Both stores serialize their
/// own access internally, so handlers just clone the state.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderStore,
    pub conversations: ConversationStore,
    pub resolver: Arc<dyn IntentResolver>,
}

impl AppState {
    pub fn new(orders: OrderStore, resolver: Arc<dyn IntentResolver>) -> Self {
        Self {
            orders,
            conversations: ConversationStore::new(),
            resolver,
        }
    }
}
