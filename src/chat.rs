//! Single-turn chat orchestration.
//!
//! One user message produces one resolver call, at most one order-store
//! operation, and one assistant reply. Both resolver strategies share this
//! composer, so identical resolved intents always produce identical replies.

use crate::conversation::{Message, ToolResult};
use crate::intent::{Action, Intent, IntentResolver, Resolution};
use crate::orders::{OrderError, OrderStore};

const UNRECOGNIZED_REPLY: &str =
    "Please provide an order ID so I can look up or cancel an order.";

/// Run one assistant turn: resolve the intent, apply it to the order store,
/// and compose the reply. Domain failures (unknown order, terminal status,
/// unintelligible message) come back as ordinary replies, never as errors.
pub async fn chat_turn(
    orders: &OrderStore,
    resolver: &dyn IntentResolver,
    history: &[Message],
    text: &str,
) -> (Message, Option<ToolResult>) {
    let Resolution::Intent(intent) = resolver.resolve(text, history).await else {
        return (Message::assistant(UNRECOGNIZED_REPLY, None), None);
    };

    let result = apply(orders, &intent);
    let reply = compose_reply(&result);
    (
        Message::assistant(reply, Some(result.clone())),
        Some(result),
    )
}

fn apply(orders: &OrderStore, intent: &Intent) -> ToolResult {
    match intent.action {
        Action::Check => match orders.get(&intent.order_id) {
            Some(order) => ToolResult::ok(Action::Check, &intent.order_id, order.status),
            None => ToolResult::not_found(Action::Check, &intent.order_id),
        },
        Action::Cancel => match orders.cancel(&intent.order_id) {
            Ok(order) => ToolResult::ok(Action::Cancel, &intent.order_id, order.status),
            Err(OrderError::NotFound(_)) => {
                ToolResult::not_found(Action::Cancel, &intent.order_id)
            }
            Err(OrderError::InvalidTransition { status }) => {
                ToolResult::invalid_transition(Action::Cancel, &intent.order_id, status)
            }
        },
    }
}

fn compose_reply(result: &ToolResult) -> String {
    use crate::conversation::ToolError;

    let id = &result.order_id;
    match (result.error, result.action, result.status) {
        (None, Action::Check, Some(status)) => format!("Order {id} is currently {status}."),
        (None, Action::Cancel, _) => format!("Order {id} has been canceled successfully."),
        (Some(ToolError::NotFound), _, _) => {
            format!("I couldn't find an order with ID {id}.")
        }
        (Some(ToolError::InvalidTransition), _, Some(status)) => {
            format!("Order {id} cannot be canceled because it is {status}.")
        }
        // Remaining combinations are unconstructable via ToolResult's
        // constructors; answer something sensible anyway.
        _ => format!("Order {id} cannot be processed right now."),
    }
}
