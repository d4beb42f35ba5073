//! HTTP request handlers

use super::types::{
    AssistantMessageResponse, CreateConversationResponse, ErrorResponse, HealthResponse,
    MessagesResponse, UserMessageRequest,
};
use super::AppState;
use crate::chat::chat_turn;
use crate::conversation::{ConversationError, Message};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/conversations", post(create_conversation))
        .route(
            "/conversations/:id/messages",
            get(list_messages).post(post_message),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Start a new conversation. Always succeeds with a fresh id.
async fn create_conversation(State(state): State<AppState>) -> Json<CreateConversationResponse> {
    let id = state.conversations.create();
    tracing::info!(conversation_id = %id, "Created conversation");
    Json(CreateConversationResponse {
        conversation_id: id.to_string(),
    })
}

/// Conversation history in append order.
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessagesResponse>, AppError> {
    let messages = state.conversations.list(id)?;
    Ok(Json(MessagesResponse { messages }))
}

/// Append a user message, run one assistant turn, append and return the
/// reply. Order-level outcomes (not found, terminal status, unrecognized
/// intent) are ordinary 200 responses; only an unknown conversation or a
/// malformed request is an HTTP error.
async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UserMessageRequest>,
) -> Result<Json<AssistantMessageResponse>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::BadRequest("content must not be empty".to_string()));
    }

    // History before this message; also the existence check for the id.
    let history = state.conversations.list(id)?;

    let (assistant, tool_result) = chat_turn(
        &state.orders,
        state.resolver.as_ref(),
        &history,
        &request.content,
    )
    .await;

    state.conversations.append(id, Message::user(request.content))?;
    state.conversations.append(id, assistant.clone())?;

    Ok(Json(AssistantMessageResponse {
        assistant,
        tool_result,
    }))
}

enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::NotFound(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::MockResolver;
    use crate::orders::{Order, OrderStatus, OrderStore};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let orders = OrderStore::seeded([
            Order {
                order_id: "12345".to_string(),
                status: OrderStatus::Shipped,
                item: "Wireless Mouse".to_string(),
            },
            Order {
                order_id: "23456".to_string(),
                status: OrderStatus::Processing,
                item: "Mechanical Keyboard".to_string(),
            },
        ]);
        create_router(AppState::new(orders, Arc::new(MockResolver::new())))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn create_conversation(app: &Router) -> String {
        let (status, body) = send(
            app,
            Request::post("/conversations").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["conversation_id"].as_str().unwrap().to_string()
    }

    async fn post_message(app: &Router, id: &str, content: &str) -> (StatusCode, Value) {
        send(
            app,
            Request::post(format!("/conversations/{id}/messages"))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "content": content }).to_string()))
                .unwrap(),
        )
        .await
    }

    async fn get_messages(app: &Router, id: &str) -> (StatusCode, Value) {
        send(
            app,
            Request::get(format!("/conversations/{id}/messages"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app();
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn new_conversation_starts_empty() {
        let app = app();
        let id = create_conversation(&app).await;
        assert!(Uuid::parse_str(&id).is_ok());

        let (status, body) = get_messages(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"], json!([]));
    }

    #[tokio::test]
    async fn check_cancel_check_cancel_flow() {
        let app = app();
        let id = create_conversation(&app).await;

        let (status, body) = post_message(&app, &id, "Hi, can you check my order 23456?").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assistant"]["role"], "assistant");
        assert_eq!(body["tool_result"]["action"], "check");
        assert_eq!(body["tool_result"]["status"], "processing");

        let (status, body) = post_message(&app, &id, "Please cancel order 23456").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_result"]["action"], "cancel");
        assert_eq!(body["tool_result"]["status"], "canceled");
        assert!(body["assistant"]["content"]
            .as_str()
            .unwrap()
            .contains("canceled successfully"));

        let (_, body) = post_message(&app, &id, "What's the status of order 23456?").await;
        assert_eq!(body["tool_result"]["status"], "canceled");

        let (status, body) = post_message(&app, &id, "cancel order 23456 again").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_result"]["error"], "invalid_transition");
        assert_eq!(body["tool_result"]["status"], "canceled");
    }

    #[tokio::test]
    async fn cancel_shipped_order_is_rejected() {
        let app = app();
        let id = create_conversation(&app).await;

        let (status, body) = post_message(&app, &id, "cancel order 12345").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_result"]["error"], "invalid_transition");
        assert_eq!(body["tool_result"]["status"], "shipped");

        let (_, body) = post_message(&app, &id, "check order 12345").await;
        assert_eq!(body["tool_result"]["status"], "shipped");
    }

    #[tokio::test]
    async fn unknown_order_is_a_normal_reply() {
        let app = app();
        let id = create_conversation(&app).await;

        let (status, body) = post_message(&app, &id, "check order 99999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_result"]["error"], "not_found");
    }

    #[tokio::test]
    async fn message_without_order_id_has_no_tool_result() {
        let app = app();
        let id = create_conversation(&app).await;

        let (status, body) = post_message(&app, &id, "hello there").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("tool_result").is_none());
        assert!(body["assistant"]["content"]
            .as_str()
            .unwrap()
            .contains("order ID"));
    }

    #[tokio::test]
    async fn history_interleaves_user_and_assistant_in_post_order() {
        let app = app();
        let id = create_conversation(&app).await;

        post_message(&app, &id, "check order 12345").await;
        post_message(&app, &id, "cancel order 23456").await;
        post_message(&app, &id, "hello").await;

        let (status, body) = get_messages(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 6);
        let roles: Vec<_> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(
            roles,
            ["user", "assistant", "user", "assistant", "user", "assistant"]
        );
        assert_eq!(messages[0]["content"], "check order 12345");
        assert_eq!(messages[2]["content"], "cancel order 23456");
        // User messages never carry a tool result; this assistant turn does.
        assert!(messages[0].get("tool_result").is_none());
        assert_eq!(messages[1]["tool_result"]["action"], "check");
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        let app = app();
        let missing = Uuid::new_v4().to_string();

        let (status, body) = get_messages(&app, &missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = post_message(&app, &missing, "check order 12345").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_conversation_id_is_a_client_error() {
        let app = app();
        let (status, _) = get_messages(&app, "not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let app = app();
        let id = create_conversation(&app).await;
        let (status, body) = post_message(&app, &id, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("content"));
    }
}
