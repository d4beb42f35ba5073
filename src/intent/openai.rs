//! OpenAI Chat Completions resolver using function calling.
//!
//! The model is offered exactly two tools, `find_order` and `cancel_order`,
//! and its choice of tool and arguments is trusted as the resolved intent.
//! Every failure mode (transport error, non-2xx status, malformed payload,
//! unknown tool, unusable arguments, or a plain-text answer with no tool
//! call) degrades to [`Resolution::Unrecognized`]; the resolver never turns
//! a user message into a server error.

use super::{Action, Intent, IntentResolver, Resolution};
use crate::conversation::{Message, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Bounded timeout so a stalled API call degrades instead of hanging the
/// request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are an order assistant. Use the available tools to look up or \
     cancel orders. Never invent order data. If the user asks to cancel an \
     order that is already shipped or canceled, explain that the order \
     cannot be canceled.";

pub struct OpenAiResolver {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiResolver {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<&str>) -> Self {
        let url = format!(
            "{}/chat/completions",
            base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
        );
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            url,
        }
    }

    fn translate_request(&self, text: &str, history: &[Message]) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        }];
        for msg in history {
            messages.push(ChatMessage {
                role: match msg.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg.content.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: text.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            tools: tool_specs(),
            tool_choice: "auto",
            temperature: 0.0,
        }
    }

    /// Map the first usable tool call to an intent. Anything else is
    /// `Unrecognized`.
    fn parse_resolution(response: ChatResponse) -> Resolution {
        let Some(choice) = response.choices.into_iter().next() else {
            tracing::warn!("no choices in OpenAI response");
            return Resolution::Unrecognized;
        };

        for call in choice.message.tool_calls {
            let action = match call.function.name.as_str() {
                "find_order" => Action::Check,
                "cancel_order" => Action::Cancel,
                other => {
                    tracing::warn!(tool = other, "model requested unknown tool");
                    continue;
                }
            };
            let args: OrderArgs = match serde_json::from_str(&call.function.arguments) {
                Ok(args) => args,
                Err(e) => {
                    tracing::warn!(error = %e, "unparseable tool arguments");
                    continue;
                }
            };
            let Some(order_id) = args.order_id() else {
                tracing::warn!("tool arguments missing order_id");
                continue;
            };
            return Resolution::Intent(Intent { action, order_id });
        }

        Resolution::Unrecognized
    }
}

#[async_trait]
impl IntentResolver for OpenAiResolver {
    async fn resolve(&self, text: &str, history: &[Message]) -> Resolution {
        let request = self.translate_request(text, history);

        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI request failed");
                return Resolution::Unrecognized;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "OpenAI returned an error status");
            return Resolution::Unrecognized;
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => Self::parse_resolution(body),
            Err(e) => {
                tracing::warn!(error = %e, "malformed OpenAI response body");
                Resolution::Unrecognized
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            r#type: "function",
            function: FunctionSpec {
                name: "find_order",
                description: "Look up an order by order_id in the system.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "order_id": {
                            "type": "string",
                            "description": "The ID of the order to look up.",
                        },
                    },
                    "required": ["order_id"],
                }),
            },
        },
        ToolSpec {
            r#type: "function",
            function: FunctionSpec {
                name: "cancel_order",
                description: "Cancel an existing order if it is still processing.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "order_id": {
                            "type": "string",
                            "description": "The ID of the order to cancel.",
                        },
                    },
                    "required": ["order_id"],
                }),
            },
        },
    ]
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    tools: Vec<ToolSpec>,
    tool_choice: &'static str,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    r#type: &'static str,
    function: FunctionSpec,
}

#[derive(Debug, Serialize)]
struct FunctionSpec {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API returns them.
    arguments: String,
}

/// Tool arguments. Models occasionally send the id as a bare number, so
/// accept either form.
#[derive(Debug, Deserialize)]
struct OrderArgs {
    order_id: Value,
}

impl OrderArgs {
    fn order_id(&self) -> Option<String> {
        match &self.order_id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
