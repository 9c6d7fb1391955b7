use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ExtractionContract, StructuredExtractor};
use crate::error::ExtractionError;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const TOOL_NAME: &str = "record_listings";

/// Structured extraction through the Anthropic Messages API.
///
/// The contract's schema is offered as the only tool and the model is
/// forced to call it, so the tool input is the structured output.
pub struct AnthropicExtractor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Other,
}

impl AnthropicExtractor {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl StructuredExtractor for AnthropicExtractor {
    async fn extract(
        &self,
        markdown: &str,
        contract: &ExtractionContract,
    ) -> Result<Value, ExtractionError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: contract.instructions(),
            messages: vec![Message {
                role: "user",
                content: contract.user_prompt(markdown),
            }],
            tools: vec![Tool {
                name: TOOL_NAME,
                description: "Record every listing extracted from the page.",
                input_schema: contract.schema(),
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: TOOL_NAME,
            },
        };

        debug!(
            "Requesting extraction from {} ({} chars of markdown)",
            self.model,
            markdown.len()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessagesResponse = response.json().await?;
        if message.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Extraction output hit the token limit and may be truncated");
        }

        message
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { name, input } if name == TOOL_NAME => Some(input),
                _ => None,
            })
            .ok_or(ExtractionError::MissingOutput)
    }
}
