//! OpenAI chat-completions backend client.
//!
//! Intentionally lightweight: only the fields the gateway needs are
//! modelled. See: <https://platform.openai.com/docs/api-reference/chat>

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::ModelClient;
use crate::types::{InvocationContext, InvocationResponse, ModelDescriptor, metadata};
use crate::{GatewayError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Configuration for the OpenAI client.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiClientConfig {
    /// Bearer token for the chat-completions endpoint.
    pub api_key: String,
    /// Endpoint URL (overridable for testing or compatible gateways).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl OpenAiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
        }
    }

    /// Override the endpoint URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// [`ModelClient`] for models with provider id `openai` and type `chat`.
pub struct OpenAiChatClient {
    config: OpenAiClientConfig,
    http: Client,
}

impl OpenAiChatClient {
    pub fn new(config: OpenAiClientConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }
}

#[async_trait]
impl ModelClient for OpenAiChatClient {
    fn supports(&self, descriptor: &ModelDescriptor) -> bool {
        descriptor.provider_id.eq_ignore_ascii_case("openai")
            && descriptor.model_type.eq_ignore_ascii_case("chat")
    }

    async fn invoke(&self, context: &InvocationContext) -> Result<InvocationResponse> {
        let prompt = require_prompt(context)?;
        let model = context
            .model()
            .map(|m| m.model_id.as_str())
            .unwrap_or_default()
            .to_owned();

        let request = ChatCompletionRequest {
            model: &model,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };
        let start = Instant::now();

        let response = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        if let Err(status_error) = response.error_for_status_ref() {
            return Err(status_error.into());
        }
        let completion: ChatCompletionResponse = response.json().await?;

        Ok(build_invocation_response(
            context,
            completion.first_message_content(),
            completion.usage.unwrap_or_default().into_tokens(),
            start.elapsed(),
        ))
    }
}

/// Extract the mandatory non-empty `prompt` payload field.
pub(crate) fn require_prompt(context: &InvocationContext) -> Result<String> {
    context
        .request()
        .payload()
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            GatewayError::InvalidRequest(
                "chat payload requires a non-empty 'prompt' field".to_string(),
            )
        })
}

/// Assemble the normalized response: content payload plus provider, model,
/// token, and cost metadata derived from the resolved descriptor's pricing.
pub(crate) fn build_invocation_response(
    context: &InvocationContext,
    content: String,
    tokens: (u64, u64),
    latency: Duration,
) -> InvocationResponse {
    let (input_tokens, output_tokens) = tokens;
    let mut payload = Map::new();
    payload.insert("content".into(), content.into());

    let mut meta = Map::new();
    if let Some(provider) = context.provider() {
        meta.insert(metadata::PROVIDER.into(), provider.id.clone().into());
    }
    if let Some(model) = context.model() {
        meta.insert(metadata::MODEL.into(), model.model_id.clone().into());
        let cost = input_tokens as f64 * model.input_cost + output_tokens as f64 * model.output_cost;
        meta.insert(metadata::COST.into(), cost.into());
        meta.insert(metadata::CURRENCY.into(), model.currency.clone().into());
    }
    meta.insert(metadata::INPUT_TOKENS.into(), input_tokens.into());
    meta.insert(metadata::OUTPUT_TOKENS.into(), output_tokens.into());

    InvocationResponse::new(payload, meta).with_latency(latency)
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

impl ChatCompletionResponse {
    fn first_message_content(&self) -> String {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.clone())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl Usage {
    fn into_tokens(self) -> (u64, u64) {
        (self.prompt_tokens, self.completion_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationRequest;

    #[test]
    fn supports_openai_chat_models_only() {
        let client = OpenAiChatClient::new(OpenAiClientConfig::new("sk-test"));
        assert!(client.supports(&ModelDescriptor::new("openai", "gpt-4o-mini", "chat")));
        assert!(client.supports(&ModelDescriptor::new("OpenAI", "gpt-4o-mini", "CHAT")));
        assert!(!client.supports(&ModelDescriptor::new("gemini", "gpt-4o-mini", "chat")));
        assert!(!client.supports(&ModelDescriptor::new("openai", "text-embedding-3", "embedding")));
    }

    #[test]
    fn missing_prompt_is_invalid_request() {
        let context = InvocationContext::new(InvocationRequest::builder().build());
        assert!(matches!(
            require_prompt(&context),
            Err(GatewayError::InvalidRequest(_))
        ));

        let blank = InvocationContext::new(
            InvocationRequest::builder()
                .payload_entry("prompt", "   ")
                .build(),
        );
        assert!(require_prompt(&blank).is_err());
    }

    #[test]
    fn response_metadata_includes_cost_from_pricing() {
        let mut context = InvocationContext::new(
            InvocationRequest::builder()
                .payload_entry("prompt", "hi")
                .build(),
        );
        context.set_model(
            ModelDescriptor::new("openai", "gpt-4o-mini", "chat").pricing(0.001, 0.002, "USD"),
        );

        let response = build_invocation_response(
            &context,
            "hello".to_string(),
            (100, 50),
            Duration::from_millis(10),
        );
        assert_eq!(response.payload["content"], "hello");
        assert_eq!(response.metadata[metadata::INPUT_TOKENS], 100);
        assert_eq!(response.metadata[metadata::OUTPUT_TOKENS], 50);
        let cost = response.metadata[metadata::COST].as_f64().unwrap();
        assert!((cost - 0.2).abs() < 1e-9);
    }
}
