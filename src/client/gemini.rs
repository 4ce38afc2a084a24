//! Google Gemini `generateContent` backend client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ModelClient;
use super::openai::{build_invocation_response, require_prompt};
use crate::Result;
use crate::types::{InvocationContext, InvocationResponse, ModelDescriptor};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration for the Gemini client.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiClientConfig {
    /// API key, passed as the `key` query parameter.
    pub api_key: String,
    /// Models collection URL; the model id and `:generateContent` verb are
    /// appended per request.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl GeminiClientConfig {
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

/// [`ModelClient`] for models with provider id `gemini` and type `chat`.
pub struct GeminiChatClient {
    config: GeminiClientConfig,
    http: Client,
}

impl GeminiChatClient {
    pub fn new(config: GeminiClientConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model_id
        )
    }
}

#[async_trait]
impl ModelClient for GeminiChatClient {
    fn supports(&self, descriptor: &ModelDescriptor) -> bool {
        descriptor.provider_id.eq_ignore_ascii_case("gemini")
            && descriptor.model_type.eq_ignore_ascii_case("chat")
    }

    async fn invoke(&self, context: &InvocationContext) -> Result<InvocationResponse> {
        let prompt = require_prompt(context)?;
        let model = context
            .model()
            .map(|m| m.model_id.as_str())
            .unwrap_or_default()
            .to_owned();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };
        let start = Instant::now();

        let response = self
            .http
            .post(self.endpoint(&model))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        if let Err(status_error) = response.error_for_status_ref() {
            return Err(status_error.into());
        }
        let generated: GenerateContentResponse = response.json().await?;

        Ok(build_invocation_response(
            context,
            generated.first_candidate_text(),
            generated.usage_metadata.unwrap_or_default().into_tokens(),
            start.elapsed(),
        ))
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn first_candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.clone())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Default, Deserialize)]
struct UsageMetadata {
    #[serde(default, rename = "promptTokenCount")]
    prompt_token_count: u64,
    #[serde(default, rename = "candidatesTokenCount")]
    candidates_token_count: u64,
}

impl UsageMetadata {
    fn into_tokens(self) -> (u64, u64) {
        (self.prompt_token_count, self.candidates_token_count)
    }
}
