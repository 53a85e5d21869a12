use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use pipeshell_core::config::{LlmConfig, LlmProvider};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 256;
const ERROR_BODY_LIMIT: usize = 200;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Single-turn completion client for the supported hosted and local providers.
pub struct HttpLlmClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    temperature: f32,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            client,
            provider: config.provider,
            base_url: config.effective_base_url().trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| anyhow!("no api key configured for {:?}", self.provider))
    }

    fn build_request(&self, prompt: &str) -> Result<RequestBuilder> {
        let messages = vec![ChatMessage { role: "user", content: prompt }];
        let request = match self.provider {
            LlmProvider::Groq | LlmProvider::OpenAi => self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(self.api_key()?)
                .json(&ChatRequest { model: &self.model, temperature: self.temperature, messages }),
            LlmProvider::Anthropic => self
                .client
                .post(format!("{}/v1/messages", self.base_url))
                .header("x-api-key", self.api_key()?)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&AnthropicRequest {
                    model: &self.model,
                    max_tokens: ANTHROPIC_MAX_TOKENS,
                    temperature: self.temperature,
                    messages,
                }),
            LlmProvider::Ollama => self.client.post(format!("{}/api/chat", self.base_url)).json(
                &OllamaRequest {
                    model: &self.model,
                    messages,
                    stream: false,
                    options: OllamaOptions { temperature: self.temperature },
                },
            ),
        };
        Ok(request)
    }

    fn extract_text(&self, body: &str) -> Result<String> {
        let text = match self.provider {
            LlmProvider::Groq | LlmProvider::OpenAi => {
                let response: ChatResponse =
                    serde_json::from_str(body).context("failed to decode chat completion")?;
                response.choices.into_iter().next().and_then(|choice| choice.message.content)
            }
            LlmProvider::Anthropic => {
                let response: AnthropicResponse =
                    serde_json::from_str(body).context("failed to decode anthropic message")?;
                response
                    .content
                    .into_iter()
                    .find(|block| block.kind == "text")
                    .and_then(|block| block.text)
            }
            LlmProvider::Ollama => {
                let response: OllamaResponse =
                    serde_json::from_str(body).context("failed to decode ollama chat response")?;
                response.message.content
            }
        };

        text.filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow!("{:?} returned an empty completion", self.provider))
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            event_name = "llm.completion.requested",
            provider = ?self.provider,
            model = %self.model,
            "requesting completion"
        );

        let response = self
            .build_request(prompt)?
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("llm request failed")?;

        let status = response.status();
        let body = response.text().await.context("failed to read llm response body")?;
        if !status.is_success() {
            bail!("{:?} returned {status}: {}", self.provider, truncate(&body, ERROR_BODY_LIMIT));
        }

        self.extract_text(&body)
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: ChatReply,
}
