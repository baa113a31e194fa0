//! Remote answer generation via the LLM proxy
//!
//! Implements the AnswerGenerator trait over HTTP. The proxy accepts an
//! OpenAI-style message list plus model parameters and returns JSON; the
//! assistant text is unwrapped from either a top-level `assistant` field
//! or a `choices[0].message.content` path.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::answer::provider::AnswerGenerator;
use crate::answer::types::{ChatMessage, ChatOutcome, ReasoningEntry};
use crate::config::AiConfig;
use crate::error::{NutellaError, Result};

/// Answer generator backed by the remote LLM proxy
#[derive(Debug)]
pub struct ProxyAnswerer {
    client: Client,
    config: AiConfig,
    api_key: Option<String>,
}

/// Chat request sent to the proxy
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f32,
    n: u32,
}

impl ProxyAnswerer {
    /// Create a new proxy answerer with the given configuration.
    ///
    /// The credential is read once from the environment variable named in
    /// `config.api_key_env`; when unset the proxy is called without auth.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!(
                "Proxy API key env var '{}' not set, calling proxy unauthenticated",
                config.api_key_env
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NutellaError::Answer(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.proxy_url.trim_end_matches('/'))
    }
}

/// Pull assistant text out of a proxy response.
///
/// Accepts the proxy's native `{assistant: ...}` shape and the
/// OpenAI-compatible `choices[0].message.content` shape.
fn extract_assistant(raw: &Value) -> Option<String> {
    if let Some(text) = raw["assistant"].as_str() {
        return Some(text.to_string());
    }
    raw["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl AnswerGenerator for ProxyAnswerer {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatOutcome> {
        let request = ChatRequest {
            messages,
            model: &self.config.model,
            temperature: self.config.temperature,
            n: self.config.n,
        };

        let url = self.endpoint("chat");
        debug!("Calling AI proxy at: {url}");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NutellaError::Answer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NutellaError::Answer(format!(
                "Proxy returned {status}: {body}"
            )));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| NutellaError::Parse(e.to_string()))?;

        let assistant = extract_assistant(&raw);
        Ok(ChatOutcome { assistant, raw })
    }

    /// Post the entry to the proxy's reasoning endpoint on a detached task.
    /// Failures are logged at debug level and never surface to callers.
    fn submit_reasoning(&self, entry: ReasoningEntry) {
        let client = self.client.clone();
        let url = self.endpoint("reasoning");
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let mut builder = client.post(&url).json(&entry);
            if let Some(key) = api_key {
                builder = builder.header("Authorization", format!("Bearer {key}"));
            }
            match builder.send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!("Reasoning log rejected: {}", response.status());
                }
                Ok(_) => {}
                Err(e) => debug!("Reasoning log submission failed: {e}"),
            }
        });
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}
