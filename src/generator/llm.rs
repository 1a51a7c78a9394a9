//! Language model adapter: one trait, a chat-completions provider and an offline draft stub.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::llm::LlmConfig;
use crate::config::ConfigError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Maximum prompt characters echoed back by [`DraftModel`].
pub const DRAFT_ECHO_LIMIT: usize = 4_000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Free-text prompt in, free-text completion out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynLanguageModel = Arc<dyn LanguageModel>;

/// Factory: pick the provider named in config.
///
/// * Disabled config, or provider "draft", yields the offline [`DraftModel`].
/// * "openai" requires an API key; a missing key is a configuration error.
pub fn build_language_model(cfg: &LlmConfig, timeout: Duration) -> Result<DynLanguageModel> {
    if !cfg.enabled {
        tracing::info!("LLM disabled; using offline draft model");
        return Ok(Arc::new(DraftModel));
    }
    match cfg.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(cfg, timeout)?)),
        "draft" => Ok(Arc::new(DraftModel)),
        other => anyhow::bail!("Unsupported LLM provider: {other}"),
    }
}

/// OpenAI Chat Completions provider.
pub struct OpenAiModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiModel {
    pub fn new(cfg: &LlmConfig, timeout: Duration) -> Result<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("OPENAI_API_KEY").into());
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building OpenAI HTTP client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}
#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "openai returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: Resp = resp.json().await.context("openai response json")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent.into());
        }
        tracing::debug!(model = %self.model, chars = content.len(), "completion received");
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Offline stand-in: echoes the prompt under a `[DRAFT]` header.
pub struct DraftModel;

#[async_trait]
impl LanguageModel for DraftModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let head: String = prompt.chars().take(DRAFT_ECHO_LIMIT).collect();
        Ok(format!("[DRAFT]\n{head}"))
    }

    fn name(&self) -> &'static str {
        "draft"
    }
}
