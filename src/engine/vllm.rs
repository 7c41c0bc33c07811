//! vLLM generation client.
//!
//! Implements `ChatGenerator` against the OpenAI-compatible chat completions
//! API that a vLLM server exposes. One HTTP request is issued per
//! conversation in the submitted chunk; requests within a chunk run
//! concurrently and results are returned in submission order. There is no
//! retry: any transport or API failure propagates and aborts the run.

use futures::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChatGenerator, GenerationError};
use crate::config::EngineConfig;
use crate::types::{Conversation, SamplingOptions};

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct VllmClient {
    http: Client,
    chat_url: String,
    model: String,
}

impl VllmClient {
    /// Build a client for one serving endpoint.
    ///
    /// `num_gpus` is the tensor-parallel size of the serving deployment; the
    /// server owns GPU placement, so the value is recorded here for the run
    /// log only.
    pub fn new(cfg: &EngineConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("Failed to build generation HTTP client")?;

        info!(
            endpoint = %cfg.endpoint,
            model = %cfg.model,
            tensor_parallel_size = cfg.num_gpus,
            "Generation engine configured"
        );

        Ok(Self {
            http,
            chat_url: format!("{}/v1/chat/completions", cfg.endpoint.trim_end_matches('/')),
            model: cfg.model.clone(),
        })
    }

    /// Issue one chat completion request.
    async fn chat(
        &self,
        conversation: &Conversation,
        sampling: &SamplingOptions,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: conversation
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
        };

        let response = self.http.post(&self.chat_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;

        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(GenerationError::EmptyChoice)
    }
}

#[async_trait::async_trait]
impl ChatGenerator for VllmClient {
    async fn generate(
        &self,
        conversations: &[Conversation],
        sampling: &SamplingOptions,
    ) -> Result<Vec<String>, GenerationError> {
        // try_join_all preserves input order, so output[i] is the completion
        // for conversations[i] regardless of which request finishes first.
        try_join_all(conversations.iter().map(|c| self.chat(c, sampling))).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
