//! Generation engine integration.
//!
//! Defines the `ChatGenerator` trait abstracting the external text
//! generation service, and provides the vLLM (OpenAI-compatible server)
//! implementation. Model loading, batching across accelerators, and GPU
//! placement all live on the other side of this boundary.

pub mod vllm;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Conversation, SamplingOptions};

/// Failure inside the generation service or on the wire to it.
///
/// These are fatal to a run: the batch runner does not retry.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to reach generation endpoint")]
    Transport(#[from] reqwest::Error),

    #[error("engine response contained no message content")]
    EmptyChoice,
}

/// Abstraction over the external chat-completion service.
///
/// A chunk of conversations goes in; one generated text per conversation
/// comes back, in submission order. The call is atomic from the caller's
/// perspective; implementations may parallelise internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    /// Generate one completion per conversation, in submission order.
    async fn generate(
        &self,
        conversations: &[Conversation],
        sampling: &SamplingOptions,
    ) -> Result<Vec<String>, GenerationError>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
