//! Completion service trait
//!
//! The conversation manager only talks to this seam, so the hosted model can
//! be swapped for a stub in tests.

use async_trait::async_trait;

use crate::core::Result;
use crate::llm::envelope::RequestEnvelope;

/// Reply from a completion service
#[derive(Debug, Clone)]
pub struct Completion {
    /// Text of the first candidate
    pub content: String,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl Completion {
    /// Completion with text only
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// An external generative-language endpoint
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one envelope and wait for a single, non-streaming reply.
    ///
    /// Implementations must fail with [`crate::AuraError::Configuration`]
    /// before touching the network when no usable credential is set.
    async fn complete(&self, envelope: &RequestEnvelope) -> Result<Completion>;

    /// Get the service name
    fn name(&self) -> &str;
}
