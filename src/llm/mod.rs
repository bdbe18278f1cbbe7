//! LLM module - completion service integration
//!
//! The typed request envelope, the service trait, and the Gemini client.

pub mod envelope;
pub mod gemini;
pub mod traits;

pub use envelope::{build_request, RequestEnvelope};
pub use gemini::GeminiClient;
pub use traits::{Completion, CompletionService, TokenUsage};
