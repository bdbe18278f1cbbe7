//! Aura - Sustainability Copilot
//!
//! A chat client that forwards text and image input to the Gemini
//! generateContent API and folds each reply back into a capped conversation.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Request envelope, completion service trait, Gemini client
//! - **Agent**: Conversation history, persona, and the conversation manager
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use aura::{Config, ConversationManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut chat = ConversationManager::with_gemini(Config::load()).unwrap();
//!
//!     let outcome = chat.submit("How do I compost?", None).await.unwrap();
//!     if let Some(reply) = outcome.reply() {
//!         println!("{}", reply.text);
//!     }
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;

// Re-export commonly used items
pub use agent::{ConversationManager, SubmitOutcome};
pub use cli::Repl;
pub use core::{AuraError, Config, ImageAttachment, Result, Role, Turn};
