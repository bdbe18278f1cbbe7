//! Agent module - conversation state and turn-taking
//!
//! Contains the capped conversation, the Aura persona, and the manager that
//! runs each request/response round-trip.

pub mod conversation;
pub mod manager;
pub mod persona;

pub use conversation::Conversation;
pub use manager::{BusyFlag, ChatState, ConversationManager, PendingRequest, SubmitOutcome};
