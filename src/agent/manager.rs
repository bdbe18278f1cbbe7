//! Conversation manager
//!
//! Owns the conversation and runs one request/response round-trip per user
//! submission: Idle -> AwaitingResponse -> Idle.
//!
//! A submission is split in two phases so a front-end with its own event loop
//! can stay responsive while the request is in flight:
//!
//! 1. [`ConversationManager::begin`] appends the user turn, raises the busy
//!    flag and returns a [`PendingRequest`] holding the envelope.
//! 2. [`ConversationManager::finish`] folds the service outcome back in.
//!
//! [`ConversationManager::submit`] runs both phases around the configured
//! [`CompletionService`]. While a request is pending, new submissions are
//! rejected with [`AuraError::Busy`] and leave the conversation untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::conversation::Conversation;
use crate::core::{AuraError, Config, ImageAttachment, Result, Turn};
use crate::llm::envelope::{build_request, RequestEnvelope};
use crate::llm::{Completion, CompletionService, GeminiClient};

/// Round-trip state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// Ready for input
    Idle,
    /// A completion is in flight
    AwaitingResponse,
}

/// Read-only view of the busy flag, for spinners and status lines
#[derive(Debug, Clone)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Whether a completion is in flight
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the busy flag when dropped
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A dispatched submission waiting for its reply.
///
/// Dropping it without calling [`ConversationManager::finish`] returns the
/// manager to idle.
#[derive(Debug)]
pub struct PendingRequest {
    envelope: RequestEnvelope,
    user_turn_id: String,
    _busy: BusyGuard,
}

impl PendingRequest {
    /// Envelope to send
    pub fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }

    /// Id of the user turn that triggered this request
    pub fn user_turn_id(&self) -> &str {
        &self.user_turn_id
    }
}

/// Result of a submission
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Blank text and no image; nothing happened
    Ignored,
    /// The assistant turn that was appended
    Replied(Turn),
}

impl SubmitOutcome {
    /// Appended assistant turn, if any
    pub fn reply(&self) -> Option<&Turn> {
        match self {
            SubmitOutcome::Replied(turn) => Some(turn),
            SubmitOutcome::Ignored => None,
        }
    }
}

/// Owns the conversation and orchestrates round-trips
pub struct ConversationManager {
    config: Config,
    service: Arc<dyn CompletionService>,
    conversation: Conversation,
    busy: Arc<AtomicBool>,
}

impl ConversationManager {
    /// Create a manager around any completion service
    pub fn new(config: Config, service: Arc<dyn CompletionService>) -> Self {
        let conversation = Conversation::new(config.conversation.max_history);
        Self {
            config,
            service,
            conversation,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a manager backed by the Gemini API
    pub fn with_gemini(config: Config) -> Result<Self> {
        let client = GeminiClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Start a submission.
    ///
    /// Returns `Ok(None)` for blank text without an image. Otherwise the user
    /// turn is appended immediately and the envelope is built from the
    /// history as it stood before that turn.
    pub fn begin(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<Option<PendingRequest>> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Ok(None);
        }

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AuraError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let envelope = build_request(&self.config, self.conversation.turns(), text, image.as_ref());
        let turn = Turn::user(text, image);
        let user_turn_id = turn.id.clone();
        self.conversation.push(turn);

        debug!(
            turn = %user_turn_id,
            history = self.conversation.len(),
            "user turn appended, awaiting response"
        );

        Ok(Some(PendingRequest {
            envelope,
            user_turn_id,
            _busy: guard,
        }))
    }

    /// Fold a service outcome into the conversation and return to idle.
    ///
    /// On failure nothing is appended; the user turn stays so it can be
    /// retried.
    pub fn finish(&mut self, pending: PendingRequest, outcome: Result<Completion>) -> Result<Turn> {
        let result = match outcome {
            Ok(completion) => {
                let turn = Turn::assistant(completion.content);
                self.conversation.push(turn.clone());
                info!(
                    reply_to = %pending.user_turn_id,
                    history = self.conversation.len(),
                    "assistant turn appended"
                );
                Ok(turn)
            }
            Err(e) => {
                warn!(reply_to = %pending.user_turn_id, error = %e, "completion failed");
                Err(e)
            }
        };

        drop(pending);
        result
    }

    /// Submit text and an optional image, and wait for the reply
    pub async fn submit(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<SubmitOutcome> {
        let Some(pending) = self.begin(text, image)? else {
            return Ok(SubmitOutcome::Ignored);
        };

        let service = Arc::clone(&self.service);
        let outcome = service.complete(pending.envelope()).await;

        self.finish(pending, outcome).map(SubmitOutcome::Replied)
    }

    /// Submit one of the starter prompts.
    ///
    /// Unlike [`submit`](Self::submit), a missing credential is reported
    /// before anything is appended.
    pub async fn submit_example(&mut self, prompt: &str) -> Result<SubmitOutcome> {
        if !self.config.is_api_configured() {
            return Err(AuraError::config(
                "The API is not yet configured. Please check the developer setup.",
            ));
        }
        self.submit(prompt, None).await
    }

    /// Empty the conversation
    pub fn clear(&mut self) {
        self.conversation.clear();
        info!("conversation cleared");
    }

    /// Current round-trip state
    pub fn state(&self) -> ChatState {
        if self.is_busy() {
            ChatState::AwaitingResponse
        } else {
            ChatState::Idle
        }
    }

    /// Whether a completion is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Shared handle on the busy flag
    pub fn busy_flag(&self) -> BusyFlag {
        BusyFlag(Arc::clone(&self.busy))
    }

    /// Retained turns, oldest first
    pub fn turns(&self) -> Vec<&Turn> {
        self.conversation.turns().collect()
    }

    /// The conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Number of retained turns
    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    /// Whether there are no turns
    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the backing service
    pub fn service_name(&self) -> &str {
        self.service.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use crate::llm::envelope::{Part, ServiceRole};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    enum Reply {
        Text(&'static str),
        Status(u16),
        Empty,
    }

    struct StubService {
        reply: Reply,
        calls: AtomicUsize,
        seen: Mutex<Vec<RequestEnvelope>>,
    }

    impl StubService {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for StubService {
        async fn complete(&self, envelope: &RequestEnvelope) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(envelope.clone());
            match self.reply {
                Reply::Text(text) => Ok(Completion::text(text, "stub")),
                Reply::Status(code) => Err(AuraError::transport(code, "boom")),
                Reply::Empty => Err(AuraError::empty_response(None)),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.set_api_key("test-key");
        config.conversation.max_history = 50;
        config
    }

    fn manager(reply: Reply) -> (ConversationManager, Arc<StubService>) {
        let stub = StubService::new(reply);
        (ConversationManager::new(config(), stub.clone()), stub)
    }

    #[tokio::test]
    async fn test_blank_submission_is_noop() {
        let (mut manager, stub) = manager(Reply::Text("unused"));
        let outcome = manager.submit("   ", None).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Ignored));
        assert!(manager.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_compost_round_trip() {
        let (mut manager, _stub) = manager(Reply::Text("Start with a bin..."));
        let outcome = manager.submit("How do I compost?", None).await.unwrap();

        assert_eq!(outcome.reply().unwrap().text, "Start with a bin...");
        let turns = manager.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].role, turns[0].text.as_str()), (Role::User, "How do I compost?"));
        assert_eq!((turns[1].role, turns[1].text.as_str()), (Role::Assistant, "Start with a bin..."));
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_user_turn_appended_before_reply() {
        let (mut manager, _stub) = manager(Reply::Text("later"));
        let pending = manager.begin("Is bamboo sustainable?", None).unwrap().unwrap();

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.state(), ChatState::AwaitingResponse);
        assert!(manager.busy_flag().is_set());
        assert_eq!(manager.turns()[0].id, pending.user_turn_id());

        let reply = manager
            .finish(pending, Ok(Completion::text("Often, yes.", "stub")))
            .unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_failure_appends_nothing_and_clears_busy() {
        for reply in [Reply::Status(500), Reply::Empty] {
            let (mut manager, _stub) = manager(reply);
            let err = manager.submit("hello", None).await.unwrap_err();

            assert!(err.is_recoverable());
            assert_eq!(manager.len(), 1);
            assert!(manager.turns()[0].is_user());
            assert!(!manager.is_busy());
        }
    }

    #[test]
    fn test_overlapping_submission_rejected() {
        let (mut manager, _stub) = manager(Reply::Text("ok"));
        let pending = manager.begin("first", None).unwrap().unwrap();

        let err = manager.begin("second", None).unwrap_err();
        assert!(matches!(err, AuraError::Busy));
        assert_eq!(manager.len(), 1);

        // Blank input is still a no-op, not a rejection
        assert!(manager.begin("", None).unwrap().is_none());

        drop(pending);
        assert!(!manager.is_busy());
        assert!(manager.begin("third", None).unwrap().is_some());
    }

    #[test]
    fn test_envelope_uses_prior_history() {
        let (mut manager, stub) = manager(Reply::Text("Sure."));
        tokio_test::block_on(manager.submit("one", None)).unwrap();
        tokio_test::block_on(manager.submit("two", None)).unwrap();

        let seen = stub.seen.lock().unwrap();
        let second = &seen[1];
        // preamble (2) + prior user/assistant (2) + new input (1)
        assert_eq!(second.contents.len(), 5);
        assert_eq!(second.contents[2].role, ServiceRole::User);
        assert_eq!(second.contents[3].role, ServiceRole::Model);
        assert_eq!(second.latest().unwrap().parts, vec![Part::text("two")]);

        // The preamble never leaks into the displayed history
        let prompt = &manager.config().persona.system_prompt;
        assert!(manager.turns().iter().all(|t| &t.text != prompt));
    }

    #[tokio::test]
    async fn test_image_submission() {
        let (mut manager, stub) = manager(Reply::Text("That is a PET bottle."));
        let image = ImageAttachment::new("image/png", vec![1, 2, 3]);
        manager.submit("", Some(image)).await.unwrap();

        let first = &manager.turns()[0];
        assert_eq!(first.text, crate::core::types::IMAGE_ONLY_PLACEHOLDER);
        assert!(first.image.is_some());
        assert!(stub.seen.lock().unwrap()[0].has_image());
    }

    #[tokio::test]
    async fn test_clear() {
        let (mut manager, _stub) = manager(Reply::Text("reply"));
        manager.clear();
        assert!(manager.is_empty());

        manager.submit("hello", None).await.unwrap();
        manager.clear();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_history_capped() {
        let stub = StubService::new(Reply::Text("ok"));
        let mut config = config();
        config.conversation.max_history = 4;
        let mut manager = ConversationManager::new(config, stub);

        for i in 0..5 {
            manager.submit(&format!("q{}", i), None).await.unwrap();
            assert!(manager.len() <= 4);
        }
        let texts: Vec<&str> = manager.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["q3", "ok", "q4", "ok"]);
    }

    #[tokio::test]
    async fn test_example_without_key_appends_nothing() {
        let stub = StubService::new(Reply::Text("ok"));
        let mut config = config();
        config.set_api_key("");
        let mut manager = ConversationManager::new(config, stub.clone());

        let err = manager
            .submit_example(crate::agent::persona::EXAMPLE_PROMPTS[0].prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, AuraError::Configuration(_)));
        assert!(manager.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }
}
