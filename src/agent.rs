use crate::cli::Args;
use crate::config::persona;
use crate::history::{ format_history_for_log, SessionStore, DEFAULT_SESSION_ID };
use crate::llm::LlmConfig;
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::chat::ChatMessage;

use log::{ info, debug, error };
use std::error::Error;
use std::sync::Arc;

/// Returned when a turn is processed with nothing to say.
pub const EMPTY_MESSAGE_REPLY: &str = "Kuch toh batao, main yahan hoon sunne ke liye. 😊";
/// Returned in place of any upstream failure.
pub const FALLBACK_REPLY: &str =
    "Sorry yaar, abhi thoda dikkat ho rahi hai, baad mein try karna. 🛠️";

/// Conversation manager: owns every session's history and drives one turn at a time per session.
#[derive(Clone)]
pub struct SukhAgent {
    chat_client: Arc<dyn ChatClient>,
    sessions: Arc<SessionStore>,
}

impl SukhAgent {
    pub async fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_config = LlmConfig::from_args(args)?;
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}, Timeout={:?}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url(),
            chat_config.timeout
        );

        let persona = persona::load_persona(args.persona_path.as_deref())?;
        let sessions = SessionStore::new(persona, args.history_limit, args.max_sessions)?;
        info!(
            "History limit per session: {} messages, at most {} named sessions",
            sessions.limit(),
            args.max_sessions
        );

        Ok(Self::with_client(chat_client, sessions))
    }

    pub fn with_client(chat_client: Arc<dyn ChatClient>, sessions: SessionStore) -> Self {
        Self {
            chat_client,
            sessions: Arc::new(sessions),
        }
    }

    /// Runs one turn on the shared default session.
    pub async fn process_default_turn(&self, user_text: &str) -> String {
        self.process_turn(DEFAULT_SESSION_ID, user_text).await
    }

    /// Appends the user message, asks the completion API for a reply, records it and
    /// applies the retention limit. Never fails: upstream errors become [`FALLBACK_REPLY`]
    /// and leave only the user message behind.
    pub async fn process_turn(&self, session_id: &str, user_text: &str) -> String {
        let message = user_text.trim();
        if message.is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        let conversation = self.sessions.get_or_create(session_id).await;
        // Held across the upstream call so user/assistant pairs never interleave.
        let mut conversation = conversation.lock().await;
        conversation.push_user(message);

        let outcome = self.chat_client.complete(conversation.messages()).await;
        let reply = match outcome {
            Ok(reply) => {
                conversation.push_assistant(reply.as_str());
                let evicted = conversation.enforce_limit();
                if evicted > 0 {
                    debug!("Evicted {} old messages from session '{}'", evicted, session_id);
                }
                reply
            }
            Err(e) => {
                error!("Sukh API error ({}) in session '{}': {}", e.kind(), session_id, e);
                if conversation.discard_stale_unanswered() {
                    debug!("Dropped earlier unanswered message from session '{}'", session_id);
                }
                FALLBACK_REPLY.to_string()
            }
        };

        debug!("Session '{}' roles: {}", session_id, format_history_for_log(&conversation));
        info!("Turn complete for session '{}' (history: {})", session_id, conversation.len());

        reply
    }

    /// Snapshot of a session's history; empty for unknown sessions.
    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        let Some(conversation) = self.sessions.get(session_id).await else {
            return Vec::new();
        };
        let conversation = conversation.lock().await;
        conversation.messages().to_vec()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::history::{ DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_SESSIONS };
    use crate::llm::chat::UpstreamError;
    use crate::models::chat::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicBool, Ordering };

    /// Replies "reply N" and records the history length it was given.
    #[derive(Default)]
    pub(crate) struct RecordingClient {
        pub(crate) seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn complete(&self, history: &[ChatMessage]) -> Result<String, UpstreamError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(history.len());
            Ok(format!("reply {}", seen.len()))
        }

        fn get_model(&self) -> String {
            "recording".into()
        }

        fn get_base_url(&self) -> String {
            "memory://".into()
        }
    }

    pub(crate) struct FailingClient;

    #[async_trait]
    impl ChatClient for FailingClient {
        async fn complete(&self, _history: &[ChatMessage]) -> Result<String, UpstreamError> {
            Err(UpstreamError::Transport("connection refused".into()))
        }

        fn get_model(&self) -> String {
            "failing".into()
        }

        fn get_base_url(&self) -> String {
            "memory://".into()
        }
    }

    pub(crate) fn agent_with(client: Arc<dyn ChatClient>) -> SukhAgent {
        SukhAgent::with_client(client, SessionStore::new("persona", DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_SESSIONS).unwrap())
    }

    #[tokio::test]
    async fn successful_turn_appends_user_and_assistant() {
        let agent = agent_with(Arc::new(RecordingClient::default()));

        let reply = agent.process_default_turn("Hi, I'm feeling anxious today").await;

        assert_eq!(reply, "reply 1");
        let history = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1], ChatMessage::user("Hi, I'm feeling anxious today"));
        assert_eq!(history[2], ChatMessage::assistant("reply 1"));
    }

    #[tokio::test]
    async fn user_text_is_trimmed_before_recording() {
        let agent = agent_with(Arc::new(RecordingClient::default()));
        agent.process_default_turn("  hello \n").await;
        assert_eq!(agent.history(DEFAULT_SESSION_ID).await[1], ChatMessage::user("hello"));
    }

    #[tokio::test]
    async fn upstream_failure_returns_fallback_and_keeps_only_user_turn() {
        let agent = agent_with(Arc::new(FailingClient));

        let reply = agent.process_default_turn("hello").await;

        assert_eq!(reply, FALLBACK_REPLY);
        let history = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::User);
    }

    #[tokio::test]
    async fn blank_input_gets_filler_without_touching_history() {
        let client = Arc::new(RecordingClient::default());
        let agent = agent_with(client.clone());

        assert_eq!(agent.process_default_turn("   ").await, EMPTY_MESSAGE_REPLY);
        assert_eq!(agent.history(DEFAULT_SESSION_ID).await.len(), 1);
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fifteen_turns_stay_capped_with_persona_first() {
        let client = Arc::new(RecordingClient::default());
        let agent = agent_with(client.clone());

        for i in 0..15 {
            agent.process_default_turn(&format!("message {}", i)).await;
        }

        let history = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(history.len(), 20);
        assert_eq!(history[0], ChatMessage::system("persona"));
        assert_eq!(history[19], ChatMessage::assistant("reply 15"));
        assert_eq!(history[18], ChatMessage::user("message 14"));
        // the full history is sent every time, bounded by the limit plus the new user turn
        assert_eq!(client.seen.lock().unwrap().iter().max(), Some(&21));
    }

    #[tokio::test]
    async fn repeated_failures_keep_only_the_latest_unanswered_message() {
        let agent = agent_with(Arc::new(FailingClient));
        for i in 0..30 {
            agent.process_default_turn(&format!("anyone there? {}", i)).await;
        }
        let history = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1], ChatMessage::user("anyone there? 29"));
    }

    /// Succeeds until `failing` is switched on.
    #[derive(Default)]
    struct SwitchableClient {
        failing: AtomicBool,
    }

    #[async_trait]
    impl ChatClient for SwitchableClient {
        async fn complete(&self, history: &[ChatMessage]) -> Result<String, UpstreamError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(UpstreamError::Timeout(std::time::Duration::from_secs(30)));
            }
            Ok(format!("a{}", history.len()))
        }

        fn get_model(&self) -> String {
            "switchable".into()
        }

        fn get_base_url(&self) -> String {
            "memory://".into()
        }
    }

    #[tokio::test]
    async fn failed_turn_on_full_history_keeps_older_context() {
        let client = Arc::new(SwitchableClient::default());
        let agent = agent_with(client.clone());
        for i in 0..10 {
            agent.process_default_turn(&format!("u{}", i)).await;
        }
        let before = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(before.len(), 20);

        client.failing.store(true, Ordering::SeqCst);
        let reply = agent.process_default_turn("fail").await;

        assert_eq!(reply, FALLBACK_REPLY);
        let after = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(after.len(), 21);
        assert_eq!(after[1], before[1]);
        assert_eq!(&after[..20], before.as_slice());
        assert_eq!(after[20], ChatMessage::user("fail"));

        client.failing.store(false, Ordering::SeqCst);
        agent.process_default_turn("back again").await;
        let recovered = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(recovered.len(), 20);
        assert_eq!(recovered[0].role, Role::System);
        assert_eq!(recovered[19].role, Role::Assistant);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let agent = agent_with(Arc::new(RecordingClient::default()));

        agent.process_turn("alice", "hi").await;
        agent.process_turn("alice", "again").await;
        agent.process_turn("bob", "hello").await;

        assert_eq!(agent.history("alice").await.len(), 5);
        assert_eq!(agent.history("bob").await.len(), 3);
        assert_eq!(agent.history(DEFAULT_SESSION_ID).await.len(), 1);
        assert_eq!(agent.session_count().await, 3);
    }

    #[tokio::test]
    async fn concurrent_turns_in_one_session_keep_pairs_intact() {
        let agent = agent_with(Arc::new(RecordingClient::default()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let agent = agent.clone();
            handles.push(tokio::spawn(async move { agent.process_default_turn(&format!("m{}", i)).await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = agent.history(DEFAULT_SESSION_ID).await;
        assert_eq!(history.len(), 17);
        for pair in history[1..].chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }
}
