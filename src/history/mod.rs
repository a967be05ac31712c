mod memory;

pub use memory::{ SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_ID, MAX_SESSION_ID_LEN };

use crate::config::ConfigError;
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Ordered message history of one session. Index 0 always holds the persona
/// message and is never evicted.
#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    limit: usize,
}

impl Conversation {
    pub fn new(persona: &str, limit: usize) -> Result<Self, ConfigError> {
        if limit < 2 {
            return Err(ConfigError::InvalidHistoryLimit(limit));
        }
        Ok(Self::fresh(persona, limit))
    }

    fn fresh(persona: &str, limit: usize) -> Self {
        Self {
            messages: vec![ChatMessage::system(persona)],
            limit,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Never zero: the persona message is always present.
    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// After a failed turn, removes the user message left unanswered by an earlier
    /// failed turn, so consecutive failures keep only the latest one. Older
    /// context is never touched. Returns whether a message was removed.
    pub fn discard_stale_unanswered(&mut self) -> bool {
        let len = self.messages.len();
        if len < 3 || self.messages[len - 1].role != Role::User {
            return false;
        }
        if self.messages[len - 2].role != Role::User {
            return false;
        }
        self.messages.remove(len - 2);
        true
    }

    /// Drops the oldest non-system messages until at most `limit` remain.
    /// Returns how many were evicted.
    pub fn enforce_limit(&mut self) -> usize {
        if self.messages.len() <= self.limit {
            return 0;
        }
        let excess = self.messages.len() - self.limit;
        self.messages.drain(1..1 + excess);
        debug_assert_eq!(self.messages[0].role, Role::System);
        excess
    }
}

pub fn format_history_for_log(conversation: &Conversation) -> String {
    conversation.messages
        .iter()
        .map(|msg| msg.role.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(turns: usize) -> Conversation {
        let mut conv = Conversation::new("persona", DEFAULT_HISTORY_LIMIT).unwrap();
        for i in 0..turns {
            conv.push_user(format!("u{}", i));
            conv.push_assistant(format!("a{}", i));
        }
        conv
    }

    #[test]
    fn under_limit_is_untouched() {
        let mut conv = filled(9);
        assert_eq!(conv.len(), 19);
        assert_eq!(conv.enforce_limit(), 0);
        assert_eq!(conv.len(), 19);
    }

    #[test]
    fn trims_to_limit_keeping_system_first() {
        let mut conv = filled(10);
        assert_eq!(conv.len(), 21);
        assert_eq!(conv.enforce_limit(), 1);
        assert_eq!(conv.len(), 20);
        assert_eq!(conv.messages()[0], ChatMessage::system("persona"));
        assert_eq!(conv.messages()[1], ChatMessage::assistant("a0"));
    }

    #[test]
    fn eviction_is_fifo_and_preserves_order() {
        let mut conv = filled(14);
        conv.enforce_limit();

        let expected: Vec<ChatMessage> = (0..14)
            .flat_map(|i| vec![ChatMessage::user(format!("u{}", i)), ChatMessage::assistant(format!("a{}", i))])
            .skip(28 - 19)
            .collect();
        assert_eq!(&conv.messages()[1..], expected.as_slice());
    }

    #[test]
    fn stale_unanswered_user_message_is_discarded_without_touching_context() {
        let mut conv = filled(10);
        conv.push_user("first failure");
        assert!(!conv.discard_stale_unanswered());
        assert_eq!(conv.len(), 21);

        conv.push_user("second failure");
        assert!(conv.discard_stale_unanswered());
        assert_eq!(conv.len(), 21);
        assert_eq!(conv.messages()[1], ChatMessage::user("u0"));
        assert_eq!(conv.messages()[20], ChatMessage::user("second failure"));
        assert_eq!(conv.messages()[19], ChatMessage::assistant("a9"));
    }

    #[test]
    fn persona_alone_is_never_discarded() {
        let mut conv = Conversation::new("persona", DEFAULT_HISTORY_LIMIT).unwrap();
        conv.push_user("only");
        assert!(!conv.discard_stale_unanswered());
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn rejects_limit_without_room_for_a_turn() {
        assert!(matches!(Conversation::new("p", 1), Err(ConfigError::InvalidHistoryLimit(1))));
    }

    #[test]
    fn log_format_lists_roles() {
        let conv = filled(1);
        assert_eq!(format_history_for_log(&conv), "system,user,assistant");
    }
}
