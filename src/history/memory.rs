use super::Conversation;
use crate::config::ConfigError;
use log::{ info, debug };
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const MAX_SESSION_ID_LEN: usize = 128;

/// In-process conversations keyed by session id. Each conversation has its own
/// lock so turns in one session are serialized while sessions run in parallel.
///
/// The default session lives outside the cache and is never evicted. Named
/// sessions are bounded by `max_sessions`; the least recently used one is
/// dropped when a new id arrives at capacity.
pub struct SessionStore {
    persona: Arc<str>,
    limit: usize,
    default: Arc<Mutex<Conversation>>,
    named: Mutex<LruCache<String, Arc<Mutex<Conversation>>>>,
}

impl SessionStore {
    pub fn new(
        persona: impl Into<Arc<str>>,
        limit: usize,
        max_sessions: usize
    ) -> Result<Self, ConfigError> {
        let persona = persona.into();
        let default = Conversation::new(&persona, limit)?;
        let capacity = NonZeroUsize::new(max_sessions).ok_or(ConfigError::InvalidMaxSessions)?;
        Ok(Self {
            persona,
            limit,
            default: Arc::new(Mutex::new(default)),
            named: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<Conversation>> {
        if session_id == DEFAULT_SESSION_ID {
            return Arc::clone(&self.default);
        }

        let mut named = self.named.lock().await;
        if let Some(existing) = named.get(session_id) {
            return Arc::clone(existing);
        }

        info!("Creating conversation for session '{}'", session_id);
        let conversation = Arc::new(Mutex::new(Conversation::fresh(&self.persona, self.limit)));
        if let Some((evicted, _)) = named.push(session_id.to_string(), Arc::clone(&conversation)) {
            debug!("Session capacity reached, evicted least recently used session '{}'", evicted);
        }
        conversation
    }

    /// Looks a session up without creating it or refreshing its recency.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<Conversation>>> {
        if session_id == DEFAULT_SESSION_ID {
            return Some(Arc::clone(&self.default));
        }
        self.named.lock().await.peek(session_id).cloned()
    }

    /// Number of live sessions, the default one included.
    pub(crate) async fn len(&self) -> usize {
        self.named.lock().await.len() + 1
    }
}
