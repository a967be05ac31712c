pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use super::LlmConfig;
use crate::config::ConfigError;
use crate::models::chat::ChatMessage;
use self::openai::OpenAIChatClient;

/// Every way a completion call can fail. All of them end in the same fallback
/// reply for the user; the kind only matters for logs.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to completion API failed: {0}")]
    Transport(String),
    #[error("completion API did not answer within {0:?}")]
    Timeout(Duration),
    #[error("completion API returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Malformed(_) => "malformed",
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole history as context and returns the trimmed text of the first choice.
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, UpstreamError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
