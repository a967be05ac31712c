pub mod persona;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} API key is required (set CHAT_API_KEY)")]
    MissingApiKey(String),
    #[error("Invalid API key format: {0}")]
    InvalidHeader(String),
    #[error("Failed to read persona file '{path}': {source}")]
    PersonaIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Persona file '{0}' is empty")]
    EmptyPersona(String),
    #[error("History limit must be at least 2, got {0}")]
    InvalidHistoryLimit(usize),
    #[error("Maximum session count must be at least 1")]
    InvalidMaxSessions,
    #[error("Invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
    #[error("Invalid LLM type: '{0}'")]
    InvalidLlmType(String),
    #[error("TLS configuration error: {0}")]
    Tls(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
