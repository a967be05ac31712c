use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of OpenAI-compatible chat provider (together, openai, groq, deepseek, xai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "together")]
    pub chat_llm_type: String,

    /// Base URL for the chat provider API, up to and including the version segment
    /// (e.g., https://api.together.xyz/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the provider type decide
    pub chat_base_url: Option<String>,

    /// API Key for the chat provider. Read from the environment or a .env file, never hardcoded.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model identifier sent with every completion request.
    #[arg(long, env = "CHAT_MODEL", default_value = "mistralai/Mistral-7B-Instruct-v0.1")]
    pub chat_model: String,

    // --- Sampling Args ---
    /// Maximum number of tokens the model may generate per reply.
    #[arg(long, env = "MAX_TOKENS", default_value = "450")]
    pub max_tokens: u32,

    #[arg(long, env = "TEMPERATURE", default_value = "0.8")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[arg(long, env = "TOP_P", default_value = "0.95")]
    pub top_p: f32,

    #[arg(long, env = "FREQUENCY_PENALTY", default_value = "0.3")]
    pub frequency_penalty: f32,

    #[arg(long, env = "PRESENCE_PENALTY", default_value = "0.4")]
    pub presence_penalty: f32,

    /// Timeout in seconds for a single completion request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Conversation Args ---
    /// Optional path to a text file holding the persona prompt. The built-in persona is used if unset.
    #[arg(long, env = "PERSONA_PATH")]
    pub persona_path: Option<String>,

    /// Maximum number of messages kept per session, persona message included.
    #[arg(long, env = "HISTORY_LIMIT", default_value = "20")]
    pub history_limit: usize,

    /// Maximum number of named sessions kept in memory. The least recently used one is
    /// evicted when a new session arrives at capacity. The default session is not counted.
    #[arg(long, env = "MAX_SESSIONS", default_value = "1000")]
    pub max_sessions: usize,

    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Comma-separated list of origins allowed by CORS. "*" allows any origin.
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_allowed_origins: Vec<String>,

    #[arg(
        long,
        env = "CORS_ALLOW_CREDENTIALS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub cors_allow_credentials: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_flags() {
        let args = Args::try_parse_from([
            "sukh",
            "--chat-api-key",
            "secret",
            "--history-limit",
            "8",
            "--cors-allowed-origins",
            "https://a.example,https://b.example",
            "--cors-allow-credentials",
            "false",
        ]).unwrap();

        assert_eq!(args.chat_api_key, "secret");
        assert_eq!(args.history_limit, 8);
        assert_eq!(args.cors_allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert!(!args.cors_allow_credentials);
    }
}
