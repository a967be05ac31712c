pub mod agent;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use agent::SukhAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("provider default"));
    info!("Chat Model: {}", args.chat_model);
    info!("Chat API Key Set: {}", !args.chat_api_key.trim().is_empty());
    info!(
        "Sampling: max_tokens={}, temperature={}, top_p={}, frequency_penalty={}, presence_penalty={}",
        args.max_tokens,
        args.temperature,
        args.top_p,
        args.frequency_penalty,
        args.presence_penalty
    );
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Persona Path: {}", args.persona_path.as_deref().unwrap_or("built-in"));
    info!("History Limit: {}", args.history_limit);
    info!("Max Sessions: {}", args.max_sessions);
    info!("CORS Origins: {}", args.cors_allowed_origins.join(", "));
    info!("CORS Credentials: {}", args.cors_allow_credentials);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = SukhAgent::new(&args).await?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
