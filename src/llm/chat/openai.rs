use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatClient, UpstreamError};
use crate::config::ConfigError;
use crate::llm::{LlmConfig, SamplingParams};
use crate::models::chat::ChatMessage;

const ERROR_BODY_EXCERPT: usize = 200;

/// Client for any provider exposing `POST {base_url}/chat/completions`.
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    sampling: SamplingParams,
    timeout: Duration,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        base_url: String,
        sampling: SamplingParams,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ConfigError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            model,
            base_url,
            sampling,
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        if config.api_key.is_none() && config.llm_type.requires_api_key() {
            return Err(ConfigError::MissingApiKey(config.llm_type.to_string()));
        }

        Self::new(
            config.api_key.clone(),
            config.completion_model.clone(),
            config.resolved_base_url(),
            config.sampling,
            config.timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

fn extract_reply(body: &str) -> Result<String, UpstreamError> {
    let resp: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    let content = resp.choices
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Malformed("response contained no choices".to_string()))?
        .message.content
        .ok_or_else(|| UpstreamError::Malformed("first choice has no content".to_string()))?;

    let reply = content.trim();
    if reply.is_empty() {
        return Err(UpstreamError::Malformed("first choice content is empty".to_string()));
    }
    Ok(reply.to_string())
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, UpstreamError> {
        let req = OpenAIChatRequest {
            model: &self.model,
            messages: history,
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            frequency_penalty: self.sampling.frequency_penalty,
            presence_penalty: self.sampling.presence_penalty,
        };
        debug!("Sending {} messages to {}", history.len(), self.endpoint());

        let resp = self.http.post(self.endpoint())
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_EXCERPT).collect(),
            });
        }

        extract_reply(&body)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
