pub mod chat;
use crate::cli::Args;
use crate::config::ConfigError;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use std::time::Duration;

/// Providers reachable through the OpenAI-compatible chat-completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Together,
    OpenAI,
    Groq,
    DeepSeek,
    XAI,
    Ollama,
}

impl LlmType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmType::Together => "https://api.together.xyz/v1",
            LlmType::OpenAI => "https://api.openai.com/v1",
            LlmType::Groq => "https://api.groq.com/openai/v1",
            LlmType::DeepSeek => "https://api.deepseek.com/v1",
            LlmType::XAI => "https://api.x.ai/v1",
            LlmType::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Local Ollama accepts unauthenticated requests; hosted providers do not.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmType::Ollama)
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmType::Together => "together",
            LlmType::OpenAI => "openai",
            LlmType::Groq => "groq",
            LlmType::DeepSeek => "deepseek",
            LlmType::XAI => "xai",
            LlmType::Ollama => "ollama",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for LlmType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "together" => Ok(LlmType::Together),
            "openai" => Ok(LlmType::OpenAI),
            "groq" => Ok(LlmType::Groq),
            "deepseek" => Ok(LlmType::DeepSeek),
            "xai" => Ok(LlmType::XAI),
            "ollama" => Ok(LlmType::Ollama),
            _ => Err(ConfigError::InvalidLlmType(s.to_string())),
        }
    }
}

/// Sampling parameters sent unchanged with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 450,
            temperature: 0.8,
            top_p: 0.95,
            frequency_penalty: 0.3,
            presence_penalty: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: String,
    pub base_url: Option<String>,
    pub sampling: SamplingParams,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Together,
            api_key: None,
            completion_model: "mistralai/Mistral-7B-Instruct-v0.1".to_string(),
            base_url: None,
            sampling: SamplingParams::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let llm_type: LlmType = args.chat_llm_type.parse()?;
        let api_key = Some(args.chat_api_key.trim().to_string()).filter(|k| !k.is_empty());

        Ok(Self {
            llm_type,
            api_key,
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone().filter(|u| !u.trim().is_empty()),
            sampling: SamplingParams {
                max_tokens: args.max_tokens,
                temperature: args.temperature,
                top_p: args.top_p,
                frequency_penalty: args.frequency_penalty,
                presence_penalty: args.presence_penalty,
            },
            timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }

    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.llm_type.default_base_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_llm_type_case_insensitively() {
        assert_eq!("Together".parse::<LlmType>().unwrap(), LlmType::Together);
        assert_eq!("OLLAMA".parse::<LlmType>().unwrap(), LlmType::Ollama);
        assert!(matches!("bard".parse::<LlmType>(), Err(ConfigError::InvalidLlmType(_))));
    }

    #[test]
    fn config_from_args_carries_sampling_and_blank_key_is_none() {
        let args = Args::try_parse_from([
            "sukh",
            "--chat-llm-type",
            "groq",
            "--chat-api-key",
            "  ",
            "--temperature",
            "0.5",
            "--request-timeout-secs",
            "5",
        ]).unwrap();
        let config = LlmConfig::from_args(&args).unwrap();

        assert_eq!(config.llm_type, LlmType::Groq);
        assert_eq!(config.api_key, None);
        assert_eq!(config.sampling.temperature, 0.5);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.resolved_base_url(), "https://api.groq.com/openai/v1");
    }
}
