use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::{gemini, openai};
use tracing::info;

use super::prompt::PromptContext;
use super::resolver::IntentModel;
use crate::config::Config;
use crate::error::{config_error, nlp_error, AgentResult};

const TEMPERATURE: f64 = 0.1;
const MAX_TOKENS: u64 = 1000;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

impl LlmProvider {
    pub fn parse(name: &str) -> AgentResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(config_error(&format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Intent model backed by Rig
pub struct RigIntentModel {
    provider: LlmProvider,
    api_key: String,
    model: String,
}

impl RigIntentModel {
    pub fn new(provider: LlmProvider, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build from config, or `None` when no API key is configured
    pub fn from_config(config: &Config) -> AgentResult<Option<Self>> {
        let Some(api_key) = &config.llm_api_key else {
            return Ok(None);
        };
        let provider = LlmProvider::parse(&config.llm_provider)?;
        info!("Using {:?} model {}", provider, config.llm_model);
        Ok(Some(Self::new(provider, api_key.clone(), config.llm_model.clone())))
    }
}

#[async_trait]
impl IntentModel for RigIntentModel {
    async fn infer(&self, context: &PromptContext, utterance: &str) -> AgentResult<String> {
        let preamble = context.system_prompt();
        let prompt = context.user_prompt(utterance);

        let response = match self.provider {
            LlmProvider::Gemini => {
                let agent = gemini::Client::new(&self.api_key)
                    .agent(&self.model)
                    .preamble(&preamble)
                    .temperature(TEMPERATURE)
                    .max_tokens(MAX_TOKENS)
                    .build();
                agent.chat(prompt, Vec::<Message>::new()).await
            }
            LlmProvider::OpenAi => {
                let agent = openai::Client::new(&self.api_key)
                    .agent(&self.model)
                    .preamble(&preamble)
                    .temperature(TEMPERATURE)
                    .max_tokens(MAX_TOKENS)
                    .build();
                agent.chat(prompt, Vec::<Message>::new()).await
            }
        }
        .map_err(|e| nlp_error(&format!("Rig API request failed: {}", e)))?;

        info!("Received response from {:?}", self.provider);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(LlmProvider::parse("Gemini").unwrap(), LlmProvider::Gemini);
        assert_eq!(LlmProvider::parse("openai").unwrap(), LlmProvider::OpenAi);
        assert!(LlmProvider::parse("parrot").is_err());
    }

    #[test]
    fn test_no_key_means_no_model() {
        let config = Config::default();
        assert!(RigIntentModel::from_config(&config).unwrap().is_none());
    }
}
