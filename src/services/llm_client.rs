use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::{LlmConfig, OutboundConfig},
    errors::EvaluationError,
    services::outbound::CallPolicy,
};

/// Text-in, text-out access to a chat model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, EvaluationError>;
}

/// Any OpenAI-compatible chat completions endpoint. The default base URL
/// points at Gemini's compatibility layer.
pub struct OpenAiCompatibleLlm {
    client: Client<OpenAIConfig>,
    model: String,
    policy: CallPolicy,
}

impl OpenAiCompatibleLlm {
    pub fn new(config: &LlmConfig, outbound: &OutboundConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.base_url.trim_end_matches('/'))
            .with_api_key(config.api_key.expose_secret());

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            policy: CallPolicy::from_config(outbound),
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, EvaluationError> {
        let request = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response: Value = self
            .client
            .chat()
            .create_byot(request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(EvaluationError::EmptyResponse);
        }

        Ok(content.to_string())
    }
}

fn map_openai_error(err: OpenAIError) -> EvaluationError {
    match err {
        OpenAIError::JSONDeserialize(..) => {
            EvaluationError::malformed("chat completion body did not deserialize", err.to_string())
        }
        other => EvaluationError::Transport(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleLlm {
    async fn complete(&self, prompt: &str) -> Result<String, EvaluationError> {
        let text = self.policy.run("llm completion", || self.send(prompt)).await?;
        log::debug!("raw LLM response: {}", text);
        Ok(text)
    }
}
