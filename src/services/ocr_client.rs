use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::{
    config::{OcrConfig, OutboundConfig},
    errors::{AppError, AppResult, EvaluationError},
    services::outbound::CallPolicy,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Text of every page of the document at `document_url`, in order.
    async fn extract_text(&self, document_url: &str) -> Result<String, EvaluationError>;
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    #[serde(default)]
    markdown: Option<String>,
}

impl OcrResponse {
    fn into_text(self) -> String {
        self.pages
            .into_iter()
            .map(|page| page.markdown.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string()
    }
}

pub struct MistralOcrClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    policy: CallPolicy,
}

impl MistralOcrClient {
    pub fn new(config: &OcrConfig, outbound: &OutboundConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build OCR HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            policy: CallPolicy::from_config(outbound),
        })
    }

    async fn send(&self, document_url: &str) -> Result<String, EvaluationError> {
        let payload = json!({
            "model": self.model,
            "document": {
                "type": "document_url",
                "document_url": document_url,
            },
        });

        let response = self
            .client
            .post(format!("{}/v1/ocr", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(EvaluationError::from_status(status.as_u16(), body));
        }

        let parsed: OcrResponse = serde_json::from_str(&body)
            .map_err(|e| EvaluationError::malformed(format!("OCR body: {}", e), body.clone()))?;

        if parsed.pages.is_empty() {
            log::warn!("OCR returned no pages for {}", document_url);
        }

        Ok(parsed.into_text())
    }
}

#[async_trait]
impl OcrClient for MistralOcrClient {
    async fn extract_text(&self, document_url: &str) -> Result<String, EvaluationError> {
        self.policy.run("ocr", || self.send(document_url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_joined_in_order() {
        let response: OcrResponse = serde_json::from_str(
            r##"{"pages":[{"index":0,"markdown":"# Page one"},{"index":1,"markdown":"Page two\n"}]}"##,
        )
        .unwrap();

        assert_eq!(response.into_text(), "# Page one\n\nPage two");
    }

    #[test]
    fn test_missing_pages_gives_empty_text() {
        let response: OcrResponse = serde_json::from_str(r#"{"model":"x"}"#).unwrap();
        assert_eq!(response.into_text(), "");
    }

    #[test]
    fn test_page_without_markdown_is_blank() {
        let response: OcrResponse =
            serde_json::from_str(r#"{"pages":[{"markdown":"a"},{},{"markdown":"c"}]}"#).unwrap();
        assert_eq!(response.into_text(), "a\n\n\n\nc");
    }
}
