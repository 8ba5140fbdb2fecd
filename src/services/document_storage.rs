use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::{future::Future, time::Duration};
use uuid::Uuid;

use crate::{
    config::{OutboundConfig, StorageConfig},
    errors::{AppError, AppResult, EvaluationError},
    services::outbound::CallPolicy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Public URL handed to the OCR service and shown to teachers.
    pub url: String,
    /// Handle needed to delete the document again.
    pub storage_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>)
        -> Result<StoredDocument, EvaluationError>;
    async fn delete(&self, storage_id: &str) -> Result<(), EvaluationError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Cloudinary "raw" resources, authenticated with signed requests.
pub struct CloudinaryStorage {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    folder: String,
    policy: CallPolicy,
}

impl CloudinaryStorage {
    pub fn new(config: &StorageConfig, outbound: &OutboundConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to build storage HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
            policy: CallPolicy::from_config(outbound),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/raw/{}",
            self.cloud_name, action
        )
    }

    async fn send_upload(
        &self,
        public_id: String,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, EvaluationError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.folder.as_str()),
                ("overwrite", "true"),
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            self.api_secret.expose_secret(),
        );

        let file = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("public_id", public_id)
            .text("overwrite", "true")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
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

        let uploaded: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            EvaluationError::malformed(format!("upload response: {}", e), body.clone())
        })?;

        Ok(StoredDocument {
            url: uploaded.secure_url,
            storage_id: uploaded.public_id,
        })
    }

    async fn send_delete(&self, storage_id: &str) -> Result<(), EvaluationError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", storage_id), ("timestamp", timestamp.as_str())],
            self.api_secret.expose_secret(),
        );

        let params = [
            ("public_id", storage_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluationError::from_status(status.as_u16(), body));
        }

        Ok(())
    }
}

/// Runs `send` under `policy` with one asset id chosen up front. A retry
/// after a lost response overwrites the asset the first attempt may already
/// have stored, so at most one asset exists per upload.
async fn upload_with_stable_id<F, Fut>(
    policy: &CallPolicy,
    mut send: F,
) -> Result<StoredDocument, EvaluationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<StoredDocument, EvaluationError>>,
{
    let public_id = Uuid::new_v4().simple().to_string();
    policy
        .run("document upload", || send(public_id.clone()))
        .await
}

/// Request signature: the parameters sorted by name, joined as a query
/// string, with the API secret appended, then SHA-1 hex encoded.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl DocumentStorage for CloudinaryStorage {
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredDocument, EvaluationError> {
        let stored = upload_with_stable_id(&self.policy, |public_id| {
            self.send_upload(public_id, file_name, &bytes)
        })
        .await?;
        log::info!("Stored document {} at {}", stored.storage_id, stored.url);
        Ok(stored)
    }

    async fn delete(&self, storage_id: &str) -> Result<(), EvaluationError> {
        self.policy
            .run("document delete", || self.send_delete(storage_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_upload_signature() {
        let signature = sign(
            &[("timestamp", "1700000000"), ("folder", "assignments")],
            "storage-secret",
        );
        assert_eq!(signature, "1e00393723ee3523d8b197b280f436ae0760c232");
    }

    #[tokio::test]
    async fn test_upload_retry_reuses_asset_id() {
        let policy = CallPolicy {
            timeout: Duration::from_millis(50),
            max_retries: 2,
            base_backoff: Duration::from_millis(1),
        };
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let recorder = seen.clone();

        let stored = upload_with_stable_id(&policy, move |public_id| {
            let recorder = recorder.clone();
            async move {
                let first = {
                    let mut seen = recorder.lock().unwrap();
                    seen.push(public_id.clone());
                    seen.len() == 1
                };
                if first {
                    // Stored remotely, but the response never arrives in time.
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Ok(StoredDocument {
                    url: format!("https://files.example/{}", public_id),
                    storage_id: public_id,
                })
            }
        })
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(stored.storage_id, seen[0]);
    }

    #[test]
    fn test_delete_signature() {
        let signature = sign(
            &[("public_id", "assignments/abc"), ("timestamp", "1700000000")],
            "storage-secret",
        );
        assert_eq!(signature, "fb522963df82d2342f20ea73e3b692d9e41e233c");
    }

    #[test]
    fn test_upload_response_shape() {
        let body = r#"{"public_id":"assignments/x1","secure_url":"https://res.cloudinary.com/c/raw/upload/assignments/x1","bytes":42}"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.public_id, "assignments/x1");
        assert!(parsed.secure_url.starts_with("https://"));
    }
}
