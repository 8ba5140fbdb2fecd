use secrecy::SecretString;
use std::{env, time::Duration};

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub outbound: OutboundConfig,
    pub max_upload_bytes: usize,
    pub allow_test_retakes: bool,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub folder: String,
}

#[derive(Clone, Debug)]
pub struct OutboundConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl OutboundConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: env_or("MONGO_DB_NAME", "classgrade-local"),
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse("WEB_SERVER_PORT", 5000),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
            jwt_secret: SecretString::from(env_or("JWT_SECRET", DEFAULT_JWT_SECRET)),
            jwt_expiration_hours: env_parse("JWT_EXPIRATION_HOURS", 24 * 7),
            llm: LlmConfig {
                api_key: SecretString::from(env_or("LLM_API_KEY", "")),
                base_url: env_or(
                    "LLM_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta/openai",
                ),
                model: env_or("LLM_MODEL", "gemini-2.5-flash"),
            },
            ocr: OcrConfig {
                api_key: SecretString::from(env_or("OCR_API_KEY", "")),
                base_url: env_or("OCR_BASE_URL", "https://api.mistral.ai"),
                model: env_or("OCR_MODEL", "mistral-ocr-latest"),
            },
            storage: StorageConfig {
                cloud_name: env_or("CLOUDINARY_CLOUD_NAME", ""),
                api_key: env_or("CLOUDINARY_API_KEY", ""),
                api_secret: SecretString::from(env_or("CLOUDINARY_API_SECRET", "")),
                folder: env_or("CLOUDINARY_FOLDER", "assignments"),
            },
            outbound: OutboundConfig {
                timeout_secs: env_parse("OUTBOUND_TIMEOUT_SECS", 60),
                max_retries: env_parse("OUTBOUND_MAX_RETRIES", 2),
                backoff_ms: env_parse("OUTBOUND_BACKOFF_MS", 500),
            },
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            allow_test_retakes: env_parse("ALLOW_TEST_RETAKES", true),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.llm.api_key.expose_secret().is_empty() {
            panic!("FATAL: LLM_API_KEY is not set.");
        }

        if self.ocr.api_key.expose_secret().is_empty() {
            panic!("FATAL: OCR_API_KEY is not set.");
        }

        if self.storage.cloud_name.is_empty()
            || self.storage.api_key.is_empty()
            || self.storage.api_secret.expose_secret().is_empty()
        {
            panic!("FATAL: CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must all be set.");
        }
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "classgrade-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            llm: LlmConfig {
                api_key: SecretString::from("llm-key".to_string()),
                base_url: "http://localhost:9999/llm".to_string(),
                model: "test-model".to_string(),
            },
            ocr: OcrConfig {
                api_key: SecretString::from("ocr-key".to_string()),
                base_url: "http://localhost:9999/ocr".to_string(),
                model: "test-ocr".to_string(),
            },
            storage: StorageConfig {
                cloud_name: "test-cloud".to_string(),
                api_key: "storage-key".to_string(),
                api_secret: SecretString::from("storage-secret".to_string()),
                folder: "assignments".to_string(),
            },
            outbound: OutboundConfig {
                timeout_secs: 5,
                max_retries: 1,
                backoff_ms: 1,
            },
            max_upload_bytes: 1024 * 1024,
            allow_test_retakes: true,
        }
    }
}
