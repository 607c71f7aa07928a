use std::collections::HashMap;

use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Every field falls back to its default, so a single `APP__SERVER__PORT`
/// override is a complete section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound of a `/file_parse` request body
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Location of the document analysis engine service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub s3: S3StorageConfig,
}

/// Object storage credentials, keyed by bucket name
#[derive(Debug, Clone, Deserialize, Default)]
pub struct S3StorageConfig {
    /// Used for any bucket without its own entry
    #[serde(default)]
    pub default_bucket: Option<S3BucketConfig>,
    #[serde(default)]
    pub buckets: HashMap<String, S3BucketConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3BucketConfig {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl S3StorageConfig {
    /// Credentials for `bucket`, falling back to the default entry
    pub fn bucket(&self, bucket: &str) -> Option<&S3BucketConfig> {
        self.buckets.get(bucket).or(self.default_bucket.as_ref())
    }
}

fn default_max_upload_bytes() -> usize {
    200 * 1024 * 1024
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
