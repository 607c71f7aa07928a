mod app_config;

pub use app_config::{
    AppConfig, EngineConfig, LogFormat, LoggingConfig, S3BucketConfig, S3StorageConfig,
    ServerConfig, StorageConfig,
};
