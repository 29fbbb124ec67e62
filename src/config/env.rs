use std::net::SocketAddr;

use thiserror::Error;

use crate::ml::sequence::Side;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub preprocessing: PreprocessConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub model_dir: String,
    pub model_file: String,
    pub tokenizer_file: String,
    pub label_encoder_file: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    pub max_len: usize,
    pub padding: Side,
    pub truncating: Side,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_len: 800,
            padding: Side::Post,
            truncating: Side::Post,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for environment variable {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
