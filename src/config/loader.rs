use std::{env, net::SocketAddr, str::FromStr};

use super::env::{
    AppConfig, ArtifactConfig, ConfigError, DirectoryConfig, LoggingConfig, PreprocessConfig,
    ServerConfig,
};
use crate::ml::sequence::Side;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig {
            bind_addr: parse_or("BIND_ADDR", "127.0.0.1:5000", |value| {
                SocketAddr::from_str(value).map_err(|_| "expected host:port")
            })?,
        };

        let artifacts = ArtifactConfig {
            model_dir: var_or("MODEL_DIR", "model"),
            model_file: var_or("MODEL_FILE", "spam-classifier-model.onnx"),
            tokenizer_file: var_or("TOKENIZER_FILE", "tokenizer.json"),
            label_encoder_file: var_or("LABEL_ENCODER_FILE", "label_encoder.json"),
        };

        let defaults = PreprocessConfig::default();
        let preprocessing = PreprocessConfig {
            max_len: parse_or("MAX_SEQUENCE_LEN", &defaults.max_len.to_string(), parse_max_len)?,
            padding: parse_or("PADDING", defaults.padding.as_str(), parse_side)?,
            truncating: parse_or("TRUNCATING", defaults.truncating.as_str(), parse_side)?,
        };

        let directories = DirectoryConfig {
            logs_dir: var_or("LOGS_DIR", "logs"),
        };

        let logging = LoggingConfig {
            level: var_or("LOG_LEVEL", "info"),
        };

        Ok(Self {
            server,
            artifacts,
            preprocessing,
            directories,
            logging,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(
    key: &'static str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, &'static str>,
) -> Result<T, ConfigError> {
    let value = var_or(key, default);
    parse(value.trim()).map_err(|reason| ConfigError::Invalid { key, value, reason })
}

fn parse_max_len(value: &str) -> Result<usize, &'static str> {
    match value.parse::<usize>() {
        Ok(0) => Err("sequence length must be greater than zero"),
        Ok(len) => Ok(len),
        Err(_) => Err("expected a positive integer"),
    }
}

fn parse_side(value: &str) -> Result<Side, &'static str> {
    match value.to_ascii_lowercase().as_str() {
        "pre" => Ok(Side::Pre),
        "post" => Ok(Side::Post),
        _ => Err("expected \"pre\" or \"post\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parsing_is_case_insensitive() {
        assert_eq!(parse_side("POST"), Ok(Side::Post));
        assert_eq!(parse_side("pre"), Ok(Side::Pre));
        assert!(parse_side("middle").is_err());
    }

    #[test]
    fn max_len_rejects_zero_and_garbage() {
        assert_eq!(parse_max_len("800"), Ok(800));
        assert!(parse_max_len("0").is_err());
        assert!(parse_max_len("-3").is_err());
    }

    #[test]
    fn invalid_value_reports_key() {
        let err = parse_or("MAX_SEQUENCE_LEN_TEST_ONLY", "zero", parse_max_len).unwrap_err();
        assert!(err.to_string().contains("MAX_SEQUENCE_LEN_TEST_ONLY"));
    }
}
