use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tracing::info;

use crate::{
    config::PreprocessConfig,
    infrastructure::directories::ArtifactPaths,
    ml::{
        encoder::{EncoderError, LabelEncoder},
        model::SequenceClassifier,
        predictor::{Predictor, Preprocessor},
        tokenizer::{Tokenizer, TokenizerError},
    },
};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {}", path.display())]
    Missing { kind: &'static str, path: PathBuf },
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tokenizer {}", path.display())]
    Tokenizer {
        path: PathBuf,
        #[source]
        source: TokenizerError,
    },
    #[error("failed to parse label encoder {}", path.display())]
    LabelEncoder {
        path: PathBuf,
        #[source]
        source: EncoderError,
    },
    #[error("failed to load model {}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Loads tokenizer, label encoder and model and wires them into a [`Predictor`].
pub fn load_artifacts(
    paths: &ArtifactPaths,
    preprocessing: PreprocessConfig,
) -> Result<Predictor, ArtifactError> {
    require("model", &paths.model)?;
    let tokenizer = load_tokenizer(&paths.tokenizer)?;
    let encoder = load_label_encoder(&paths.label_encoder)?;
    let model = load_model(&paths.model)?;

    Ok(Predictor::new(
        Preprocessor::new(tokenizer, preprocessing),
        model,
        encoder,
    ))
}

pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, ArtifactError> {
    let raw = read_artifact("tokenizer", path)?;
    let tokenizer = Tokenizer::from_json(&raw).map_err(|source| ArtifactError::Tokenizer {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        target: "artifacts",
        path = %path.display(),
        vocab = tokenizer.vocab_size(),
        "loaded tokenizer"
    );
    Ok(tokenizer)
}

pub fn load_label_encoder(path: &Path) -> Result<LabelEncoder, ArtifactError> {
    let raw = read_artifact("label encoder", path)?;
    let encoder = LabelEncoder::from_json(&raw).map_err(|source| ArtifactError::LabelEncoder {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        target: "artifacts",
        path = %path.display(),
        classes = encoder.len(),
        "loaded label encoder"
    );
    Ok(encoder)
}

#[cfg(feature = "onnx")]
fn load_model(path: &Path) -> Result<Arc<dyn SequenceClassifier>, ArtifactError> {
    let model = crate::ml::model::OnnxClassifier::load(path).map_err(|err| ArtifactError::Model {
        path: path.to_path_buf(),
        source: err.into(),
    })?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "onnx"))]
fn load_model(path: &Path) -> Result<Arc<dyn SequenceClassifier>, ArtifactError> {
    Err(ArtifactError::Model {
        path: path.to_path_buf(),
        source: "built without the `onnx` feature".into(),
    })
}

fn require(kind: &'static str, path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn read_artifact(kind: &'static str, path: &Path) -> Result<String, ArtifactError> {
    require(kind, path)?;
    fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::TOKENIZER_JSON;

    fn artifact_dir() -> (tempfile::TempDir, ArtifactPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths {
            model: dir.path().join("spam-classifier-model.onnx"),
            tokenizer: dir.path().join("tokenizer.json"),
            label_encoder: dir.path().join("label_encoder.json"),
        };
        (dir, paths)
    }

    #[test]
    fn missing_model_is_reported_first() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.tokenizer, TOKENIZER_JSON).unwrap();
        fs::write(&paths.label_encoder, r#"["ham", "spam"]"#).unwrap();

        let err = load_artifacts(&paths, PreprocessConfig::default()).err().unwrap();
        assert!(matches!(err, ArtifactError::Missing { kind: "model", .. }));
    }

    #[test]
    fn loads_tokenizer_and_encoder_from_disk() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.tokenizer, TOKENIZER_JSON).unwrap();
        fs::write(&paths.label_encoder, r#"{"classes": ["ham", "spam"]}"#).unwrap();

        let tokenizer = load_tokenizer(&paths.tokenizer).unwrap();
        assert_eq!(tokenizer.vocab_size(), 9);
        let encoder = load_label_encoder(&paths.label_encoder).unwrap();
        assert_eq!(encoder.label(1), "SPAM");
    }

    #[test]
    fn corrupt_tokenizer_is_fatal() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.tokenizer, "not json").unwrap();
        assert!(matches!(
            load_tokenizer(&paths.tokenizer),
            Err(ArtifactError::Tokenizer { .. })
        ));
    }

    #[test]
    fn missing_tokenizer_names_the_file() {
        let (_dir, paths) = artifact_dir();
        let err = load_tokenizer(&paths.tokenizer).unwrap_err();
        assert!(err.to_string().contains("tokenizer.json"));
    }

    #[test]
    fn label_encoder_must_have_two_classes() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.label_encoder, "[]").unwrap();
        assert!(matches!(
            load_label_encoder(&paths.label_encoder),
            Err(ArtifactError::LabelEncoder {
                source: EncoderError::ClassCount(0),
                ..
            })
        ));
    }

    #[test]
    fn numeric_label_encoder_loads() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.label_encoder, "[0, 1]").unwrap();
        let encoder = load_label_encoder(&paths.label_encoder).unwrap();
        assert_eq!(encoder.label(0), "HAM");
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn corrupt_model_is_fatal() {
        let (_dir, paths) = artifact_dir();
        fs::write(&paths.tokenizer, TOKENIZER_JSON).unwrap();
        fs::write(&paths.label_encoder, r#"["ham", "spam"]"#).unwrap();
        fs::write(&paths.model, b"definitely not onnx").unwrap();

        let err = load_artifacts(&paths, PreprocessConfig::default()).err().unwrap();
        assert!(matches!(err, ArtifactError::Model { .. }));
    }
}
