//! Forward pass over a padded sequence.
//!
//! [`SequenceClassifier`] is the seam between the predictor and the inference
//! runtime. The production implementation runs an ONNX export of the trained
//! Keras model through ONNX Runtime.

use thiserror::Error;

use crate::ml::sequence::PaddedSequence;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference runtime failed: {0}")]
    Runtime(String),
    #[error("model returned no class probabilities")]
    EmptyOutput,
    #[error("model returned a non-finite probability: {0}")]
    NonFinite(f32),
    #[error("prediction task aborted: {0}")]
    Aborted(String),
}

pub trait SequenceClassifier: Send + Sync {
    /// Class probabilities for a single sequence.
    fn predict_proba(&self, sequence: &PaddedSequence) -> Result<Vec<f32>, InferenceError>;
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::Path;

    use ort::session::Session;
    use ort::tensor::TensorElementType;
    use ort::value::{Tensor, ValueType};
    use parking_lot::Mutex;
    use tracing::info;

    use super::{InferenceError, SequenceClassifier};
    use crate::ml::sequence::PaddedSequence;

    #[derive(Debug, Clone, Copy)]
    enum InputKind {
        Int32,
        Int64,
        Float32,
    }

    /// ONNX Runtime session for the exported classifier.
    ///
    /// `Session::run` needs exclusive access, so concurrent requests take
    /// turns on the mutex.
    pub struct OnnxClassifier {
        session: Mutex<Session>,
        input_name: String,
        input_kind: InputKind,
    }

    impl OnnxClassifier {
        pub fn load(model_path: &Path) -> anyhow::Result<Self> {
            let session = Session::builder()?.commit_from_file(model_path)?;

            let input = session
                .inputs()
                .first()
                .ok_or_else(|| anyhow::anyhow!("model {model_path:?} declares no inputs"))?;
            let input_name = input.name().to_string();
            let input_kind = match input.dtype() {
                ValueType::Tensor { ty, .. } => match ty {
                    TensorElementType::Int32 => InputKind::Int32,
                    TensorElementType::Int64 => InputKind::Int64,
                    TensorElementType::Float32 => InputKind::Float32,
                    other => anyhow::bail!("unsupported model input element type {other:?}"),
                },
                other => anyhow::bail!("model input is not a tensor: {other:?}"),
            };

            info!(
                target: "artifacts",
                model = %model_path.display(),
                input = %input_name,
                kind = ?input_kind,
                "loaded onnx model"
            );
            Ok(Self {
                session: Mutex::new(session),
                input_name,
                input_kind,
            })
        }

        fn run(&self, sequence: &PaddedSequence) -> ort::Result<Vec<f32>> {
            let ids = sequence.ids();
            let shape = [1i64, sequence.len() as i64];

            let mut session = self.session.lock();
            let outputs = match self.input_kind {
                InputKind::Int32 => {
                    let data: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
                    let tensor = Tensor::from_array((shape, data.into_boxed_slice()))?;
                    session.run(ort::inputs![self.input_name.as_str() => tensor])?
                }
                InputKind::Int64 => {
                    let tensor = Tensor::from_array((shape, ids.to_vec().into_boxed_slice()))?;
                    session.run(ort::inputs![self.input_name.as_str() => tensor])?
                }
                InputKind::Float32 => {
                    let data: Vec<f32> = ids.iter().map(|&id| id as f32).collect();
                    let tensor = Tensor::from_array((shape, data.into_boxed_slice()))?;
                    session.run(ort::inputs![self.input_name.as_str() => tensor])?
                }
            };

            let (_, probabilities) = outputs[0].try_extract_tensor::<f32>()?;
            Ok(probabilities.to_vec())
        }
    }

    impl SequenceClassifier for OnnxClassifier {
        fn predict_proba(&self, sequence: &PaddedSequence) -> Result<Vec<f32>, InferenceError> {
            self.run(sequence)
                .map_err(|err| InferenceError::Runtime(err.to_string()))
        }
    }
}
