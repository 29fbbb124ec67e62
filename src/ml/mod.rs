pub mod artifacts;
pub mod encoder;
pub mod model;
pub mod predictor;
pub mod sequence;
pub mod tokenizer;

pub use artifacts::load_artifacts;
pub use model::InferenceError;
pub use predictor::Predictor;
