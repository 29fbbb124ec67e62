pub mod types;

pub use types::Prediction;
