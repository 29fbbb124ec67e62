use std::sync::Arc;

use crate::{
    config::PreprocessConfig,
    domain::Prediction,
    ml::{
        encoder::LabelEncoder,
        model::{InferenceError, SequenceClassifier},
        sequence::{pad_sequence, PaddedSequence},
        tokenizer::Tokenizer,
    },
};

/// Message text to fixed-length model input.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    tokenizer: Tokenizer,
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(tokenizer: Tokenizer, config: PreprocessConfig) -> Self {
        Self { tokenizer, config }
    }

    pub fn max_len(&self) -> usize {
        self.config.max_len
    }

    pub fn encode(&self, message: &str) -> PaddedSequence {
        let ids = self.tokenizer.texts_to_sequence(message);
        pad_sequence(
            &ids,
            self.config.max_len,
            self.config.padding,
            self.config.truncating,
        )
    }
}

pub struct Predictor {
    preprocessor: Preprocessor,
    model: Arc<dyn SequenceClassifier>,
    encoder: LabelEncoder,
}

impl Predictor {
    pub fn new(
        preprocessor: Preprocessor,
        model: Arc<dyn SequenceClassifier>,
        encoder: LabelEncoder,
    ) -> Self {
        Self {
            preprocessor,
            model,
            encoder,
        }
    }

    pub fn max_len(&self) -> usize {
        self.preprocessor.max_len()
    }

    pub fn predict_message(&self, message: &str) -> Result<Prediction, InferenceError> {
        let sequence = self.preprocessor.encode(message);
        let raw = self.model.predict_proba(&sequence)?;
        let (index, probability) = best_class(&class_distribution(raw))?;

        Ok(Prediction {
            label: self.encoder.label(index).to_string(),
            confidence: (f64::from(probability) * 100.0).clamp(0.0, 100.0),
        })
    }
}

/// A single sigmoid unit is the probability of class 1. Taking argmax over
/// the raw one-element output would always pick index 0, so it is expanded
/// to `[1 - p, p]` first.
fn class_distribution(raw: Vec<f32>) -> Vec<f32> {
    match raw.as_slice() {
        [p] => vec![1.0 - p, *p],
        _ => raw,
    }
}

/// Argmax over the distribution; the lowest index wins an exact tie.
fn best_class(probabilities: &[f32]) -> Result<(usize, f32), InferenceError> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &p) in probabilities.iter().enumerate() {
        if !p.is_finite() {
            return Err(InferenceError::NonFinite(p));
        }
        match best {
            Some((_, current)) if p <= current => {}
            _ => best = Some((index, p)),
        }
    }
    best.ok_or(InferenceError::EmptyOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::{sample_predictor, sample_tokenizer, FixedModel};

    fn predictor_with(output: Vec<f32>) -> Predictor {
        Predictor::new(
            Preprocessor::new(sample_tokenizer(), PreprocessConfig::default()),
            Arc::new(FixedModel::new(output)),
            LabelEncoder::default(),
        )
    }

    #[test]
    fn preprocessor_always_yields_max_len() {
        let preprocessor = Preprocessor::new(sample_tokenizer(), PreprocessConfig::default());
        let long = "win free prize ".repeat(1_000);
        for message in ["", "   ", "Win a free prize now!!!", long.as_str()] {
            assert_eq!(preprocessor.encode(message).len(), 800);
        }
    }

    #[test]
    fn picks_highest_probability_class() {
        let prediction = predictor_with(vec![0.1, 0.9]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "SPAM");
        assert!((prediction.confidence - 90.0).abs() < 1e-4);

        let prediction = predictor_with(vec![0.75, 0.25]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "HAM");
        assert!((prediction.confidence - 75.0).abs() < 1e-4);
    }

    #[test]
    fn exact_tie_resolves_to_lowest_index() {
        let prediction = predictor_with(vec![0.5, 0.5]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "HAM");
    }

    #[test]
    fn index_outside_encoder_is_unknown() {
        let prediction = predictor_with(vec![0.1, 0.2, 0.7]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "UNKNOWN");
    }

    #[test]
    fn sigmoid_output_is_expanded() {
        let prediction = predictor_with(vec![0.2]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "HAM");
        assert!((prediction.confidence - 80.0).abs() < 1e-4);
    }

    #[test]
    fn confidence_is_scaled_in_double_precision() {
        let p = 0.50895f32;
        let prediction = predictor_with(vec![1.0 - p, p]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "SPAM");
        assert_eq!(prediction.confidence, f64::from(p) * 100.0);
        assert_eq!(prediction.confidence_display(), "50.89%");
    }

    #[test]
    fn sigmoid_output_does_not_default_to_first_class() {
        let prediction = predictor_with(vec![0.9]).predict_message("hi").unwrap();
        assert_eq!(prediction.label, "SPAM");
        assert!((prediction.confidence - 90.0).abs() < 1e-4);
    }

    #[test]
    fn confidence_stays_in_percentage_range() {
        let prediction = predictor_with(vec![-3.0, 7.5]).predict_message("hi").unwrap();
        assert_eq!(prediction.confidence, 100.0);
    }

    #[test]
    fn empty_or_nan_output_is_an_error() {
        assert!(matches!(
            predictor_with(vec![]).predict_message("hi"),
            Err(InferenceError::EmptyOutput)
        ));
        assert!(matches!(
            predictor_with(vec![0.3, f32::NAN]).predict_message("hi"),
            Err(InferenceError::NonFinite(_))
        ));
    }

    #[test]
    fn prediction_is_idempotent() {
        let predictor = sample_predictor();
        let first = predictor.predict_message("Win a free prize now!!!").unwrap();
        let second = predictor.predict_message("Win a free prize now!!!").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn model_sees_the_padded_sequence() {
        let predictor = sample_predictor();
        let spam = predictor.predict_message("Win a free prize now!!!").unwrap();
        let ham = predictor.predict_message("see you at lunch").unwrap();
        assert_eq!(spam.label, "SPAM");
        assert_eq!(ham.label, "HAM");
    }
}
