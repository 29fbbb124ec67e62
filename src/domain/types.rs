use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
}

impl Prediction {
    pub fn confidence_display(&self) -> String {
        format_confidence(self.confidence)
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{confidence:.2}%")
}
