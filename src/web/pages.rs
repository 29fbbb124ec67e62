use minijinja::Environment;
use serde::Serialize;

use crate::domain::Prediction;

const INDEX_TEMPLATE: &str = "index.html";

/// Compiled page templates. Names ending in `.html` are auto-escaped.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn render_index(&self, page: &IndexPage) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX_TEMPLATE)?.render(page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    pub message: String,
    pub prediction: String,
    pub confidence: String,
    pub error: Option<String>,
}

impl Default for IndexPage {
    fn default() -> Self {
        Self {
            message: String::new(),
            prediction: String::new(),
            confidence: format!("{:.2}", 0.0),
            error: None,
        }
    }
}

impl IndexPage {
    pub fn with_message(message: String) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }

    pub fn with_prediction(message: String, prediction: &Prediction) -> Self {
        Self {
            message,
            prediction: prediction.label.clone(),
            confidence: format!("{:.2}", prediction.confidence),
            error: None,
        }
    }

    pub fn with_error(message: String, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::with_message(message)
        }
    }
}
