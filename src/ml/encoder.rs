use serde::Deserialize;
use thiserror::Error;

pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Display labels, by model output index.
const LABELS: [&str; 2] = ["HAM", "SPAM"];

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("label encoder json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("label encoder has {0} classes, expected 2")]
    ClassCount(usize),
}

/// Maps a class index from the model output back to its display label.
///
/// The fitted encoder file only has to agree with the model on the number of
/// classes; the names it stores (strings or integers) are not shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: usize,
}

// Only counted; the payload is checked for shape.
#[allow(dead_code)]
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassName {
    Text(String),
    Index(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EncoderDocument {
    Classes(Vec<ClassName>),
    Fitted { classes: Vec<ClassName> },
}

impl LabelEncoder {
    pub fn from_json(raw: &str) -> Result<Self, EncoderError> {
        let classes = match serde_json::from_str::<EncoderDocument>(raw)? {
            EncoderDocument::Classes(classes) | EncoderDocument::Fitted { classes } => classes,
        };
        if classes.len() != LABELS.len() {
            return Err(EncoderError::ClassCount(classes.len()));
        }
        Ok(Self {
            classes: classes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.classes
    }

    pub fn label(&self, index: usize) -> &'static str {
        LABELS.get(index).copied().unwrap_or(UNKNOWN_LABEL)
    }
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self {
            classes: LABELS.len(),
        }
    }
}
