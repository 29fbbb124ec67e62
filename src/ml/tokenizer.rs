//! Word-index tokenizer compatible with the Keras `Tokenizer.to_json()` export.
//!
//! Only the encoding half is implemented: the vocabulary and normalization
//! settings are read from the artifact and never change at runtime.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("tokenizer json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tokenizer class {0:?} is not supported")]
    UnsupportedClass(String),
    #[error("tokenizer split string must not be empty")]
    EmptySplit,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    word_index: HashMap<String, i64>,
    num_words: Option<i64>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
    oov_index: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenizerDocument {
    class_name: Option<String>,
    config: TokenizerSettings,
}

#[derive(Debug, Deserialize)]
struct TokenizerSettings {
    num_words: Option<i64>,
    #[serde(default = "default_filters")]
    filters: String,
    #[serde(default = "default_true")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    oov_token: Option<String>,
    word_index: WordIndex,
}

/// Keras stores the vocabulary as a JSON document nested inside a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordIndex {
    Encoded(String),
    Map(HashMap<String, i64>),
}

fn default_filters() -> String {
    DEFAULT_FILTERS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}

impl Tokenizer {
    pub fn from_json(raw: &str) -> Result<Self, TokenizerError> {
        let doc: TokenizerDocument = serde_json::from_str(raw)?;
        if let Some(class) = doc.class_name.filter(|c| c != "Tokenizer") {
            return Err(TokenizerError::UnsupportedClass(class));
        }

        let settings = doc.config;
        if settings.split.is_empty() && !settings.char_level {
            return Err(TokenizerError::EmptySplit);
        }

        let word_index = match settings.word_index {
            WordIndex::Encoded(encoded) => serde_json::from_str(&encoded)?,
            WordIndex::Map(map) => map,
        };
        let oov_index = settings
            .oov_token
            .as_ref()
            .and_then(|token| word_index.get(token).copied());

        Ok(Self {
            word_index,
            num_words: settings.num_words.filter(|n| *n > 0),
            filters: settings.filters,
            lower: settings.lower,
            split: settings.split,
            char_level: settings.char_level,
            oov_index,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.word_index.len()
    }

    pub fn texts_to_sequence(&self, text: &str) -> Vec<i64> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.char_level {
            let mut buf = [0u8; 4];
            text.chars()
                .filter_map(|ch| self.lookup(ch.encode_utf8(&mut buf)))
                .collect()
        } else {
            self.word_sequence(&text)
                .into_iter()
                .filter_map(|word| self.lookup(word))
                .collect()
        }
    }

    fn word_sequence<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Filter characters act as separators, same as `split`.
        let is_filter = |ch: char| self.filters.contains(ch);
        text.split(self.split.as_str())
            .flat_map(|chunk| chunk.split(is_filter))
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn lookup(&self, token: &str) -> Option<i64> {
        match self.word_index.get(token) {
            Some(&id) => match self.num_words {
                Some(limit) if id >= limit => self.oov_index,
                _ => Some(id),
            },
            None => self.oov_index,
        }
    }
}
