use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source and target language codes, passed through to the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One successful translation as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source: String,
    pub target: String,
}

/// Failure translating a single text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("translation backend unreachable: {0}")]
    Transport(String),

    #[error("translation backend timed out")]
    Timeout,

    #[error("translation backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected translation backend response: {0}")]
    Decode(String),

    #[error("translation backend is not configured: {0}")]
    NotConfigured(String),
}

/// External text-in/text-out translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        pair: &LanguagePair,
        text: &str,
    ) -> Result<Translation, TranslationError>;
}
