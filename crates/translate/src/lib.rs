//! Translation proxy: batch validation and per-item translation.
//!
//! The backend is a black box behind [`Translator`]; this crate owns the
//! batching policy only.

pub mod batch;
pub mod translator;

pub use batch::{
    BatchError, DEFAULT_FROM_LANG, DEFAULT_TO_LANG, ItemOutcome, TranslateBatch, translate_batch,
};
pub use translator::{LanguagePair, Translation, TranslationError, Translator};
