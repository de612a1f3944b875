use thiserror::Error;

use crate::translator::{LanguagePair, TranslationError, Translator};

pub const DEFAULT_FROM_LANG: &str = "auto";
pub const DEFAULT_TO_LANG: &str = "en";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("No texts provided")]
    Empty,
}

/// A validated, non-empty batch of texts sharing one language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateBatch {
    pair: LanguagePair,
    texts: Vec<String>,
}

impl TranslateBatch {
    /// Blank or missing language codes fall back to `auto` -> `en`.
    pub fn new(
        from: Option<String>,
        to: Option<String>,
        texts: Vec<String>,
    ) -> Result<Self, BatchError> {
        if texts.is_empty() {
            return Err(BatchError::Empty);
        }
        let from = non_blank(from).unwrap_or_else(|| DEFAULT_FROM_LANG.to_string());
        let to = non_blank(to).unwrap_or_else(|| DEFAULT_TO_LANG.to_string());
        Ok(Self {
            pair: LanguagePair::new(from, to),
            texts,
        })
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result for one input text, at the same position as the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Translated { original: String, translated: String },
    Failed { original: String, error: TranslationError },
}

impl ItemOutcome {
    pub fn original(&self) -> &str {
        match self {
            ItemOutcome::Translated { original, .. } | ItemOutcome::Failed { original, .. } => {
                original
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Translate every text of `batch`, one at a time, in input order.
///
/// A failing item is recorded as [`ItemOutcome::Failed`] and the loop moves
/// on: the output always has exactly one entry per input text.
pub async fn translate_batch(
    translator: &dyn Translator,
    batch: &TranslateBatch,
) -> Vec<ItemOutcome> {
    let mut outcomes = Vec::with_capacity(batch.len());

    for (index, text) in batch.texts().iter().enumerate() {
        let outcome = match translator.translate(batch.pair(), text).await {
            Ok(translation) => ItemOutcome::Translated {
                original: text.clone(),
                translated: translation.target,
            },
            Err(error) => {
                tracing::warn!(
                    index,
                    from = %batch.pair().from,
                    to = %batch.pair().to,
                    error = %error,
                    "translation of batch item failed"
                );
                ItemOutcome::Failed {
                    original: text.clone(),
                    error,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;
    use crate::translator::Translation;

    /// Uppercases its input, failing on texts listed in `fail_on`, and
    /// records the order of calls.
    struct ScriptedTranslator {
        fail_on: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTranslator {
        fn new(fail_on: &[&str]) -> Self {
            Self {
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(
            &self,
            _pair: &LanguagePair,
            text: &str,
        ) -> Result<Translation, TranslationError> {
            self.calls.lock().unwrap().push(text.to_string());
            if self.fail_on.contains(text) {
                return Err(TranslationError::Timeout);
            }
            Ok(Translation {
                source: text.to_string(),
                target: text.to_uppercase(),
            })
        }
    }

    fn run<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(TranslateBatch::new(None, None, vec![]), Err(BatchError::Empty));
    }

    #[test]
    fn blank_languages_fall_back_to_defaults() {
        let batch = TranslateBatch::new(Some(" ".into()), None, vec!["hi".into()]).unwrap();
        assert_eq!(batch.pair(), &LanguagePair::new("auto", "en"));

        let batch =
            TranslateBatch::new(Some("zh".into()), Some("fr".into()), vec!["hi".into()]).unwrap();
        assert_eq!(batch.pair(), &LanguagePair::new("zh", "fr"));
    }

    #[tokio::test]
    async fn failure_in_the_middle_does_not_abort_the_batch() {
        let translator = ScriptedTranslator::new(&["b"]);
        let batch =
            TranslateBatch::new(None, None, vec!["a".into(), "b".into(), "c".into()]).unwrap();

        let outcomes = translate_batch(&translator, &batch).await;

        assert_eq!(
            outcomes,
            vec![
                ItemOutcome::Translated {
                    original: "a".into(),
                    translated: "A".into()
                },
                ItemOutcome::Failed {
                    original: "b".into(),
                    error: TranslationError::Timeout
                },
                ItemOutcome::Translated {
                    original: "c".into(),
                    translated: "C".into()
                },
            ]
        );
        assert_eq!(*translator.calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn outcomes_match_inputs_one_to_one(
            texts in proptest::collection::vec("[a-z]{0,6}", 1..20),
            fail_mask in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let failing: Vec<&str> = texts
                .iter()
                .zip(&fail_mask)
                .filter(|(_, fail)| **fail)
                .map(|(t, _)| t.as_str())
                .collect();
            let translator = ScriptedTranslator::new(&failing);
            let batch = TranslateBatch::new(None, None, texts.clone()).unwrap();

            let outcomes = run(translate_batch(&translator, &batch));

            prop_assert_eq!(outcomes.len(), texts.len());
            for (outcome, text) in outcomes.iter().zip(&texts) {
                prop_assert_eq!(outcome.original(), text.as_str());
                prop_assert_eq!(outcome.is_failed(), failing.contains(&text.as_str()));
            }
            prop_assert_eq!(translator.calls.lock().unwrap().len(), texts.len());
        }
    }
}
