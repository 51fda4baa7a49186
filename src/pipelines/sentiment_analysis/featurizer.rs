//! Turns raw comments into bag-of-n-gram vectors.
//!
//! Text is normalized and split with the BERT normalizer and pre-tokenizer from `tokenizers`,
//! then counted as word n-grams and per-token character n-grams against a vocabulary learned
//! from the training set.

use std::{
    collections::{BTreeMap, HashMap},
    iter,
};

use tokenizers::{
    normalizers::BertNormalizer, pre_tokenizers::bert::BertPreTokenizer, NormalizedString,
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

use crate::utils::classes::invert_map;

use super::{Features, Item, Labeled};

/// Marks the start of a token for character n-grams
const TOKEN_START: char = '<';

/// Marks the end of a token for character n-grams
const TOKEN_END: char = '>';

/// Featurizer configuration
#[derive(burn::config::Config, Debug)]
pub struct FeaturizerConfig {
    /// Longest run of words counted as a single term
    #[config(default = 2)]
    pub word_ngram_length: usize,

    /// Character n-gram length, 0 to disable character n-grams
    #[config(default = 3)]
    pub char_ngram_length: usize,

    /// Maximum vocabulary size
    #[config(default = 10_000)]
    pub max_terms: usize,

    /// Minimum number of occurrences in the training set for a term to be kept
    #[config(default = 1)]
    pub min_count: usize,

    /// Lowercase text before splitting
    #[config(default = true)]
    pub lowercase: bool,

    /// Keep punctuation tokens
    #[config(default = true)]
    pub keep_punctuation: bool,

    /// Scale each vector to unit L2 norm
    #[config(default = true)]
    pub normalize: bool,
}

/// Featurizer Error
#[derive(thiserror::Error, Debug)]
pub enum FeaturizeError {
    /// The tokenizers normalizer or pre-tokenizer rejected the text
    #[error("unable to tokenize text: {0}")]
    Tokenize(String),

    /// No term met the vocabulary requirements
    #[error("no term in the training set met the vocabulary requirements")]
    EmptyVocabulary,
}

/// A fitted text featurizer
#[derive(Clone, Debug)]
pub struct Featurizer {
    config: FeaturizerConfig,
    terms: Vec<String>,
    index: HashMap<String, usize>,
    normalizer: BertNormalizer,
}

impl Featurizer {
    /// Restores a featurizer from a previously fitted vocabulary
    pub fn from_terms(config: FeaturizerConfig, terms: Vec<String>) -> Self {
        let index = invert_map(terms.iter().cloned().enumerate());
        let normalizer = BertNormalizer::new(true, true, Some(false), config.lowercase);

        Self {
            config,
            terms,
            index,
            normalizer,
        }
    }

    /// Learns the vocabulary from the given texts
    pub fn fit<'a, T>(config: FeaturizerConfig, texts: T) -> Result<Self, FeaturizeError>
    where
        T: IntoIterator<Item = &'a str>,
    {
        let unfitted = Self::from_terms(config, Vec::new());

        let mut counts: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for term in unfitted.terms_of(text)? {
                *counts.entry(term).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= unfitted.config.min_count)
            .collect();

        // Most frequent first, ties broken alphabetically so the vocabulary is stable
        ranked.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));
        ranked.truncate(unfitted.config.max_terms);

        if ranked.is_empty() {
            return Err(FeaturizeError::EmptyVocabulary);
        }

        let terms = ranked.into_iter().map(|(term, _)| term).collect();

        Ok(Self::from_terms(unfitted.config, terms))
    }

    /// The fitted vocabulary, in feature index order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The featurizer configuration
    pub fn config(&self) -> &FeaturizerConfig {
        &self.config
    }

    /// The width of the produced feature vectors
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true before the vocabulary is fitted
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Normalizes and splits text into word tokens
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>, FeaturizeError> {
        let mut normalized = NormalizedString::from(text);

        self.normalizer
            .normalize(&mut normalized)
            .map_err(|e| FeaturizeError::Tokenize(e.to_string()))?;

        let mut pretokenized = PreTokenizedString::from(normalized);

        BertPreTokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| FeaturizeError::Tokenize(e.to_string()))?;

        let tokens = pretokenized
            .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
            .into_iter()
            .map(|(token, _, _)| token.to_string())
            .filter(|token| self.config.keep_punctuation || !is_punctuation(token))
            .collect();

        Ok(tokens)
    }

    /// Converts text into a feature vector over the vocabulary
    pub fn transform(&self, text: &str) -> Result<Features, FeaturizeError> {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();

        for term in self.terms_of(text)? {
            if let Some(&index) = self.index.get(&term) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let (indices, mut values): (Vec<usize>, Vec<f32>) = counts.into_iter().unzip();

        if self.config.normalize {
            let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();

            if norm > 0.0 {
                values.iter_mut().for_each(|v| *v /= norm);
            }
        }

        Ok(Features::new(indices, values))
    }

    /// Featurizes labeled items for training or validation
    pub fn transform_items<I: Item>(&self, items: &[I]) -> Result<Vec<Labeled>, FeaturizeError> {
        items
            .iter()
            .map(|item| Ok(Labeled::new(self.transform(item.input())?, item.label())))
            .collect()
    }

    /// Every term occurrence in the text, including ones outside the vocabulary
    fn terms_of(&self, text: &str) -> Result<Vec<String>, FeaturizeError> {
        let tokens = self.tokenize(text)?;
        let mut terms = Vec::new();

        for n in 1..=self.config.word_ngram_length {
            terms.extend(tokens.windows(n).map(|words| format!("w:{}", words.join(" "))));
        }

        if self.config.char_ngram_length > 0 {
            for token in &tokens {
                let chars: Vec<char> = iter::once(TOKEN_START)
                    .chain(token.chars())
                    .chain(iter::once(TOKEN_END))
                    .collect();

                terms.extend(
                    chars
                        .windows(self.config.char_ngram_length)
                        .map(|gram| format!("c:{}", gram.iter().collect::<String>())),
                );
            }
        }

        Ok(terms)
    }
}

fn is_punctuation(token: &str) -> bool {
    token.chars().all(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn words_only() -> FeaturizerConfig {
        FeaturizerConfig::new()
            .with_word_ngram_length(1)
            .with_char_ngram_length(0)
    }

    #[test]
    fn tokenize_lowercases_and_splits_punctuation() {
        let featurizer = Featurizer::from_terms(FeaturizerConfig::new(), Vec::new());

        assert_eq!(
            featurizer.tokenize("Please refrain, NOW!").unwrap(),
            vec!["please", "refrain", ",", "now", "!"]
        );

        let featurizer = Featurizer::from_terms(
            FeaturizerConfig::new().with_keep_punctuation(false),
            Vec::new(),
        );

        assert_eq!(
            featurizer.tokenize("Please refrain, NOW!").unwrap(),
            vec!["please", "refrain", "now"]
        );
    }

    #[test]
    fn fit_ranks_terms_by_count_then_name() {
        let featurizer = Featurizer::fit(words_only(), ["b a", "a c", "a b", "d"]).unwrap();

        assert_eq!(featurizer.terms(), ["w:a", "w:b", "w:c", "w:d"]);
    }

    #[test]
    fn fit_respects_min_count_and_max_terms() {
        let config = words_only().with_min_count(2);
        let featurizer = Featurizer::fit(config, ["b a", "a c", "a b", "d"]).unwrap();

        assert_eq!(featurizer.terms(), ["w:a", "w:b"]);

        let config = words_only().with_max_terms(1);
        let featurizer = Featurizer::fit(config, ["b a", "a c", "a b", "d"]).unwrap();

        assert_eq!(featurizer.terms(), ["w:a"]);
    }

    #[test]
    fn fit_without_terms_fails() {
        let err = Featurizer::fit(FeaturizerConfig::new(), ["", "   "]).err().unwrap();

        assert!(matches!(err, FeaturizeError::EmptyVocabulary));
    }

    #[test]
    fn word_bigrams_and_char_trigrams_are_counted() {
        let config = FeaturizerConfig::new().with_normalize(false);
        let featurizer = Featurizer::fit(config, ["go away"]).unwrap();

        for term in ["w:go", "w:away", "w:go away", "c:<go", "c:go>", "c:<aw", "c:ay>"] {
            assert!(
                featurizer.terms().contains(&term.to_string()),
                "missing {term}"
            );
        }
    }

    #[test]
    fn transform_counts_known_terms_and_normalizes() {
        let featurizer = Featurizer::fit(words_only(), ["idiot stupid"]).unwrap();

        let features = featurizer.transform("Idiot idiot, STUPID unknown").unwrap();

        assert_eq!(features.indices, vec![0, 1]);

        let norm = (2.0f32 * 2.0 + 1.0).sqrt();
        let expected = [2.0 / norm, 1.0 / norm];
        let idiot = featurizer.terms().iter().position(|t| t == "w:idiot").unwrap();
        let stupid = featurizer.terms().iter().position(|t| t == "w:stupid").unwrap();

        assert!((features.values[idiot] - expected[0]).abs() < 1e-6);
        assert!((features.values[stupid] - expected[1]).abs() < 1e-6);
    }

    #[test]
    fn empty_text_has_no_features() {
        let featurizer = Featurizer::fit(FeaturizerConfig::new(), ["hello there"]).unwrap();

        let features = featurizer.transform("").unwrap();

        assert!(features.is_empty());
        assert!(features.values.is_empty());
    }

    #[test]
    fn restored_featurizer_matches_fitted_one() {
        let fitted = Featurizer::fit(FeaturizerConfig::new(), ["you are wrong", "thank you"])
            .unwrap();
        let restored = Featurizer::from_terms(fitted.config().clone(), fitted.terms().to_vec());

        assert_eq!(
            fitted.transform("thank you, you are kind").unwrap(),
            restored.transform("thank you, you are kind").unwrap()
        );
    }
}
