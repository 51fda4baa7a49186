use std::fmt::Debug;

use derive_new::new;

/// A trait for items that can be used for sentiment analysis
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the input text for the item
    fn input(&self) -> &str;

    /// Returns whether the item is labeled toxic
    fn label(&self) -> bool;
}

/// A sparse feature vector over the featurizer vocabulary
#[derive(Clone, Debug, Default, PartialEq, new)]
pub struct Features {
    /// Vocabulary indexes with a non-zero weight, in ascending order
    pub indices: Vec<usize>,

    /// The weight for each index
    pub values: Vec<f32>,
}

impl Features {
    /// Returns true if no vocabulary term was found in the text
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Featurized text paired with its label, ready for batching
#[derive(Clone, Debug, PartialEq, new)]
pub struct Labeled {
    /// The featurized text
    pub features: Features,

    /// Whether the text is toxic
    pub label: bool,
}
