/// Bag-of-n-gram featurization
pub mod featurizer;

/// Batcher
pub mod batcher;

/// Sentiment Analysis Items
pub mod item;

/// Pipeline and training configs
pub mod config;

/// The fitted pipeline: prediction, evaluation and persistence
pub mod pipeline;

/// Prediction records
pub mod prediction;

/// Quality metrics
pub mod evaluation;

/// Training
pub mod training;

/// Inference
pub mod inference;

pub use batcher::Batcher;
pub use evaluation::{BinaryMetrics, ConfusionMatrix};
pub use featurizer::{FeaturizeError, Featurizer, FeaturizerConfig};
pub use inference::infer;
pub use item::{Features, Item, Labeled};
pub use pipeline::Pipeline;
pub use prediction::Prediction;
pub use training::train;
