use burn::LearningRate;

use crate::models::bag_of_ngrams;

use super::featurizer::FeaturizerConfig;

/// Everything needed to rebuild a fitted pipeline next to its weights
#[derive(burn::config::Config, Debug)]
pub struct Artifact {
    /// How text is featurized
    pub featurizer: FeaturizerConfig,

    /// The fitted vocabulary, in feature index order
    pub terms: Vec<String>,

    /// The classifier shape
    pub model: bag_of_ngrams::Config,
}

/// Define configuration struct for the experiment
#[derive(burn::config::Config, Debug)]
pub struct Training {
    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 10)]
    pub num_epochs: usize,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// AdamW weight decay
    #[config(default = 1e-4)]
    pub weight_decay: f32,

    /// Constant learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Width of the hidden layer
    #[config(default = 64)]
    pub d_hidden: usize,

    /// Dropout rate
    #[config(default = 0.1)]
    pub dropout: f64,

    /// Seed for weight initialization, dropout and shuffling
    #[config(default = 42)]
    pub seed: u64,

    /// Where checkpoints, the training summary and the final model are written
    #[config(default = "\"data/model\".to_string()")]
    pub artifact_dir: String,

    /// How text is featurized
    pub featurizer: FeaturizerConfig,
}
