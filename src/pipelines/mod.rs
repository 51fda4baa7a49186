use std::path::PathBuf;

use sentiment_analysis::featurizer::FeaturizeError;

/// Sentiment Analysis (toxic comment classification)
pub mod sentiment_analysis;

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A dataset handed to the pipeline had no rows
    #[error("the {0} dataset is empty")]
    EmptyDataset(&'static str),

    /// Text could not be featurized
    #[error(transparent)]
    Featurize(#[from] FeaturizeError),

    /// The artifact directory could not be created
    #[error("unable to create artifact directory {path}: {source}")]
    ArtifactDir {
        /// The artifact directory
        path: PathBuf,

        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The pipeline config could not be written or read back
    #[error("unable to access pipeline config {path}: {message}")]
    Config {
        /// The config file
        path: PathBuf,

        /// What went wrong
        message: String,
    },

    /// The model weights could not be written or read back
    #[error("unable to access model weights {path}: {message}")]
    Record {
        /// The record file
        path: PathBuf,

        /// What went wrong
        message: String,
    },
}
