//! # Burn Sentiment
//!
//! A toxic comment classifier: comments are featurized into bags of word and character
//! n-grams, then classified by a small feed-forward network trained with Burn.
//!
//! Burn has no decision tree trainer, so the classifier is a single hidden layer network
//! rather than a boosted tree. It consumes the same sparse n-gram features and yields the
//! same label, probability and score outputs.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;
