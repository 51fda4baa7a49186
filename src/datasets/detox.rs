use std::path::Path;

use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::pipelines::sentiment_analysis;

use super::{DatasetError, Schema};

/// Bundled training comments, relative to the crate root
pub const TRAIN_FILE: &str = "data/wikipedia-detox-sample-data.tsv";

/// Bundled test comments, relative to the crate root
pub const TEST_FILE: &str = "data/wikipedia-detox-sample-test.tsv";

/// A labeled Wikipedia talk page comment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Item {
    /// Whether the comment is toxic
    pub label: bool,

    /// The comment text
    pub text: String,
}

impl sentiment_analysis::Item for Item {
    fn input(&self) -> &str {
        &self.text
    }

    fn label(&self) -> bool {
        self.label
    }
}

/// Struct for the Wikipedia Detox dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

impl dataset::Dataset<Item> for Dataset {
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Dataset {
    /// Wraps already loaded items
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Reads a delimited file laid out according to the given schema
    pub fn load<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self, DatasetError> {
        let path = path.as_ref();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(schema.delimiter)
            .has_headers(schema.has_header)
            .quoting(false)
            .flexible(true)
            .from_path(path)
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut items = Vec::new();

        for record in reader.records() {
            let record = record.map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            let line = record.position().map_or(0, |pos| pos.line() as usize);

            let column = |index: usize| {
                record
                    .get(index)
                    .ok_or_else(|| DatasetError::MissingColumn {
                        path: path.to_path_buf(),
                        line,
                        column: index,
                    })
            };

            let raw_label = column(schema.label_column)?;
            let text = column(schema.text_column)?;

            let label = parse_label(raw_label).ok_or_else(|| DatasetError::InvalidLabel {
                path: path.to_path_buf(),
                line,
                value: raw_label.to_string(),
            })?;

            items.push(Item::new(label, text.to_string()));
        }

        log::debug!("Loaded {} rows from {}", items.len(), path.display());

        Ok(Self::new(items))
    }

    /// Shuffles the rows with a fixed seed and splits off a test set of the given fraction
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let mut items: Vec<Item> = self.dataset.iter().collect();
        items.shuffle(&mut StdRng::seed_from_u64(seed));

        let test_len = (items.len() as f64 * test_fraction.clamp(0.0, 1.0)).round() as usize;
        let train = items.split_off(test_len);

        (Self::new(train), Self::new(items))
    }

    /// Returns the share of toxic rows
    pub fn toxic_ratio(&self) -> f64 {
        if self.dataset.len() == 0 {
            return 0.0;
        }

        let toxic = self.dataset.iter().filter(|item| item.label).count();

        toxic as f64 / self.dataset.len() as f64
    }
}

/// Accepts `true`/`false` and any number, where non-zero means toxic
fn parse_label(raw: &str) -> Option<bool> {
    let raw = raw.trim();

    if raw.eq_ignore_ascii_case("true") {
        return Some(true);
    }

    if raw.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    raw.parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
        .map(|value| value != 0.0)
}
