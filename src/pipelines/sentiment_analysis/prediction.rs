use std::fmt::Display;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::utils::classes::label_name;

/// Probability above which a comment is predicted toxic
pub const THRESHOLD: f32 = 0.5;

/// The model's verdict for one comment
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Prediction {
    /// Whether the comment is predicted toxic
    pub label: bool,

    /// Probability of the toxic class, in `[0, 1]`
    pub probability: f32,

    /// Raw margin: toxic logit minus not-toxic logit
    pub score: f32,
}

impl Prediction {
    /// Build a prediction from a `[not toxic, toxic]` logit pair and its softmax
    pub fn from_outputs(logits: &[f32], probabilities: &[f32]) -> Self {
        let probability = probabilities[1];

        Self {
            label: probability > THRESHOLD,
            probability,
            score: logits[1] - logits[0],
        }
    }
}

impl Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Prediction: {} | Probability: {:.4} | Score: {:.4}",
            label_name(self.label),
            self.probability,
            self.score
        )
    }
}
