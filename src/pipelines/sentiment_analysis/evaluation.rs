//! Binary classification quality metrics.
//!
//! The toxic class is the positive class. Ratios whose denominator is zero are reported as 0,
//! and the ranking metrics fall back to chance level when only one class is present.

use std::{cmp::Ordering, fmt::Display};

use serde::Serialize;

use super::Prediction;

/// Probabilities are clamped this far away from 0 and 1 before taking logarithms
const EPSILON: f64 = 1e-15;

/// Counts of each label/prediction combination
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Toxic comments predicted toxic
    pub true_positives: usize,

    /// Clean comments predicted toxic
    pub false_positives: usize,

    /// Clean comments predicted clean
    pub true_negatives: usize,

    /// Toxic comments predicted clean
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against their labels
    pub fn new(labels: &[bool], predictions: &[Prediction]) -> Self {
        let mut matrix = Self::default();

        for (label, prediction) in labels.iter().zip(predictions) {
            match (label, prediction.label) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }

        matrix
    }

    /// Total number of tallied predictions
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Quality metrics for a binary classifier
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BinaryMetrics {
    /// Share of correct predictions
    pub accuracy: f64,

    /// Area under the ROC curve
    pub area_under_roc_curve: f64,

    /// Area under the precision/recall curve (average precision)
    pub area_under_precision_recall_curve: f64,

    /// Harmonic mean of positive precision and recall
    pub f1_score: f64,

    /// Share of toxic predictions that are toxic
    pub positive_precision: f64,

    /// Share of toxic comments predicted toxic
    pub positive_recall: f64,

    /// Share of clean predictions that are clean
    pub negative_precision: f64,

    /// Share of clean comments predicted clean
    pub negative_recall: f64,

    /// Mean negative log-likelihood of the labels, in nats
    pub log_loss: f64,

    /// Improvement of the log-loss over always predicting the label prior
    pub log_loss_reduction: f64,

    /// Entropy of the label prior, in nats
    pub entropy: f64,

    /// Raw counts
    pub confusion_matrix: ConfusionMatrix,
}

impl BinaryMetrics {
    /// Compute all metrics for predictions paired positionally with their labels
    pub fn compute(labels: &[bool], predictions: &[Prediction]) -> Self {
        let matrix = ConfusionMatrix::new(labels, predictions);

        let ConfusionMatrix {
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fn_,
        } = matrix;

        let positive_precision = ratio(tp, tp + fp);
        let positive_recall = ratio(tp, tp + fn_);

        let f1_score = if positive_precision + positive_recall > 0.0 {
            2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
        } else {
            0.0
        };

        let scored: Vec<(bool, f64)> = labels
            .iter()
            .zip(predictions)
            .map(|(label, prediction)| (*label, f64::from(prediction.probability)))
            .collect();

        let log_loss = log_loss(&scored);
        let entropy = entropy(&scored);

        let log_loss_reduction = if entropy > 0.0 {
            (entropy - log_loss) / entropy
        } else {
            0.0
        };

        Self {
            accuracy: ratio(tp + tn, matrix.total()),
            area_under_roc_curve: area_under_roc_curve(&scored),
            area_under_precision_recall_curve: average_precision(&scored),
            f1_score,
            positive_precision,
            positive_recall,
            negative_precision: ratio(tn, tn + fn_),
            negative_recall: ratio(tn, tn + fp),
            log_loss,
            log_loss_reduction,
            entropy,
            confusion_matrix: matrix,
        }
    }
}

impl Display for BinaryMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let matrix = &self.confusion_matrix;

        writeln!(f, "Model quality metrics evaluation")?;
        writeln!(f, "--------------------------------")?;
        writeln!(f, "Accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "Auc: {:.2}%", self.area_under_roc_curve * 100.0)?;
        writeln!(f, "Auprc: {:.2}%", self.area_under_precision_recall_curve * 100.0)?;
        writeln!(f, "F1Score: {:.2}%", self.f1_score * 100.0)?;
        writeln!(
            f,
            "Positive precision/recall: {:.2}% / {:.2}%",
            self.positive_precision * 100.0,
            self.positive_recall * 100.0
        )?;
        writeln!(
            f,
            "Negative precision/recall: {:.2}% / {:.2}%",
            self.negative_precision * 100.0,
            self.negative_recall * 100.0
        )?;
        writeln!(
            f,
            "LogLoss: {:.4} (reduction {:.4})",
            self.log_loss, self.log_loss_reduction
        )?;
        writeln!(
            f,
            "Confusion: TP {} | FP {} | TN {} | FN {}",
            matrix.true_positives,
            matrix.false_positives,
            matrix.true_negatives,
            matrix.false_negatives
        )?;
        write!(f, "=============== End of model evaluation ===============")
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn count_positives(scored: &[(bool, f64)]) -> (usize, usize) {
    let positives = scored.iter().filter(|(label, _)| *label).count();

    (positives, scored.len() - positives)
}

fn by_probability(a: &(bool, f64), b: &(bool, f64)) -> Ordering {
    a.1.total_cmp(&b.1)
}

/// Mann-Whitney statistic with tied scores sharing their average rank
fn area_under_roc_curve(scored: &[(bool, f64)]) -> f64 {
    let (positives, negatives) = count_positives(scored);

    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut sorted = scored.to_vec();
    sorted.sort_by(by_probability);

    let mut positive_rank_sum = 0.0;
    let mut start = 0;

    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].1 == sorted[start].1 {
            end += 1;
        }

        // Ranks are 1-based
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = sorted[start..=end].iter().filter(|(label, _)| *label).count();

        positive_rank_sum += average_rank * tied_positives as f64;
        start = end + 1;
    }

    let positives = positives as f64;

    (positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives as f64)
}

/// Precision summed over each recall step, walking thresholds from the highest score down
fn average_precision(scored: &[(bool, f64)]) -> f64 {
    let (positives, _) = count_positives(scored);

    if positives == 0 {
        return 0.0;
    }

    let mut sorted = scored.to_vec();
    sorted.sort_by(|a, b| by_probability(b, a));

    let mut true_positives = 0;
    let mut false_positives = 0;
    let mut previous_recall = 0.0;
    let mut area = 0.0;
    let mut start = 0;

    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].1 == sorted[start].1 {
            end += 1;
        }

        for (label, _) in &sorted[start..=end] {
            if *label {
                true_positives += 1;
            } else {
                false_positives += 1;
            }
        }

        let recall = ratio(true_positives, positives);
        let precision = ratio(true_positives, true_positives + false_positives);

        area += (recall - previous_recall) * precision;
        previous_recall = recall;
        start = end + 1;
    }

    area
}

fn log_loss(scored: &[(bool, f64)]) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }

    let total: f64 = scored
        .iter()
        .map(|(label, probability)| {
            let p = probability.clamp(EPSILON, 1.0 - EPSILON);

            if *label {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();

    total / scored.len() as f64
}

fn entropy(scored: &[(bool, f64)]) -> f64 {
    let (positives, _) = count_positives(scored);
    let prior = ratio(positives, scored.len());

    if prior <= 0.0 || prior >= 1.0 {
        return 0.0;
    }

    -(prior * prior.ln() + (1.0 - prior) * (1.0 - prior).ln())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn predictions(probabilities: &[f32]) -> Vec<Prediction> {
        probabilities
            .iter()
            .map(|p| Prediction::new(*p > 0.5, *p, (p / (1.0 - p)).ln()))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn computes_every_metric() {
        let labels = [true, true, false, false];
        let metrics = BinaryMetrics::compute(&labels, &predictions(&[0.9, 0.4, 0.6, 0.1]));

        assert_eq!(
            metrics.confusion_matrix,
            ConfusionMatrix {
                true_positives: 1,
                false_positives: 1,
                true_negatives: 1,
                false_negatives: 1,
            }
        );

        assert_close(metrics.accuracy, 0.5);
        assert_close(metrics.area_under_roc_curve, 0.75);
        assert_close(metrics.area_under_precision_recall_curve, 0.8333);
        assert_close(metrics.f1_score, 0.5);
        assert_close(metrics.positive_precision, 0.5);
        assert_close(metrics.positive_recall, 0.5);
        assert_close(metrics.negative_precision, 0.5);
        assert_close(metrics.negative_recall, 0.5);
        assert_close(metrics.log_loss, 0.5108);
        assert_close(metrics.entropy, std::f64::consts::LN_2);
        assert_close(metrics.log_loss_reduction, 0.2630);
    }

    #[test]
    fn perfect_ranking() {
        let labels = [false, true, false, true];
        let metrics = BinaryMetrics::compute(&labels, &predictions(&[0.2, 0.7, 0.3, 0.8]));

        assert_close(metrics.accuracy, 1.0);
        assert_close(metrics.area_under_roc_curve, 1.0);
        assert_close(metrics.area_under_precision_recall_curve, 1.0);
        assert_close(metrics.f1_score, 1.0);
    }

    #[test]
    fn tied_scores_share_their_rank() {
        let metrics = BinaryMetrics::compute(&[true, false], &predictions(&[0.5, 0.5]));

        assert_close(metrics.area_under_roc_curve, 0.5);
        assert_close(metrics.area_under_precision_recall_curve, 0.5);
    }

    #[test]
    fn nan_probabilities_rank_above_every_score() {
        let labels = [true, false, true];
        let metrics = BinaryMetrics::compute(&labels, &predictions(&[f32::NAN, 0.2, 0.9]));

        assert_close(metrics.area_under_roc_curve, 1.0);
        assert_close(metrics.area_under_precision_recall_curve, 1.0);
        assert!(metrics.log_loss.is_nan());
    }

    #[test]
    fn single_class_and_empty_denominators() {
        let metrics = BinaryMetrics::compute(&[false, false], &predictions(&[0.1, 0.2]));

        assert_close(metrics.accuracy, 1.0);
        assert_close(metrics.area_under_roc_curve, 0.5);
        assert_close(metrics.area_under_precision_recall_curve, 0.0);
        assert_close(metrics.positive_precision, 0.0);
        assert_close(metrics.positive_recall, 0.0);
        assert_close(metrics.f1_score, 0.0);
        assert_close(metrics.entropy, 0.0);
        assert_close(metrics.log_loss_reduction, 0.0);
    }

    #[test]
    fn nothing_to_evaluate() {
        let metrics = BinaryMetrics::compute(&[], &[]);

        assert_eq!(metrics.confusion_matrix.total(), 0);
        assert_close(metrics.accuracy, 0.0);
        assert_close(metrics.log_loss, 0.0);
    }

    #[test]
    fn report_uses_percentages() {
        let metrics = BinaryMetrics::compute(&[true, false], &predictions(&[0.9, 0.1]));
        let report = metrics.to_string();

        assert!(report.contains("Accuracy: 100.00%"));
        assert!(report.contains("Auc: 100.00%"));
        assert!(report.contains("F1Score: 100.00%"));
    }
}
