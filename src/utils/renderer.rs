use burn::train::renderer::{MetricState, MetricsRenderer, TrainingProgress};
use derive_new::new;

/// A renderer that reports training progress through `log` instead of the TUI
#[derive(new)]
pub struct Simple {}

impl Simple {
    fn metric(split: &str, state: MetricState) {
        if let MetricState::Numeric(entry, value) = state {
            log::trace!("[{split}] {}: {value:.4}", entry.name);
        }
    }

    fn progress(split: &str, item: &TrainingProgress) {
        log::debug!(
            "[{split}] epoch {}/{} iteration {} ({}/{} items)",
            item.epoch,
            item.epoch_total,
            item.iteration,
            item.progress.items_processed,
            item.progress.items_total,
        );
    }
}

impl MetricsRenderer for Simple {
    fn update_train(&mut self, state: MetricState) {
        Self::metric("train", state);
    }

    fn update_valid(&mut self, state: MetricState) {
        Self::metric("valid", state);
    }

    fn render_train(&mut self, item: TrainingProgress) {
        Self::progress("train", &item);
    }

    fn render_valid(&mut self, item: TrainingProgress) {
        Self::progress("valid", &item);
    }
}
