use burn::{
    data::dataloader,
    tensor::{backend::Backend, Int, Tensor},
};
use derive_new::new;

use crate::utils::tensors::{class_ids, densify};

use super::{Features, Labeled};

/// An inference batch for sentiment analysis
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Dense feature matrix: [batch_size, n_terms]
    pub features: Tensor<B, 2>,
}

/// A training batch for sentiment analysis
#[derive(Debug, Clone, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Class ids for the batch, 1 for toxic
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching featurized comments
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// Width of the feature vectors
    pub n_terms: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Features, Infer<B>> for Batcher<B> {
    /// Collects feature vectors into an inference batch
    fn batch(&self, items: Vec<Features>) -> Infer<B> {
        Infer {
            features: densify(&items, self.n_terms, &self.device),
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Labeled, Train<B>> for Batcher<B> {
    /// Collects labeled feature vectors into a training batch
    fn batch(&self, items: Vec<Labeled>) -> Train<B> {
        let labels: Vec<usize> = items.iter().map(|item| usize::from(item.label)).collect();
        let features = items.into_iter().map(|item| item.features).collect();

        let input = <Self as dataloader::batcher::Batcher<Features, Infer<B>>>::batch(self, features);

        Train {
            input,
            targets: class_ids(&labels, &self.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        data::dataloader::batcher::Batcher as _,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn training_batch_carries_targets() {
        let batcher = Batcher::<NdArray>::new(4, NdArrayDevice::Cpu);

        let batch: Train<NdArray> = batcher.batch(vec![
            Labeled::new(Features::new(vec![1], vec![1.0]), true),
            Labeled::new(Features::new(vec![3], vec![1.0]), false),
        ]);

        assert_eq!(batch.input.features.dims(), [2, 4]);
        assert_eq!(
            batch.targets.into_data().convert::<i64>().value,
            vec![1, 0]
        );
    }
}
