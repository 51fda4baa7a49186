use burn::{
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Dropout, Linear},
    tensor::{activation::relu, backend::Backend, Tensor},
    train::ClassificationOutput,
};

use crate::pipelines::sentiment_analysis::batcher;

/// Output classes: index 0 is not toxic, index 1 is toxic
pub const N_CLASSES: usize = 2;

/// A single hidden layer network over bag-of-n-gram vectors
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Projection of the sparse input into the hidden layer
    pub hidden: Linear<B>,

    /// Dropout on the hidden activations
    pub dropout: Dropout,

    /// Linear layer producing the class logits
    pub output: Linear<B>,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Defines forward pass for training
    pub fn forward(&self, item: batcher::Train<B>) -> ClassificationOutput<B> {
        let output = self.infer(item.input);
        let targets = item.targets.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }

    /// Defines forward pass for inference, returning `[batch_size, N_CLASSES]` logits
    pub fn infer(&self, input: batcher::Infer<B>) -> Tensor<B, 2> {
        let x = self.hidden.forward(input.features);
        let x = self.dropout.forward(relu(x));

        self.output.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use crate::{
        models::bag_of_ngrams::Config,
        pipelines::sentiment_analysis::Features,
        utils::tensors::{class_ids, densify},
    };

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn produces_one_logit_pair_per_row() {
        let device = NdArrayDevice::Cpu;
        let model = Config::new(5).with_d_hidden(4).init::<TestBackend>(&device);

        let rows = vec![Features::new(vec![0, 3], vec![0.6, 0.8]), Features::default()];
        let features = densify::<TestBackend>(&rows, 5, &device);

        let logits = model.infer(batcher::Infer::new(features.clone()));

        assert_eq!(logits.dims(), [2, N_CLASSES]);

        let output = model.forward(batcher::Train::new(
            batcher::Infer::new(features),
            class_ids::<TestBackend>(&[1, 0], &device),
        ));

        assert_eq!(output.output.dims(), [2, N_CLASSES]);
        assert!(output.loss.into_scalar() > 0.0);
    }
}
