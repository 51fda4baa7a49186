use burn::{
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::model::{Model, N_CLASSES};

/// The Model Configuration
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Width of the input vectors, i.e. the featurizer vocabulary size
    pub d_input: usize,

    /// Width of the hidden layer
    #[config(default = 64)]
    pub d_hidden: usize,

    /// Dropout applied to the hidden activations during training
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl Config {
    /// Initializes a model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model {
            hidden: LinearConfig::new(self.d_input, self.d_hidden).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(self.d_hidden, N_CLASSES).init(device),
        }
    }
}
