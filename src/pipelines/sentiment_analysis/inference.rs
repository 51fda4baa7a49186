use burn::tensor::backend::Backend;

use super::{Pipeline, Prediction};

/// The two comments the tutorial predicts after training
pub static SAMPLES: &[&str] = &[
    "Please refrain from adding nonsense to Wikipedia.",
    "He is the best, and the article should stay.",
];

/// Define inference function
pub fn infer<B: Backend>(
    device: B::Device,  // Device on which to perform computation (e.g., CPU or CUDA device)
    artifact_dir: &str, // Directory containing model and config files
    samples: &[String], // Text samples for inference
) -> anyhow::Result<Vec<Prediction>> {
    log::info!("Loading model...");

    let pipeline = Pipeline::<B>::load(artifact_dir, device)?;

    log::info!("Running inference...");

    Ok(pipeline.predict(samples)?)
}
