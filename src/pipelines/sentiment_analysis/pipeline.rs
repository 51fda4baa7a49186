use std::path::Path;

use burn::{
    config::Config as _,
    data::{dataloader::batcher::Batcher as _, dataset::Dataset},
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::{activation::softmax, backend::Backend},
};

use crate::{
    models::bag_of_ngrams::{self, N_CLASSES},
    pipelines::PipelineError,
    utils::tensors::to_vec,
};

use super::{
    batcher::Infer, config::Artifact, BinaryMetrics, Batcher, Features, Featurizer, Item,
    Prediction,
};

/// File name of the pipeline config inside an artifact directory
pub const CONFIG_FILE: &str = "config.json";

/// File stem of the model weights inside an artifact directory; the recorder adds `.mpk`
pub const MODEL_FILE: &str = "model";

/// Number of comments sent through the model at once during prediction
const PREDICT_BATCH_SIZE: usize = 256;

/// Full precision so reloaded weights reproduce the saved model's predictions exactly
type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// A fitted featurizer and classifier
#[derive(Debug)]
pub struct Pipeline<B: Backend> {
    config: Artifact,
    featurizer: Featurizer,
    model: bag_of_ngrams::Model<B>,
    device: B::Device,
}

impl<B: Backend> Pipeline<B> {
    /// Assemble a pipeline from its fitted parts
    pub fn new(
        featurizer: Featurizer,
        model_config: bag_of_ngrams::Config,
        model: bag_of_ngrams::Model<B>,
        device: B::Device,
    ) -> Self {
        let config = Artifact::new(
            featurizer.config().clone(),
            featurizer.terms().to_vec(),
            model_config,
        );

        Self {
            config,
            featurizer,
            model,
            device,
        }
    }

    /// The fitted featurizer
    pub fn featurizer(&self) -> &Featurizer {
        &self.featurizer
    }

    /// The trained classifier
    pub fn model(&self) -> &bag_of_ngrams::Model<B> {
        &self.model
    }

    /// Predict each text, in order
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>, PipelineError> {
        let batcher = Batcher::<B>::new(self.featurizer.len(), self.device.clone());
        let mut predictions = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(PREDICT_BATCH_SIZE) {
            let features = chunk
                .iter()
                .map(|text| self.featurizer.transform(text.as_ref()))
                .collect::<Result<Vec<Features>, _>>()?;

            let input: Infer<B> = batcher.batch(features);
            let logits = self.model.infer(input);
            let probabilities = softmax(logits.clone(), 1);

            let logits = to_vec(logits);
            let probabilities = to_vec(probabilities);

            predictions.extend(
                logits
                    .chunks_exact(N_CLASSES)
                    .zip(probabilities.chunks_exact(N_CLASSES))
                    .map(|(logits, probabilities)| Prediction::from_outputs(logits, probabilities)),
            );
        }

        Ok(predictions)
    }

    /// Predict a single text
    pub fn predict_one(&self, text: &str) -> Result<Prediction, PipelineError> {
        let mut predictions = self.predict(&[text])?;

        Ok(predictions.remove(0))
    }

    /// Score the pipeline against a labeled dataset
    pub fn evaluate<I: Item, D: Dataset<I>>(
        &self,
        dataset: &D,
    ) -> Result<BinaryMetrics, PipelineError> {
        let items: Vec<I> = dataset.iter().collect();

        if items.is_empty() {
            return Err(PipelineError::EmptyDataset("evaluation"));
        }

        let texts: Vec<&str> = items.iter().map(|item| item.input()).collect();
        let labels: Vec<bool> = items.iter().map(|item| item.label()).collect();

        let predictions = self.predict(&texts)?;

        Ok(BinaryMetrics::compute(&labels, &predictions))
    }

    /// Write the config and weights into the artifact directory
    pub fn save<P: AsRef<Path>>(&self, artifact_dir: P) -> Result<(), PipelineError> {
        let artifact_dir = artifact_dir.as_ref();

        std::fs::create_dir_all(artifact_dir).map_err(|source| PipelineError::ArtifactDir {
            path: artifact_dir.to_path_buf(),
            source,
        })?;

        let config_file = artifact_dir.join(CONFIG_FILE);
        self.config
            .save(&config_file)
            .map_err(|e| PipelineError::Config {
                path: config_file.clone(),
                message: e.to_string(),
            })?;

        let model_file = artifact_dir.join(MODEL_FILE);
        ModelRecorder::new()
            .record(self.model.clone().into_record(), model_file.clone())
            .map_err(|e| PipelineError::Record {
                path: model_file,
                message: e.to_string(),
            })?;

        log::info!("Saved model to {}", artifact_dir.display());

        Ok(())
    }

    /// Rebuild a pipeline saved with [`Pipeline::save`]
    pub fn load<P: AsRef<Path>>(artifact_dir: P, device: B::Device) -> Result<Self, PipelineError> {
        let artifact_dir = artifact_dir.as_ref();

        let config_file = artifact_dir.join(CONFIG_FILE);
        let config = Artifact::load(&config_file).map_err(|e| PipelineError::Config {
            path: config_file.clone(),
            message: e.to_string(),
        })?;

        let model_file = artifact_dir.join(MODEL_FILE);
        let record = ModelRecorder::new()
            .load(model_file.clone(), &device)
            .map_err(|e| PipelineError::Record {
                path: model_file,
                message: e.to_string(),
            })?;

        let model = config.model.init::<B>(&device).load_record(record);
        let featurizer = Featurizer::from_terms(config.featurizer.clone(), config.terms.clone());

        log::info!(
            "Loaded model with {} terms from {}",
            featurizer.len(),
            artifact_dir.display()
        );

        Ok(Self {
            config,
            featurizer,
            model,
            device,
        })
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::{datasets::detox, pipelines::sentiment_analysis::FeaturizerConfig};

    use super::*;

    type TestBackend = NdArray;

    fn untrained() -> Pipeline<TestBackend> {
        let featurizer = Featurizer::fit(
            FeaturizerConfig::new(),
            ["you are an idiot", "thanks for fixing the citation"],
        )
        .unwrap();

        let model_config = bag_of_ngrams::Config::new(featurizer.len()).with_d_hidden(8);
        let model = model_config.init::<TestBackend>(&NdArrayDevice::Cpu);

        Pipeline::new(featurizer, model_config, model, NdArrayDevice::Cpu)
    }

    #[test]
    fn predicts_every_text_in_order() {
        let pipeline = untrained();

        let predictions = pipeline
            .predict(&["idiot", "thanks", "", "zzz qqq"])
            .unwrap();

        assert_eq!(predictions.len(), 4);

        for prediction in &predictions {
            assert!((0.0..=1.0).contains(&prediction.probability));
            assert_eq!(prediction.label, prediction.probability > 0.5);
        }

        // Out of vocabulary text featurizes like empty text
        assert_eq!(predictions[2], predictions[3]);
        assert!(pipeline.predict::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_reproduces_predictions() {
        let pipeline = untrained();
        let dir = tempdir().unwrap();

        pipeline.save(dir.path()).unwrap();

        assert!(dir.path().join(CONFIG_FILE).exists());
        assert!(dir.path().join("model.mpk").exists());

        let loaded = Pipeline::<TestBackend>::load(dir.path(), NdArrayDevice::Cpu).unwrap();
        let texts = ["you idiot", "thanks for the citation", ""];

        assert_eq!(loaded.featurizer().terms(), pipeline.featurizer().terms());
        assert_eq!(
            loaded.predict(&texts).unwrap(),
            pipeline.predict(&texts).unwrap()
        );
    }

    #[test]
    fn loading_without_config_fails() {
        let dir = tempdir().unwrap();

        let err = Pipeline::<TestBackend>::load(dir.path(), NdArrayDevice::Cpu)
            .err()
            .unwrap();

        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn loading_without_weights_fails() {
        let pipeline = untrained();
        let dir = tempdir().unwrap();

        pipeline.save(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join("model.mpk")).unwrap();

        let err = Pipeline::<TestBackend>::load(dir.path(), NdArrayDevice::Cpu)
            .err()
            .unwrap();

        assert!(matches!(err, PipelineError::Record { .. }));
    }

    #[test]
    fn evaluates_a_labeled_dataset() {
        let pipeline = untrained();
        let dataset = detox::Dataset::new(vec![
            detox::Item::new(true, "you are an idiot".to_string()),
            detox::Item::new(false, "thanks".to_string()),
        ]);

        let metrics = pipeline.evaluate(&dataset).unwrap();

        assert_eq!(metrics.confusion_matrix.total(), 2);

        let err = pipeline
            .evaluate(&detox::Dataset::new(Vec::new()))
            .err()
            .unwrap();

        assert!(matches!(err, PipelineError::EmptyDataset("evaluation")));
    }
}
