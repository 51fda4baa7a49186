use burn::{
    data::{
        dataloader::DataLoaderBuilder,
        dataset::{Dataset, InMemDataset},
    },
    module::AutodiffModule,
    optim::AdamWConfig,
    record::CompactRecorder,
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LearningRateMetric, LossMetric},
        LearnerBuilder,
    },
};

use crate::{models::bag_of_ngrams, pipelines::PipelineError, utils::renderer};

use super::{config, Batcher, Featurizer, Item, Pipeline};

/// Training Config
pub type Config = config::Training;

/// Fit the featurizer and train the classifier, returning the fitted pipeline
pub fn train<B, I, D>(
    device: B::Device, // Device on which to perform computation (e.g., CPU or CUDA device)
    dataset_train: &D, // Training dataset
    dataset_valid: &D, // Validation dataset, evaluated after every epoch
    config: Config,    // Experiment configuration
) -> anyhow::Result<Pipeline<B::InnerBackend>>
where
    B: AutodiffBackend,
    I: Item + 'static,
    D: Dataset<I>,
{
    let items_train: Vec<I> = dataset_train.iter().collect();
    let items_valid: Vec<I> = dataset_valid.iter().collect();

    if items_train.is_empty() {
        return Err(PipelineError::EmptyDataset("training").into());
    }

    if items_valid.is_empty() {
        return Err(PipelineError::EmptyDataset("validation").into());
    }

    let featurizer = Featurizer::fit(
        config.featurizer.clone(),
        items_train.iter().map(|item| item.input()),
    )
    .map_err(PipelineError::from)?;

    log::info!(
        "Fitted vocabulary of {} terms on {} comments",
        featurizer.len(),
        items_train.len()
    );

    let labeled_train = featurizer
        .transform_items(&items_train)
        .map_err(PipelineError::from)?;
    let labeled_valid = featurizer
        .transform_items(&items_valid)
        .map_err(PipelineError::from)?;

    let model_config = bag_of_ngrams::Config::new(featurizer.len())
        .with_d_hidden(config.d_hidden)
        .with_dropout(config.dropout);

    B::seed(config.seed);

    let model = model_config.init::<B>(&device);

    // Initialize batchers for training and validation data
    let batcher_train = Batcher::<B>::new(featurizer.len(), device.clone());
    let batcher_valid = Batcher::<B::InnerBackend>::new(featurizer.len(), device.clone());

    // No worker threads, so a fixed seed replays the same batches
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .build(InMemDataset::new(labeled_train));

    let dataloader_valid = DataLoaderBuilder::new(batcher_valid)
        .batch_size(config.batch_size)
        .build(InMemDataset::new(labeled_valid));

    // Initialize optimizer
    let optimizer = AdamWConfig::new()
        .with_epsilon(config.adam_epsilon)
        .with_weight_decay(config.weight_decay)
        .init();

    std::fs::create_dir_all(&config.artifact_dir).map_err(|source| {
        PipelineError::ArtifactDir {
            path: config.artifact_dir.clone().into(),
            source,
        }
    })?;

    // Initialize learner
    let learner = LearnerBuilder::new(&config.artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(LearningRateMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device.clone()])
        .num_epochs(config.num_epochs)
        .renderer(renderer::Simple::new())
        .summary()
        .build(model, optimizer, config.learning_rate);

    // Train the model
    let model_trained = learner.fit(dataloader_train, dataloader_valid);

    log::info!("Finished training for {} epochs", config.num_epochs);

    Ok(Pipeline::new(
        featurizer,
        model_config,
        model_trained.valid(),
        device,
    ))
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

    use crate::{
        datasets::detox,
        pipelines::sentiment_analysis::{FeaturizeError, FeaturizerConfig},
    };

    use super::*;

    type TestBackend = Autodiff<NdArray>;

    fn dataset(rows: &[(bool, &str)]) -> detox::Dataset {
        detox::Dataset::new(
            rows.iter()
                .map(|(label, text)| detox::Item::new(*label, text.to_string()))
                .collect(),
        )
    }

    fn train_error(train_rows: &[(bool, &str)], valid_rows: &[(bool, &str)]) -> PipelineError {
        let err = train::<TestBackend, _, _>(
            NdArrayDevice::Cpu,
            &dataset(train_rows),
            &dataset(valid_rows),
            Config::new(FeaturizerConfig::new()),
        )
        .err()
        .unwrap();

        err.downcast::<PipelineError>().unwrap()
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let err = train_error(&[], &[(true, "you idiot")]);

        assert!(matches!(err, PipelineError::EmptyDataset("training")));
    }

    #[test]
    fn empty_validation_set_is_rejected() {
        let err = train_error(&[(true, "you idiot")], &[]);

        assert!(matches!(err, PipelineError::EmptyDataset("validation")));
    }

    #[test]
    fn blank_comments_leave_no_vocabulary() {
        let err = train_error(&[(true, ""), (false, "   ")], &[(true, "you idiot")]);

        assert!(matches!(
            err,
            PipelineError::Featurize(FeaturizeError::EmptyVocabulary)
        ));
    }
}
