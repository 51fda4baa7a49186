//! Command line tool to train, evaluate and save the toxic comment classifier

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use burn_sentiment::{
    datasets::{detox, Schema},
    pipelines::sentiment_analysis::{self, inference::SAMPLES, FeaturizerConfig, Pipeline},
    utils::classes::label_name,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [OPTIONS]

Options:
  -h, --help               Print help
  --train PATH             Training data (defaults to 'data/wikipedia-detox-sample-data.tsv')
  --test PATH              Test data (defaults to 'data/wikipedia-detox-sample-test.tsv')
  --test-fraction F        Split the test set off the training data (conflicts with --test)
  -a, --artifact-dir DIR   Where the model is written (defaults to 'data/model')
  -n, --num-epochs N       Number of epochs to train for
  -b, --batch-size N       Batch size
  -s, --seed N             Random seed
";

#[derive(Debug)]
struct Args {
    train: String,
    test: Option<String>,
    test_fraction: Option<f64>,
    artifact_dir: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    seed: Option<u64>,
}

impl Args {
    fn parse(mut pargs: Arguments) -> anyhow::Result<Option<Self>> {
        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            train: pargs
                .opt_value_from_str("--train")?
                .unwrap_or_else(|| detox::TRAIN_FILE.to_string()),
            test: pargs.opt_value_from_str("--test")?,
            test_fraction: pargs.opt_value_from_str("--test-fraction")?,
            artifact_dir: pargs.opt_value_from_str(["-a", "--artifact-dir"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            seed: pargs.opt_value_from_str(["-s", "--seed"])?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        if args.test.is_some() && args.test_fraction.is_some() {
            return Err(anyhow!("--test and --test-fraction cannot be used together"));
        }

        Ok(Some(args))
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse(Arguments::from_env())? else {
        print!("{}", HELP);

        return Ok(());
    };

    let mut config = sentiment_analysis::training::Config::new(FeaturizerConfig::new());

    if let Some(artifact_dir) = args.artifact_dir {
        config.artifact_dir = artifact_dir;
    }

    if let Some(num_epochs) = args.num_epochs {
        config.num_epochs = num_epochs;
    }

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let schema = Schema::new();
    let data = detox::Dataset::load(&args.train, &schema)?;

    let (train, test) = match args.test_fraction {
        Some(fraction) => data.split(fraction, config.seed),
        None => {
            let test = args.test.as_deref().unwrap_or(detox::TEST_FILE);

            (data, detox::Dataset::load(test, &schema)?)
        }
    };

    log::info!(
        "Training on {} comments ({:.1}% toxic)",
        burn::data::dataset::Dataset::len(&train),
        train.toxic_ratio() * 100.0
    );

    let pipeline = sentiment_analysis::train::<Autodiff<NdArray>, _, _>(
        NdArrayDevice::Cpu,
        &train,
        &test,
        config.clone(),
    )?;

    println!("\n{}\n", pipeline.evaluate(&test)?);

    pipeline.save(&config.artifact_dir)?;

    let pipeline = Pipeline::<NdArray>::load(&config.artifact_dir, NdArrayDevice::Cpu)?;

    for (text, prediction) in SAMPLES.iter().zip(pipeline.predict(SAMPLES)?) {
        println!(
            "Sentiment: {} | Prediction: {} | Probability: {:.4}",
            text,
            label_name(prediction.label),
            prediction.probability
        );
    }

    Ok(())
}
