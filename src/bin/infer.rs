//! Command line tool for inference with a saved toxic comment classifier

use std::ffi::OsString;

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use burn_sentiment::{
    pipelines::sentiment_analysis::{infer, inference::SAMPLES},
    utils::classes::label_name,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [OPTIONS] [TEXT]...

Arguments:
  TEXT                     Comments to classify (defaults to two sample comments)

Options:
  -h, --help               Print help
  -a, --artifact-dir DIR   The saved model to use (defaults to 'data/model')
  --json                   Print one JSON object per comment
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The directory holding the saved model
    artifact_dir: String,

    /// Emit JSON lines instead of text
    json: bool,

    /// The comments to classify
    texts: Vec<String>,
}

fn parse_args(mut pargs: Arguments) -> anyhow::Result<Args> {
    let help = pargs.contains(["-h", "--help"]);
    let json = pargs.contains("--json");
    let artifact_dir = pargs
        .opt_value_from_str(["-a", "--artifact-dir"])?
        .unwrap_or_else(|| "data/model".to_string());

    let texts = pargs
        .finish()
        .into_iter()
        .map(|text: OsString| {
            text.into_string()
                .map_err(|text| anyhow!("Text is not valid UTF-8: {:?}", text))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let unknown: Vec<&String> = texts.iter().filter(|text| text.starts_with('-')).collect();
    if !unknown.is_empty() {
        return Err(anyhow!("Unexpected arguments: {:?}", unknown));
    }

    Ok(Args {
        help,
        artifact_dir,
        json,
        texts,
    })
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = parse_args(Arguments::from_env())?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let texts = if args.texts.is_empty() {
        SAMPLES.iter().map(|text| text.to_string()).collect()
    } else {
        args.texts
    };

    let predictions = infer::<NdArray>(NdArrayDevice::Cpu, &args.artifact_dir, &texts)?;

    for (i, (text, prediction)) in texts.iter().zip(predictions).enumerate() {
        if args.json {
            println!(
                "{}",
                serde_json::json!({ "text": text, "prediction": prediction })
            );

            continue;
        }

        println!(
            "\n=== Item {i} ===\
             \n- Text: {text}\
             \n- Class: {}\
             \n- Probability: {:.4}\
             \n- Score: {:.4}\
             \n================",
            label_name(prediction.label),
            prediction.probability,
            prediction.score
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn arguments(args: &[&str]) -> Arguments {
        Arguments::from_vec(args.iter().map(|arg| OsString::from(*arg)).collect())
    }

    #[test]
    fn collects_texts_after_options() {
        let args = parse_args(arguments(&["-a", "models/detox", "--json", "you idiot", "thanks"]))
            .unwrap();

        assert_eq!(args.artifact_dir, "models/detox");
        assert!(args.json);
        assert_eq!(args.texts, vec!["you idiot".to_string(), "thanks".to_string()]);
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = parse_args(arguments(&["--artifact_dir", "models/detox"]))
            .err()
            .unwrap();

        assert!(err.to_string().contains("--artifact_dir"));
    }
}
