use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::evaluate::{accuracy, eval_turney};
use crate::lexicon::SeedLexicon;
use crate::logging::{setup_logging, verbosity_level};
use crate::prepare_dataset::{get_raw_dataset, sample_split, CorpusSource};
use crate::preprocess::{load_tagger, PunktSplitter, SentenceSplitter};
use crate::turney::{ByPolarity, Polarity, TurneyModel};

mod config;
mod error;
mod evaluate;
mod lexicon;
mod logging;
mod polarity;
mod prepare_dataset;
mod preprocess;
mod turney;

#[derive(Parser)]
#[command(name = "turney_polarity")]
#[command(version)]
#[command(about = "Unsupervised noun polarity scoring and review classification", long_about = None)]
struct Cli {
    /// TOML configuration file such as `config/default.toml`; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the pseudocount
    #[arg(long)]
    alpha: Option<f64>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse both training sets and report the accumulated counts
    Train {
        /// Most frequent nouns to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Train, score every noun, and classify the held-out test sets
    Test {
        /// Most positive and most negative nouns to list
        #[arg(long, default_value_t = 0)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(verbosity_level(cli.verbose))?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(alpha) = cli.alpha {
        config.pseudocount = alpha;
    }
    config.validate().context("Invalid configuration.")?;

    let source = CorpusSource::new(&config.corpus).context("Could not open corpus.")?;
    let splitter = PunktSplitter::english();

    match cli.command {
        Commands::Train { top } => {
            info!("Initializing training sets");
            let training = sample_split(&source, &config.sampling.train)
                .context("Could not sample training sets.")?;
            let model = train_turney(&config, &splitter, &training)?;
            print_training_summary(&model, top);
        }
        Commands::Test { top } => test_turney(&config, &source, &splitter, top)?,
    }
    Ok(())
}

fn train_turney(
    config: &Config,
    splitter: &dyn SentenceSplitter,
    training: &ByPolarity<Vec<String>>,
) -> Result<TurneyModel> {
    info!("Streaming lexicons");
    let seeds = SeedLexicon::load(
        &config.lexicon.positive,
        &config.lexicon.negative,
        config.encoding,
    )
    .context("Could not load seed lexicons.")?;
    let tagger = load_tagger(&config.tagger_model).context("Could not load tagger.")?;
    info!("Tagger loaded...");

    let mut model = TurneyModel::new(seeds, config.pseudocount, config.encoding);
    model
        .train_model(splitter, &tagger, training)
        .context("Training failed.")?;
    Ok(model)
}

fn test_turney(
    config: &Config,
    source: &CorpusSource,
    splitter: &dyn SentenceSplitter,
    top: usize,
) -> Result<()> {
    info!("Initializing training and test sets");
    let dataset = get_raw_dataset(source, &config.sampling.train, &config.sampling.test)
        .context("Could not sample reviews.")?;
    let model = train_turney(config, splitter, &dataset.train)?;

    info!("Calculating polarity scores");
    let scores = model
        .calc_polarity_scores()
        .context("Could not calculate polarity scores.")?;
    println!("Scored {} nouns", scores.len());

    info!("Evaluating turney model");
    let pos = eval_turney(&model, &scores, splitter, &dataset.test.positive, Polarity::Positive)
        .context("Evaluation of the positive test set failed.")?;
    let neg = eval_turney(&model, &scores, splitter, &dataset.test.negative, Polarity::Negative)
        .context("Evaluation of the negative test set failed.")?;

    for eval in [&pos, &neg] {
        println!("{}: {}/{} correct", eval.expected, eval.correct, eval.total());
    }
    if top > 0 {
        for label in Polarity::ALL {
            println!("Most {} nouns:", label);
            for (noun, score) in scores.most_polarized(label, top) {
                println!("  {:<20} {:>8.3}", noun, score);
            }
        }
    }
    println!("Accuracy of Custom Turney: {:.2}%", accuracy(&[&pos, &neg])?);
    Ok(())
}

fn print_training_summary(model: &TurneyModel, top: usize) {
    println!("Nouns: {}", model.nouns().len());
    for label in Polarity::ALL {
        println!(
            "{}: {} seeds, {} seed hits, {} reviews, {} nouns first seen",
            label,
            model.seeds().seeds(label).len(),
            model.seed_total(label),
            model.review_nouns(label).len(),
            model.polarized_nouns(label).len()
        );
    }
    for (noun, count) in model.most_frequent_nouns(top) {
        println!("  {:<20} {:>6}", noun, count);
    }
}
