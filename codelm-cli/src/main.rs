use std::path::PathBuf;

use clap::Parser;
use log::info;

use codelm_core::io::read_corpus;
use codelm_core::model::evaluation::perplexity;
use codelm_core::model::language_model::LanguageModel;
use codelm_core::model::options::ModelOptions;
use codelm_core::model::prediction::{predict_next, sample_context};

#[derive(Parser, Debug)]
#[command(name = "codelm")]
#[command(about = "N-gram language model over tokenized method bodies")]
#[command(version)]
struct Args {
    /// Training corpus (one token sequence per line)
    #[arg(long, default_value = "data/java_methods_train.txt")]
    train: PathBuf,

    /// Validation corpus
    #[arg(long, default_value = "data/java_methods_val.txt")]
    validation: PathBuf,

    /// Test corpus
    #[arg(long, default_value = "data/java_methods_test.txt")]
    test: PathBuf,

    /// Maximum n-gram order
    #[arg(long, default_value_t = 6)]
    max_n: usize,

    /// Absolute discount, in (0.0, 1.0]
    #[arg(long, default_value_t = 0.75)]
    discount: f64,

    /// Number of ranked completions per sampled context
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Number of sampled contexts from the test corpus
    #[arg(long, default_value_t = 10)]
    samples: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut options = ModelOptions::default();
    options.set_max_n(args.max_n)?;
    options.set_discount(args.discount)?;
    options.top_k = args.top;
    options.nb_samples = args.samples;

    // Load the preprocessed corpora
    let train_corpus = read_corpus(&args.train)?;
    let val_corpus = read_corpus(&args.validation)?;
    let test_corpus = read_corpus(&args.test)?;
    info!(
        "Loaded {} training, {} validation, {} test sequences",
        train_corpus.len(),
        val_corpus.len(),
        test_corpus.len()
    );

    // The model is rebuilt from scratch on every run
    let model = LanguageModel::train(&train_corpus, &options)?;
    info!(
        "Built model: vocabulary {}, orders 1..={}",
        model.vocab_size(),
        model.max_n()
    );

    // Evaluation on the validation and test sets
    println!("Validation Perplexity: {}", perplexity(&model, &val_corpus)?);
    println!("Test Perplexity: {}", perplexity(&model, &test_corpus)?);

    // Sample sequences for code completion
    println!("\nSampling code completions:");
    let mut rng = rand::rng();
    for _ in 0..options.nb_samples {
        let Some(context) = sample_context(&test_corpus, model.max_n(), &mut rng) else {
            info!("Test corpus has no sequence of length >= {}", model.max_n());
            break;
        };

        let completions = predict_next(&model, context, options.top_k)
            .into_iter()
            .map(|(token, prob)| format!("{token} ({prob:.6})"))
            .collect::<Vec<_>>();

        println!("Context: {}", context.join(" "));
        println!("Predicted next tokens: {}\n", completions.join(", "));
    }

    Ok(())
}
