//! querytune command-line entry point

use anyhow::Result;
use clap::Parser;
use querytune_pipeline::{
    run, DomainProfile, EventSink, NullSink, Outcome, PipelineConfig, StdoutSink, TrainOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Fine-tune a small query-answering model and export it.
#[derive(Parser, Debug)]
#[command(name = "querytune", version, about)]
struct Args {
    /// Path to training data JSON file
    #[arg(long)]
    training_data: PathBuf,

    /// Path to save the exported model
    #[arg(long)]
    output_model: PathBuf,

    /// Base model to fine-tune (defaults to the profile's model)
    #[arg(long)]
    base_model: Option<String>,

    /// Query domain to fine-tune for
    #[arg(long, value_enum, default_value = "export-data")]
    profile: DomainProfile,

    /// Number of training epochs
    #[arg(long, default_value_t = 3)]
    epochs: usize,

    /// Training batch size
    #[arg(long, default_value_t = 2)]
    batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 5e-5)]
    learning_rate: f32,

    /// Directory for native checkpoints
    #[arg(long, default_value = "./results")]
    checkpoint_dir: PathBuf,

    /// Sequence length for tokenized records
    #[arg(long, default_value_t = 512)]
    seq_len: usize,

    /// Shuffle seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,
}

fn run_pipeline(args: Args) -> Result<ExitCode> {
    let config = PipelineConfig {
        training_data: args.training_data,
        output_model: args.output_model,
        base_model: args.base_model,
        profile: args.profile,
        checkpoint_dir: args.checkpoint_dir,
        train: TrainOptions {
            epochs: args.epochs,
            batch_size: args.batch_size,
            learning_rate: args.learning_rate,
            seq_len: args.seq_len,
            seed: args.seed,
            ..TrainOptions::default()
        },
    };

    let sink: Box<dyn EventSink> = if args.quiet {
        Box::new(NullSink)
    } else {
        Box::new(StdoutSink)
    };

    let report = run(&config, sink.as_ref())?;
    if !args.quiet {
        match report.outcome {
            Outcome::Full => println!("Fine-tuning process completed"),
            Outcome::NativeOnly => {
                println!("Fine-tuning completed; interchange export was skipped")
            }
            Outcome::Placeholder => println!("Created a placeholder model instead"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run_pipeline(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
