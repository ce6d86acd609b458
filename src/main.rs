use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use parlamind::{analyze_transcripts, run_pipeline, OutputFormat, PartyVocabulary, PipelineConfig};

#[derive(Parser)]
#[command(name = "parlamind")]
#[command(author, version, about = "Bundestag speech corpus reconciliation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse transcripts, normalize parties and merge with the OpenDiscourse corpus
    Process {
        /// Data directory containing xml/, txt/ and OpenDiscourse/
        /// (defaults to PARLAMIND_DATA_DIR or ./data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory of extracted speech-YYYY-MM-DD.txt documents
        #[arg(long)]
        text_dir: Option<PathBuf>,

        /// Output file for the reconciled corpus
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the reconciled corpus to the output file
        #[arg(long)]
        save: bool,

        /// Keep audience reactions in free-text speech bodies
        #[arg(long)]
        keep_free_text_reactions: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize a transcript directory without reconciling
    Analyze {
        /// Directory of XML transcripts
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            data_dir,
            text_dir,
            output,
            format,
            save,
            keep_free_text_reactions,
            verbose,
        } => {
            setup_logging(verbose);

            let mut config = PipelineConfig::from_env();
            if let Some(dir) = data_dir {
                config = PipelineConfig {
                    output: config.output,
                    ..PipelineConfig::with_data_dir(dir)
                };
            }
            if let Some(dir) = text_dir {
                config.text_dir = Some(dir);
            }
            if let Some(path) = output {
                config.set_output(path);
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            config.save = save;
            config.parse.segmenter.keep_reactions = keep_free_text_reactions;

            process(&config)
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn process(config: &PipelineConfig) -> Result<()> {
    let output = run_pipeline(config).context("Pipeline failed")?;

    for (document, reason) in &output.skipped_documents {
        info!("Skipped {}: {}", document, reason);
    }

    let report = &output.report;
    info!(
        "Complete: {} rows from {} transcript and {} corpus speeches",
        output.corpus.len(),
        report.transcript_rows,
        report.corpus_rows
    );
    if let Some((start, end)) = output.corpus.date_range() {
        info!("Covering {} to {}", start, end);
    }

    match output.written {
        Some(path) => info!("Output written to {:?}", path),
        None => info!("Not saved (pass --save to write {:?})", config.output.output_path),
    }

    Ok(())
}

fn analyze(input: PathBuf) -> Result<()> {
    info!("Analyzing transcripts in {:?}", input);
    let analysis = analyze_transcripts(&input, &PartyVocabulary::default())
        .context("Failed to analyze transcripts")?;

    println!("Transcript Analysis");
    println!("===================");
    println!("Documents parsed: {}", analysis.documents);
    println!("Speeches: {}", analysis.speeches);
    println!("Speeches without speaker: {}", analysis.nameless_speeches);
    println!("Reactions: {}", analysis.reactions);
    println!();

    println!("Speeches per Party");
    println!("------------------");
    for (party, count) in &analysis.by_party {
        println!("{}: {}", party, count);
    }

    if !analysis.skipped_documents.is_empty() {
        println!();
        println!("Skipped Documents");
        println!("-----------------");
        for (document, reason) in &analysis.skipped_documents {
            println!("{}: {}", document, reason);
        }
    }

    Ok(())
}
