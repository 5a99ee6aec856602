//! `affinity` CLI: score quiz submissions and inspect the catalogs.
//!
//! Usage:
//!   affinity score submission.json
//!   affinity score --offline < submission.json
//!   affinity archetypes
//!   affinity prompt "Question?" "Answer."

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use affinity_quiz::adjuster::build_prompt;
use affinity_quiz::config::{Config, RuntimeConfig, load_env_files};
use affinity_quiz::{DimensionVector, QuizSubmission};

#[derive(Parser)]
#[command(name = "affinity")]
#[command(about = "Relationship archetype quiz scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a submission (JSON file, or stdin when omitted) and print the result as JSON
    Score {
        path: Option<PathBuf>,
        /// Skip the oracle; free-text answers contribute nothing
        #[arg(long)]
        offline: bool,
    },
    /// List the archetype catalog
    Archetypes,
    /// Print the oracle prompt for a question/answer pair against a zero vector
    Prompt { question: String, response: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first so warnings raised while loading config are visible
    load_env_files();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(RuntimeConfig::load_from_env().log_level))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Score { path, offline } => score(&config, path, offline).await,
        Commands::Archetypes => archetypes(&config),
        Commands::Prompt { question, response } => {
            println!("{}", build_prompt(&question, &response, &DimensionVector::zero()));
            Ok(())
        }
    }
}

async fn score(config: &Config, path: Option<PathBuf>, offline: bool) -> Result<()> {
    let raw = match &path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read submission {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read submission from stdin")?;
            buf
        }
    };
    let submission: QuizSubmission =
        serde_json::from_str(&raw).context("Submission is not valid JSON")?;

    let pipeline = affinity_quiz::build_pipeline(config)?;
    let oracle = affinity_quiz::build_oracle(config, offline)?;
    let result = pipeline.run_submission(&submission, oracle.as_ref()).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn archetypes(config: &Config) -> Result<()> {
    let pipeline = affinity_quiz::build_pipeline(config)?;
    for a in pipeline.catalog().archetypes() {
        let keywords: Vec<String> = a
            .keywords
            .iter()
            .map(|k| format!("{} {}", k.emoji, k.text))
            .collect();
        println!("{} ({})", a.name, a.id);
        println!("  {}", a.tagline);
        println!("  {}", keywords.join(", "));
        println!(
            "  profile: ed={:.1} rs={:.1} va={:.1} cs={:.1}",
            a.profile.emotional_depth,
            a.profile.relational_style,
            a.profile.values_alignment,
            a.profile.communication_style
        );
    }
    Ok(())
}
