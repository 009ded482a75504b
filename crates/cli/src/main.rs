//! structllm CLI — the main entry point.
//!
//! Commands:
//! - `run`             — Run one task on a text and print its JSON result
//! - `batch-sentiment` — Classify reviews from a CSV file
//! - `batch-chat`      — Summarize chat transcripts from a CSV file
//! - `config`          — Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use structllm_config::ProviderKind;
use structllm_tasks::TaskKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "structllm",
    about = "structllm — schema-validated JSON from chat models",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to $STRUCTLLM_CONFIG or ~/.structllm/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the provider: hosted (openai) or local (ollama)
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Directory whose templates override the built-in prompts
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one task and print the result as JSON
    Run {
        /// sentiment, news, news-few-shot, ner, reasoning, article-summary, chat-summary
        task: TaskKind,

        /// Input text
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the input text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Classify the reviews in a CSV file
    BatchSentiment {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Rows to classify from the top of the file
        #[arg(long, default_value_t = structllm_tasks::batch::DEFAULT_SENTIMENT_LIMIT)]
        limit: usize,

        /// Column holding the review text
        #[arg(long, default_value = structllm_tasks::batch::DEFAULT_REVIEW_COLUMN)]
        column: String,
    },

    /// Summarize chat transcripts grouped by conversation
    BatchChat {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        out_csv: PathBuf,

        #[arg(long)]
        out_jsonl: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { task, text, file } => {
            commands::run::run(&cli.global, task, text, file).await?
        }
        Commands::BatchSentiment {
            input,
            output,
            limit,
            column,
        } => commands::batch::sentiment(&cli.global, &input, &output, limit, column).await?,
        Commands::BatchChat {
            input,
            out_csv,
            out_jsonl,
        } => commands::batch::chat(&cli.global, &input, &out_csv, &out_jsonl).await?,
        Commands::Config => commands::config_cmd::show(&cli.global)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_text() {
        let cli = Cli::try_parse_from(["structllm", "run", "sentiment", "--text", "great"]).unwrap();
        match cli.command {
            Commands::Run { task, text, file } => {
                assert_eq!(task, TaskKind::Sentiment);
                assert_eq!(text.as_deref(), Some("great"));
                assert!(file.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn run_needs_exactly_one_input() {
        assert!(Cli::try_parse_from(["structllm", "run", "ner"]).is_err());
        assert!(
            Cli::try_parse_from(["structllm", "run", "ner", "--text", "a", "--file", "b"]).is_err()
        );
    }

    #[test]
    fn unknown_task_is_rejected() {
        assert!(Cli::try_parse_from(["structllm", "run", "translate", "--text", "a"]).is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "structllm",
            "config",
            "--provider",
            "ollama",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.global.provider, Some(ProviderKind::Local));
        assert!(cli.global.verbose);
    }

    #[test]
    fn batch_sentiment_defaults() {
        let cli = Cli::try_parse_from([
            "structllm",
            "batch-sentiment",
            "--input",
            "in.csv",
            "--output",
            "out.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::BatchSentiment { limit, column, .. } => {
                assert_eq!(limit, 5);
                assert_eq!(column, "review");
            }
            _ => panic!("expected batch-sentiment"),
        }
    }
}
