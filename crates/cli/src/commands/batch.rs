//! `structllm batch-sentiment` and `structllm batch-chat`.

use std::path::Path;

use structllm_tasks::{SentimentBatchOptions, run_chat_batch, run_sentiment_batch};

use crate::GlobalArgs;

pub async fn sentiment(
    global: &GlobalArgs,
    input: &Path,
    output: &Path,
    limit: usize,
    column: String,
) -> anyhow::Result<()> {
    let runner = super::build_runner(global)?;
    let options = SentimentBatchOptions { limit, column };

    let rows = run_sentiment_batch(&runner, input, output, &options).await?;
    println!("Saved {rows} rows → {}", output.display());
    Ok(())
}

pub async fn chat(
    global: &GlobalArgs,
    input: &Path,
    out_csv: &Path,
    out_jsonl: &Path,
) -> anyhow::Result<()> {
    let runner = super::build_runner(global)?;

    let rows = run_chat_batch(&runner, input, out_csv, out_jsonl).await?;
    println!("Summarized {} conversations", rows.len());
    println!("  CSV   → {}", out_csv.display());
    println!("  JSONL → {}", out_jsonl.display());
    Ok(())
}
