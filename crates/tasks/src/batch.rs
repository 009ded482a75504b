//! CSV batch drivers.
//!
//! Rows are processed one at a time, in order. A failure on any row aborts
//! the batch before output is written.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use structllm_core::provider::Provider;
use thiserror::Error;
use tracing::info;

use crate::runner::{TaskError, TaskRunner};
use crate::schemas::{ActionItem, ChatSummary};
use crate::task::{ChatSummarization, Sentiment};

pub const DEFAULT_SENTIMENT_LIMIT: usize = 5;
pub const DEFAULT_REVIEW_COLUMN: &str = "review";

/// Turns kept from the end of a long conversation.
pub const KEEP_LAST_TURNS: usize = 80;
/// Characters kept from the end of a long transcript.
pub const MAX_TRANSCRIPT_CHARS: usize = 12_000;

pub const REQUIRED_CHAT_COLUMNS: [&str; 4] = ["conversation_id", "turn", "speaker", "message"];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl BatchError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

// --- sentiment batch ---

#[derive(Debug, Clone)]
pub struct SentimentBatchOptions {
    /// Rows to classify, counted from the top of the file.
    pub limit: usize,
    /// Column holding the review text.
    pub column: String,
}

impl Default for SentimentBatchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SENTIMENT_LIMIT,
            column: DEFAULT_REVIEW_COLUMN.to_string(),
        }
    }
}

/// Classify the first `limit` reviews of `input` and write them, with
/// `sentiment` and `evidence` columns appended, to `output`.
///
/// Returns the number of rows written.
pub async fn run_sentiment_batch<P: Provider>(
    runner: &TaskRunner<P>,
    input: &Path,
    output: &Path,
    options: &SentimentBatchOptions,
) -> Result<usize, BatchError> {
    let mut reader = csv::Reader::from_path(input).map_err(BatchError::csv(input))?;
    let headers = reader.headers().map_err(BatchError::csv(input))?.clone();
    let column = headers
        .iter()
        .position(|h| h == options.column)
        .ok_or_else(|| BatchError::MissingColumns {
            columns: vec![options.column.clone()],
        })?;

    let mut rows = Vec::new();
    for record in reader.records().take(options.limit) {
        let record = record.map_err(BatchError::csv(input))?;
        let text = record.get(column).unwrap_or_default();
        let result = runner.run(&Sentiment, text).await?;
        info!(row = rows.len() + 1, sentiment = %result.sentiment, "Review classified");
        rows.push((record, result));
    }

    ensure_parent(output)?;
    let mut writer = csv::Writer::from_path(output).map_err(BatchError::csv(output))?;
    let mut header_row: Vec<&str> = headers.iter().collect();
    header_row.extend(["sentiment", "evidence"]);
    writer
        .write_record(&header_row)
        .map_err(BatchError::csv(output))?;

    for (record, result) in &rows {
        let mut fields: Vec<&str> = record.iter().collect();
        fields.push(&result.sentiment);
        fields.push(result.evidence.as_str());
        writer
            .write_record(&fields)
            .map_err(BatchError::csv(output))?;
    }
    writer.flush().map_err(BatchError::io(output))?;

    info!(rows = rows.len(), path = %output.display(), "Wrote sentiment results");
    Ok(rows.len())
}

// --- chat batch ---

/// One row of a chat transcript CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatTurn {
    pub conversation_id: String,
    pub turn: i64,
    pub speaker: String,
    pub message: String,
}

/// One row of the chat summary CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummaryRow {
    pub conversation_id: String,
    /// Turns in the input, before trimming.
    pub turns: usize,
    pub tl_dr: String,
    pub decisions: String,
    pub action_items: String,
}

#[derive(Serialize)]
struct ChatSummaryRecord<'a> {
    conversation_id: &'a str,
    summary: &'a ChatSummary,
}

/// Read a chat transcript CSV, rejecting files without the required columns.
pub fn load_chat_csv(path: &Path) -> Result<Vec<ChatTurn>, BatchError> {
    let mut reader = csv::Reader::from_path(path).map_err(BatchError::csv(path))?;
    let headers = reader.headers().map_err(BatchError::csv(path))?.clone();

    let missing: Vec<String> = REQUIRED_CHAT_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BatchError::MissingColumns { columns: missing });
    }

    reader
        .deserialize()
        .collect::<Result<Vec<ChatTurn>, _>>()
        .map_err(BatchError::csv(path))
}

/// Format one conversation as `speaker: message` lines.
///
/// Turns are ordered by turn number. Only the last [`KEEP_LAST_TURNS`] turns
/// and the last [`MAX_TRANSCRIPT_CHARS`] characters are kept.
pub fn build_transcript(turns: &[ChatTurn]) -> String {
    let mut ordered: Vec<&ChatTurn> = turns.iter().collect();
    ordered.sort_by_key(|t| t.turn);
    let skip = ordered.len().saturating_sub(KEEP_LAST_TURNS);

    let transcript = ordered[skip..]
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.message))
        .collect::<Vec<_>>()
        .join("\n");

    let chars = transcript.chars().count();
    if chars <= MAX_TRANSCRIPT_CHARS {
        return transcript;
    }
    transcript.chars().skip(chars - MAX_TRANSCRIPT_CHARS).collect()
}

/// Render action items as `owner: task by due`, joined with `; `.
///
/// A missing due date renders as `null`.
pub fn flatten_action_items(items: &[ActionItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{}: {} by {}",
                item.owner,
                item.task,
                item.due.as_deref().unwrap_or("null")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Summarize every conversation in `input`, in conversation id order.
///
/// Writes a flattened CSV to `out_csv` and one `{conversation_id, summary}`
/// JSON object per line to `out_jsonl`, creating parent directories.
pub async fn run_chat_batch<P: Provider>(
    runner: &TaskRunner<P>,
    input: &Path,
    out_csv: &Path,
    out_jsonl: &Path,
) -> Result<Vec<ChatSummaryRow>, BatchError> {
    let mut conversations: BTreeMap<String, Vec<ChatTurn>> = BTreeMap::new();
    for turn in load_chat_csv(input)? {
        conversations
            .entry(turn.conversation_id.clone())
            .or_default()
            .push(turn);
    }

    let mut rows = Vec::with_capacity(conversations.len());
    let mut summaries = Vec::with_capacity(conversations.len());

    for (conversation_id, turns) in &conversations {
        info!(conversation_id = %conversation_id, turns = turns.len(), "Summarizing conversation");
        let transcript = build_transcript(turns);
        let summary = runner.run(&ChatSummarization, &transcript).await?;

        rows.push(ChatSummaryRow {
            conversation_id: conversation_id.clone(),
            turns: turns.len(),
            tl_dr: summary.tl_dr.clone(),
            decisions: summary.decisions.join("; "),
            action_items: flatten_action_items(&summary.action_items),
        });
        summaries.push((conversation_id, summary));
    }

    ensure_parent(out_csv)?;
    let mut writer = csv::Writer::from_path(out_csv).map_err(BatchError::csv(out_csv))?;
    for row in &rows {
        writer.serialize(row).map_err(BatchError::csv(out_csv))?;
    }
    writer.flush().map_err(BatchError::io(out_csv))?;
    info!(path = %out_csv.display(), "Wrote CSV");

    ensure_parent(out_jsonl)?;
    let file = File::create(out_jsonl).map_err(BatchError::io(out_jsonl))?;
    let mut jsonl = BufWriter::new(file);
    for (conversation_id, summary) in &summaries {
        let line = serde_json::to_string(&ChatSummaryRecord {
            conversation_id,
            summary,
        })?;
        writeln!(jsonl, "{line}").map_err(BatchError::io(out_jsonl))?;
    }
    jsonl.flush().map_err(BatchError::io(out_jsonl))?;
    info!(path = %out_jsonl.display(), "Wrote JSONL");

    Ok(rows)
}

fn ensure_parent(path: &Path) -> Result<(), BatchError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(BatchError::io(parent))
        }
        _ => Ok(()),
    }
}
