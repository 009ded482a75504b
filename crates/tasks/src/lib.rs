//! Built-in structured-output tasks for structllm.
//!
//! Each task pairs a prompt template with an output schema; [`TaskRunner`]
//! renders the prompt and drives the retrieval loop. The `batch` module runs
//! tasks over CSV files.

pub mod batch;
pub mod prompt;
pub mod runner;
pub mod schemas;
pub mod task;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use batch::{
    BatchError, ChatSummaryRow, ChatTurn, SentimentBatchOptions, build_transcript,
    flatten_action_items, load_chat_csv, run_chat_batch, run_sentiment_batch,
};
pub use prompt::{PromptLibrary, PromptTemplate, TemplateError, render_template};
pub use runner::{TaskError, TaskRunner};
pub use task::{
    ArticleSummarization, ChatSummarization, Ner, News, Reasoning, Sentiment, Task, TaskKind,
};
