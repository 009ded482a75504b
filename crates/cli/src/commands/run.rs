//! `structllm run` — Run one task and print its JSON result.

use std::path::PathBuf;

use anyhow::Context;
use structllm_tasks::TaskKind;

use crate::GlobalArgs;

pub async fn run(
    global: &GlobalArgs,
    task: TaskKind,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --text or --file"),
    };

    let runner = super::build_runner(global)?;
    let output = runner.run_kind(task, &input).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
