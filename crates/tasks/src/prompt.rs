//! Prompt templates.
//!
//! Placeholders use `{{ name }}` syntax; whitespace inside the braces is
//! optional. Rendering is a single pass, so substituted values are never
//! re-expanded.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::debug;

/// Matches `{{ name }}` placeholders.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Templates compiled into the binary, by file name.
const EMBEDDED: &[(&str, &str)] = &[
    ("sentiment.j2", include_str!("../templates/sentiment.j2")),
    ("news_zero_shot.j2", include_str!("../templates/news_zero_shot.j2")),
    ("news_few_shot.j2", include_str!("../templates/news_few_shot.j2")),
    ("ner.j2", include_str!("../templates/ner.j2")),
    ("reasoning.j2", include_str!("../templates/reasoning.j2")),
    ("article_summary.j2", include_str!("../templates/article_summary.j2")),
    ("chat_summary.j2", include_str!("../templates/chat_summary.j2")),
];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing template variable: {name}")]
    MissingVariable { name: String },

    #[error("Template not found: {name}")]
    NotFound { name: String },

    #[error("Failed to read template {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// A prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate<'a> {
    content: Cow<'a, str>,
}

impl<'a> PromptTemplate<'a> {
    pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for cap in PLACEHOLDER.captures_iter(&self.content) {
            if let Some(name) = cap.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .variables()
            .into_iter()
            .find(|name| !values.contains_key(*name))
        {
            return Err(TemplateError::MissingVariable {
                name: missing.to_string(),
            });
        }

        let rendered = PLACEHOLDER.replace_all(&self.content, |cap: &Captures<'_>| {
            values.get(&cap[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

/// Resolves templates by file name.
///
/// A file in the override directory takes precedence over the embedded
/// template of the same name.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Library serving only the embedded templates.
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Names of the embedded templates.
    pub fn embedded_names() -> impl Iterator<Item = &'static str> {
        EMBEDDED.iter().map(|(name, _)| *name)
    }

    pub fn template(&self, name: &str) -> Result<PromptTemplate<'static>, TemplateError> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(name);
            if path.is_file() {
                debug!(template = name, path = %path.display(), "Using template override");
                return read_template(&path).map(PromptTemplate::new);
            }
        }

        EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, content)| PromptTemplate::new(*content))
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn render(
        &self,
        name: &str,
        values: &HashMap<String, String>,
    ) -> Result<String, TemplateError> {
        self.template(name)?.render(values)
    }
}

/// Render the template `name` found in `dir`.
pub fn render_template(
    dir: &Path,
    name: &str,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(TemplateError::NotFound {
            name: name.to_string(),
        });
    }
    PromptTemplate::new(read_template(&path)?).render(values)
}

fn read_template(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
