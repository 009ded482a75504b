//! Built-in tasks: each pairs an output schema with a prompt template.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use structllm_core::schema::Validate;

use crate::schemas::{
    ArticleSummary, ChatSummary, MathReasoning, NerResult, NewsTopic, SentimentResult,
};

/// A structured-output task.
pub trait Task: Send + Sync {
    type Output: DeserializeOwned + Validate + Serialize + Send;

    fn name(&self) -> &'static str;

    /// Template file name in the prompt library.
    fn template(&self) -> &'static str;

    /// The template variable that receives the task input.
    fn variable(&self) -> &'static str;

    fn temperature(&self) -> f32 {
        0.2
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sentiment;

impl Task for Sentiment {
    type Output = SentimentResult;

    fn name(&self) -> &'static str {
        "sentiment"
    }

    fn template(&self) -> &'static str {
        "sentiment.j2"
    }

    fn variable(&self) -> &'static str {
        "user_text"
    }

    fn temperature(&self) -> f32 {
        0.3
    }
}

/// News topic classification, zero-shot unless `few_shot` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct News {
    pub few_shot: bool,
}

impl Task for News {
    type Output = NewsTopic;

    fn name(&self) -> &'static str {
        if self.few_shot { "news-few-shot" } else { "news" }
    }

    fn template(&self) -> &'static str {
        if self.few_shot {
            "news_few_shot.j2"
        } else {
            "news_zero_shot.j2"
        }
    }

    fn variable(&self) -> &'static str {
        "news_text"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ner;

impl Task for Ner {
    type Output = NerResult;

    fn name(&self) -> &'static str {
        "ner"
    }

    fn template(&self) -> &'static str {
        "ner.j2"
    }

    fn variable(&self) -> &'static str {
        "user_text"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reasoning;

impl Task for Reasoning {
    type Output = MathReasoning;

    fn name(&self) -> &'static str {
        "reasoning"
    }

    fn template(&self) -> &'static str {
        "reasoning.j2"
    }

    fn variable(&self) -> &'static str {
        "problem"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleSummarization;

impl Task for ArticleSummarization {
    type Output = ArticleSummary;

    fn name(&self) -> &'static str {
        "article-summary"
    }

    fn template(&self) -> &'static str {
        "article_summary.j2"
    }

    fn variable(&self) -> &'static str {
        "article_text"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatSummarization;

impl Task for ChatSummarization {
    type Output = ChatSummary;

    fn name(&self) -> &'static str {
        "chat-summary"
    }

    fn template(&self) -> &'static str {
        "chat_summary.j2"
    }

    fn variable(&self) -> &'static str {
        "chat_text"
    }
}

/// Task selector for callers that pick a task by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Sentiment,
    News,
    NewsFewShot,
    Ner,
    Reasoning,
    ArticleSummary,
    ChatSummary,
}

impl TaskKind {
    pub const ALL: [TaskKind; 7] = [
        Self::Sentiment,
        Self::News,
        Self::NewsFewShot,
        Self::Ner,
        Self::Reasoning,
        Self::ArticleSummary,
        Self::ChatSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => Sentiment.name(),
            Self::News => News { few_shot: false }.name(),
            Self::NewsFewShot => News { few_shot: true }.name(),
            Self::Ner => Ner.name(),
            Self::Reasoning => Reasoning.name(),
            Self::ArticleSummary => ArticleSummarization.name(),
            Self::ChatSummary => ChatSummarization.name(),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown task '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptLibrary;

    #[test]
    fn task_names_round_trip_through_from_str() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.as_str().parse::<TaskKind>().unwrap(), kind);
        }
        assert_eq!("Chat_Summary".parse::<TaskKind>().unwrap(), TaskKind::ChatSummary);
    }

    #[test]
    fn unknown_task_lists_the_known_ones() {
        let err = "translate".parse::<TaskKind>().unwrap_err();
        assert!(err.contains("sentiment"));
        assert!(err.contains("chat-summary"));
    }

    #[test]
    fn templates_declare_the_task_variable() {
        fn check<T: Task>(task: T) {
            let tpl = PromptLibrary::embedded().template(task.template()).unwrap();
            assert_eq!(tpl.variables(), vec![task.variable()], "{}", task.name());
        }
        check(Sentiment);
        check(News { few_shot: false });
        check(News { few_shot: true });
        check(Ner);
        check(Reasoning);
        check(ArticleSummarization);
        check(ChatSummarization);
    }

    #[test]
    fn sentiment_runs_warmer_than_the_rest() {
        assert_eq!(Sentiment.temperature(), 0.3);
        assert_eq!(Ner.temperature(), 0.2);
        assert_eq!(News::default().temperature(), 0.2);
    }
}
