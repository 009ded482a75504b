//! Output schemas for the built-in tasks.
//!
//! Bounded strings are trimmed before their length is checked. List fields
//! that the model may omit default to empty.

use serde::{Deserialize, Serialize};
use structllm_core::schema::{BoundedText, SchemaViolation, Validate};

pub type Short140 = BoundedText<140>;
pub type Short120 = BoundedText<120>;

// --- sentiment ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// positive, neutral or negative
    pub sentiment: String,
    pub evidence: Short140,
}

impl Validate for SentimentResult {}

// --- news ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsTopic {
    pub topic: String,
    /// low, medium or high
    pub confidence: String,
    pub evidence: Short140,
}

impl Validate for NewsTopic {}

// --- ner ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub label: String,
    pub evidence: Short140,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NerResult {
    #[serde(default)]
    pub persons: Vec<Named>,
    #[serde(default)]
    pub organizations: Vec<Named>,
    #[serde(default)]
    pub locations: Vec<Named>,
    #[serde(default)]
    pub order_ids: Vec<OrderRef>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl Validate for NerResult {}

// --- reasoning ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub explanation: Short120,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathReasoning {
    pub steps: Vec<Step>,
    pub final_answer: String,
}

impl Validate for MathReasoning {
    fn validate(&self) -> Result<(), SchemaViolation> {
        if self.steps.is_empty() {
            return Err(SchemaViolation::at("steps", "should have at least 1 item"));
        }
        Ok(())
    }
}

// --- summarization ---

pub const MAX_KEY_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Org,
    Place,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<Short120>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Validate for ArticleSummary {
    fn validate(&self) -> Result<(), SchemaViolation> {
        if self.key_points.len() > MAX_KEY_POINTS {
            return Err(SchemaViolation::at(
                "key_points",
                format!(
                    "should have at most {MAX_KEY_POINTS} items, got {}",
                    self.key_points.len()
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub owner: String,
    pub task: String,
    /// ISO date, when one was stated
    #[serde(default)]
    pub due: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub tl_dr: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
}

impl Validate for ChatSummary {}
