use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::optimization::models::JobContext;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub job_type: Option<String>,
    pub application_link: Option<String>,
    pub source: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// The view of this listing the optimization loop tailors against.
    pub fn to_context(&self) -> JobContext {
        JobContext {
            title: self.title.clone(),
            description: normalize_description(&self.description),
            requirements: self.requirements.clone(),
        }
    }
}

/// Cleans scraped listing text: strips HTML tags, collapses whitespace inside
/// each paragraph, drops empty paragraphs and separates the rest by a blank line.
pub fn normalize_description(raw: &str) -> String {
    strip_tags(raw)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Removes complete `<...>` tags. A `<` with no closing `>` is kept as text.
fn strip_tags(raw: &str) -> String {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    match TAG.get_or_init(|| Regex::new(r"<[^>]*>").ok()) {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    }
}
