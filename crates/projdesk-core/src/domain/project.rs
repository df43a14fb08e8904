//! Project record
//!
//! The record edited by the back-office view, plus the status label table
//! the status select is built from.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::form::format;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    New,
    InProgress,
    Review,
    Completed,
    Cancelled,
}

/// Status values and their display labels, in presentation order
pub const PROJECT_STATUS_LABELS: [(ProjectStatus, &str); 5] = [
    (ProjectStatus::New, "Новый"),
    (ProjectStatus::InProgress, "В работе"),
    (ProjectStatus::Review, "На проверке"),
    (ProjectStatus::Completed, "Завершён"),
    (ProjectStatus::Cancelled, "Отменён"),
];

impl ProjectStatus {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::New => "new",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Review => "review",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from wire value
    pub fn parse(s: &str) -> Option<Self> {
        PROJECT_STATUS_LABELS
            .iter()
            .map(|(status, _)| *status)
            .find(|status| status.as_str() == s)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        PROJECT_STATUS_LABELS
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, label)| *label)
            .unwrap_or_else(|| self.as_str())
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a select widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Status select options, enumerated from [`PROJECT_STATUS_LABELS`]
pub fn status_options() -> Vec<SelectOption> {
    PROJECT_STATUS_LABELS
        .iter()
        .map(|(status, label)| SelectOption {
            value: status.as_str().to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// A project record as returned by the resource provider
///
/// Only `id` is mandatory on the wire. Mandatory form fields are enforced
/// by the edit form, not here, so a partially filled record still lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    /// Comma-separated technology list
    #[serde(default)]
    pub tech_stack: Option<String>,
    #[serde(default)]
    pub generated_spec: Option<String>,
    #[serde(default)]
    pub llm_estimation: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "deserialize_budget")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_deadline")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl Project {
    /// Technologies from `tech_stack`, trimmed, empties dropped
    pub fn tech_stack_items(&self) -> Vec<&str> {
        self.tech_stack
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Budget as displayed in the edit form
    pub fn budget_display(&self) -> String {
        self.budget.map(format::format_grouped).unwrap_or_default()
    }

    /// Deadline as displayed in the edit form
    pub fn deadline_display(&self) -> String {
        self.deadline.map(format::format_date).unwrap_or_default()
    }
}

fn deserialize_budget<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(format::number_from_value))
}

fn deserialize_deadline<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(format::parse_deadline))
}
