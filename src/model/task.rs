use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::category::DEFAULT_CATEGORY_ID;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A stored task. Field names follow the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique id, fixed at creation
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub category_id: String,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// A task as submitted for creation: everything except `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub category_id: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// A draft with the form defaults: medium priority in the personal category.
    pub fn new(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            description: None,
            completed: false,
            priority: Priority::Medium,
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            due_date: None,
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = category_id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Blank (empty or whitespace-only) titles are rejected on add.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Turn the draft into a task with the given identity.
    pub fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        let category_id = if self.category_id.is_empty() {
            DEFAULT_CATEGORY_ID.to_string()
        } else {
            self.category_id
        };
        Task {
            id,
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            completed: self.completed,
            priority: self.priority,
            category_id,
            created_at,
            due_date: self.due_date,
        }
    }
}
