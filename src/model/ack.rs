use serde::Serialize;

/// How an acknowledgement should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    /// Rejections and failures
    Destructive,
}

/// Short-lived notice emitted after a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Acknowledgement {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Acknowledgement {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Acknowledgement {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    pub fn task_added() -> Self {
        Self::info("Task added", "Your task has been added successfully.")
    }

    pub fn task_updated() -> Self {
        Self::info("Task updated", "Your task has been updated successfully.")
    }

    pub fn task_deleted() -> Self {
        Self::info("Task deleted", "Your task has been deleted.")
    }

    /// Text reflects the state the task was just moved into.
    pub fn task_toggled(completed: bool) -> Self {
        let action = if completed { "completed" } else { "uncompleted" };
        Self::info(
            format!("Task {}", action),
            format!("Your task has been marked as {}.", action),
        )
    }

    pub fn category_added() -> Self {
        Self::info("Category added", "Your category has been added successfully.")
    }

    pub fn category_updated() -> Self {
        Self::info(
            "Category updated",
            "Your category has been updated successfully.",
        )
    }

    pub fn category_deleted() -> Self {
        Self::info("Category deleted", "Your category has been deleted.")
    }

    pub fn category_in_use() -> Self {
        Self::destructive(
            "Category not deleted",
            "This category contains tasks. Please move or delete these tasks first.",
        )
    }

    pub fn save_failed(reason: &str) -> Self {
        Self::destructive(
            "Changes not saved",
            format!("Your changes are kept for this session but could not be stored: {}", reason),
        )
    }
}
