use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::ack::{Acknowledgement, Severity};
use crate::model::category::Category;
use crate::model::task::{Priority, Task};
use crate::util::unicode::fit_to_width;

/// Column width for titles in list output
const TITLE_WIDTH: usize = 32;

/// Characters of a task id shown in list output
const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub completed: bool,
    pub priority: Priority,
    pub category_id: &'a str,
    /// Category display name; absent for uncategorized tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ViewJson<'a> {
    pub view: &'a str,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
pub struct CategoryJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub color: &'a str,
    /// Open tasks in the category
    pub open: usize,
    /// All tasks referencing the category
    pub total: usize,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json<'a>(task: &'a Task, categories: &'a [Category]) -> TaskJson<'a> {
    TaskJson {
        id: &task.id,
        title: &task.title,
        description: task.description.as_deref(),
        completed: task.completed,
        priority: task.priority,
        category_id: &task.category_id,
        category: find_category(task, categories).map(|c| c.name.as_str()),
        created_at: task.created_at,
        due_date: task.due_date,
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry.timestamp,
        category: entry.category.to_string(),
        description: entry.description.clone(),
        fields: entry.fields.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn find_category<'a>(task: &Task, categories: &'a [Category]) -> Option<&'a Category> {
    categories.iter().find(|c| c.id == task.category_id)
}

fn category_label<'a>(task: &Task, categories: &'a [Category]) -> &'a str {
    find_category(task, categories)
        .map(|c| c.name.as_str())
        .unwrap_or("(uncategorized)")
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// One line per task: checkbox, short id, priority, title, category, due date.
pub fn format_task_line(task: &Task, categories: &[Category]) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} {:<8}  {:<6}  {}  {}",
        check,
        short_id(&task.id),
        task.priority.as_str(),
        fit_to_width(&task.title, TITLE_WIDTH),
        category_label(task, categories),
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    line
}

pub fn format_task_detail(task: &Task, categories: &[Category]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", task.title));
    out.push_str(&format!("id:       {}\n", task.id));
    out.push_str(&format!(
        "status:   {}\n",
        if task.completed { "done" } else { "open" }
    ));
    out.push_str(&format!("priority: {}\n", task.priority.as_str()));
    out.push_str(&format!("category: {}\n", category_label(task, categories)));
    out.push_str(&format!(
        "created:  {}\n",
        task.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    if let Some(due) = task.due_date {
        out.push_str(&format!("due:      {}\n", due.format("%Y-%m-%d")));
    }
    if let Some(desc) = &task.description {
        out.push('\n');
        for line in desc.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }
    out
}

pub fn format_category_line(category: &Category, open: usize) -> String {
    format!(
        "{} ({})  {}  {}",
        category.name,
        open,
        category.color,
        short_id(&category.id)
    )
}

pub fn format_ack(ack: &Acknowledgement) -> String {
    match ack.severity {
        Severity::Info => format!("{}: {}", ack.title, ack.description),
        Severity::Destructive => format!("warning: {}: {}", ack.title, ack.description),
    }
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> String {
    let mut out = format!(
        "{} {}: {}\n",
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        entry.category,
        entry.description
    );
    for (key, value) in &entry.fields {
        out.push_str(&format!("  {}: {}\n", key, value));
    }
    if !entry.body.is_empty() {
        for line in entry.body.lines() {
            out.push_str(&format!("  | {}\n", line));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::default_categories;
    use crate::model::task::TaskDraft;
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn sample_task() -> Task {
        let created = Utc.with_ymd_and_hms(2025, 4, 2, 9, 15, 30).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap();
        TaskDraft::new("Buy milk")
            .with_category("shopping")
            .with_due_date(due)
            .into_task("0f8e2c1a-77aa-4c1e-9d1b-5e2f3a4b5c6d".into(), created)
    }

    #[test]
    fn task_line() {
        let line = format_task_line(&sample_task(), &default_categories());
        assert_snapshot!(line, @"[ ] 0f8e2c1a  medium  Buy milk                          Shopping  due 2025-04-10");
    }

    #[test]
    fn task_line_uncategorized_and_done() {
        let mut task = sample_task();
        task.completed = true;
        task.due_date = None;
        task.priority = Priority::High;
        task.category_id = "deleted".into();
        let line = format_task_line(&task, &default_categories());
        assert_snapshot!(line, @"[x] 0f8e2c1a  high    Buy milk                          (uncategorized)");
    }

    #[test]
    fn long_titles_are_truncated() {
        let mut task = sample_task();
        task.title = "a".repeat(50);
        let line = format_task_line(&task, &default_categories());
        assert!(line.contains(&format!("{}\u{2026}", "a".repeat(31))));
    }

    #[test]
    fn category_line() {
        let cats = default_categories();
        assert_snapshot!(format_category_line(&cats[1], 3), @"Work (3)  #EC4899  work");
    }

    #[test]
    fn detail_includes_description() {
        let mut task = sample_task();
        task.description = Some("2%\noat".into());
        let detail = format_task_detail(&task, &default_categories());
        assert!(detail.starts_with("Buy milk\n"));
        assert!(detail.contains("created:  2025-04-02T09:15:30Z\n"));
        assert!(detail.contains("due:      2025-04-10\n"));
        assert!(detail.ends_with("\n  2%\n  oat\n"));
    }

    #[test]
    fn json_carries_category_name() {
        let task = sample_task();
        let cats = default_categories();
        let value = serde_json::to_value(task_to_json(&task, &cats)).unwrap();
        assert_eq!(value["category"], "Shopping");
        assert_eq!(value["categoryId"], "shopping");
        assert_eq!(value["dueDate"], "2025-04-10T00:00:00Z");
    }

    #[test]
    fn ack_formatting() {
        assert_snapshot!(format_ack(&Acknowledgement::task_deleted()), @"Task deleted: Your task has been deleted.");
        assert!(format_ack(&Acknowledgement::category_in_use()).starts_with("warning: "));
    }

    #[test]
    fn short_id_handles_short_ids() {
        assert_eq!(short_id("work"), "work");
        assert_eq!(short_id("0123456789"), "01234567");
    }
}
