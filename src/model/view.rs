use std::fmt;

use crate::model::task::Task;

/// A list view selected in the sidebar.
///
/// `all` shows every open task, `completed` every finished one, and any
/// other key shows the open tasks of the category with that id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ViewKey {
    #[default]
    All,
    Completed,
    Category(String),
}

impl ViewKey {
    pub fn parse(key: &str) -> ViewKey {
        match key {
            "all" => ViewKey::All,
            "completed" => ViewKey::Completed,
            other => ViewKey::Category(other.to_string()),
        }
    }

    /// Whether `task` is displayed in this view.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            ViewKey::All => !task.completed,
            ViewKey::Completed => task.completed,
            ViewKey::Category(id) => !task.completed && task.category_id == *id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ViewKey::All => "all",
            ViewKey::Completed => "completed",
            ViewKey::Category(id) => id,
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ViewKey {
    fn from(key: &str) -> Self {
        ViewKey::parse(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reserved_keys() {
        assert_eq!(ViewKey::parse("all"), ViewKey::All);
        assert_eq!(ViewKey::parse("completed"), ViewKey::Completed);
        assert_eq!(ViewKey::parse("work"), ViewKey::Category("work".into()));
        assert_eq!(ViewKey::parse("work").to_string(), "work");
    }
}
