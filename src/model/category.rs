use serde::{Deserialize, Serialize};

/// Category new tasks land in when none is chosen.
pub const DEFAULT_CATEGORY_ID: &str = "personal";

/// Color offered for new categories when none is given.
pub const DEFAULT_CATEGORY_COLOR: &str = "#8B5CF6";

/// A task category. The color is only used for tagging in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A category as submitted for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        CategoryDraft {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn into_category(self, id: String) -> Category {
        Category {
            id,
            name: self.name,
            color: self.color,
        }
    }
}

/// The categories present on first run. They are ordinary categories and
/// can be deleted once no task references them.
pub fn default_categories() -> Vec<Category> {
    [
        ("personal", "Personal", "#8B5CF6"),
        ("work", "Work", "#EC4899"),
        ("shopping", "Shopping", "#10B981"),
        ("errands", "Errands", "#F59E0B"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_default_categories() {
        let cats = default_categories();
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Personal", "Work", "Shopping", "Errands"]);
        assert!(cats.iter().any(|c| c.id == DEFAULT_CATEGORY_ID));
    }
}
