use crate::model::category::Category;
use crate::model::task::Task;
use crate::model::view::ViewKey;

/// Tasks in the given category, completed or not, in stored order.
pub fn tasks_by_category<'a>(tasks: &'a [Task], category_id: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.category_id == category_id).collect()
}

/// Tasks displayed under `view`, in stored order.
pub fn filter_by_view<'a>(tasks: &'a [Task], view: &ViewKey) -> Vec<&'a Task> {
    tasks.iter().filter(|t| view.matches(t)).collect()
}

/// Badge count for a view in the sidebar.
pub fn view_count(tasks: &[Task], view: &ViewKey) -> usize {
    tasks.iter().filter(|t| view.matches(t)).count()
}

/// Tasks whose category id names no existing category.
pub fn uncategorized<'a>(tasks: &'a [Task], categories: &[Category]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !categories.iter().any(|c| c.id == t.category_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::default_categories;
    use crate::model::task::TaskDraft;
    use chrono::Utc;

    fn task(id: &str, category: &str, completed: bool) -> Task {
        let mut t = TaskDraft::new(id)
            .with_category(category)
            .into_task(id.to_string(), Utc::now());
        t.completed = completed;
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![task("t1", "x", true), task("t2", "x", false), task("t3", "y", false)]
    }

    #[test]
    fn category_view_shows_open_tasks_of_that_category() {
        let tasks = sample();
        assert_eq!(ids(&filter_by_view(&tasks, &ViewKey::parse("x"))), vec!["t2"]);
    }

    #[test]
    fn completed_view_spans_categories() {
        let mut tasks = sample();
        tasks[2].completed = true;
        assert_eq!(
            ids(&filter_by_view(&tasks, &ViewKey::Completed)),
            vec!["t1", "t3"]
        );
    }

    #[test]
    fn all_view_shows_every_open_task() {
        let tasks = sample();
        assert_eq!(ids(&filter_by_view(&tasks, &ViewKey::All)), vec!["t2", "t3"]);
        assert_eq!(view_count(&tasks, &ViewKey::All), 2);
    }

    #[test]
    fn tasks_by_category_includes_completed() {
        let tasks = sample();
        assert_eq!(ids(&tasks_by_category(&tasks, "x")), vec!["t1", "t2"]);
        assert!(tasks_by_category(&tasks, "z").is_empty());
    }

    #[test]
    fn uncategorized_finds_dangling_references() {
        let tasks = vec![task("a", "work", false), task("b", "gone", false)];
        assert_eq!(ids(&uncategorized(&tasks, &default_categories())), vec!["b"]);
    }
}
