//! Drag-and-drop reordering within a view.
//!
//! Dragging only changes the relative order of the tasks visible in the
//! active view. The full sequence is rebuilt as the reordered visible block
//! followed by every other task in its prior relative order.

use crate::model::task::Task;
use crate::model::view::ViewKey;

/// Task sequence split into the tasks shown in a view and the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub visible: Vec<Task>,
    pub rest: Vec<Task>,
}

/// Split `tasks` by the view's display predicate, keeping relative order on both sides.
pub fn partition(tasks: &[Task], view: &ViewKey) -> Partition {
    let (visible, rest): (Vec<Task>, Vec<Task>) =
        tasks.iter().cloned().partition(|t| view.matches(t));
    Partition { visible, rest }
}

/// Move `dragged` into the position held by `target`; later tasks shift by one.
/// Returns false (leaving `tasks` untouched) if the ids are equal or either is missing.
pub fn move_onto(tasks: &mut Vec<Task>, dragged: &str, target: &str) -> bool {
    if dragged == target {
        return false;
    }
    let Some(from) = tasks.iter().position(|t| t.id == dragged) else {
        return false;
    };
    let Some(to) = tasks.iter().position(|t| t.id == target) else {
        return false;
    };
    let task = tasks.remove(from);
    tasks.insert(to, task);
    true
}

/// Reordered visible block first, then everything else.
pub fn recombine(partition: Partition) -> Vec<Task> {
    let Partition { mut visible, rest } = partition;
    visible.extend(rest);
    visible
}

/// The full drop operation. `None` means nothing changes.
pub fn reorder_in_view(
    tasks: &[Task],
    view: &ViewKey,
    dragged: &str,
    target: &str,
) -> Option<Vec<Task>> {
    let mut split = partition(tasks, view);
    if !move_onto(&mut split.visible, dragged, target) {
        return None;
    }
    Some(recombine(split))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn task(id: &str, category: &str) -> Task {
        TaskDraft::new(id)
            .with_category(category)
            .into_task(id.to_string(), Utc::now())
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn drag_onto_next_in_category_view() {
        let tasks = vec![task("A", "cat1"), task("B", "cat1"), task("C", "cat2")];
        let out = reorder_in_view(&tasks, &ViewKey::parse("cat1"), "A", "B").unwrap();
        assert_eq!(ids(&out), vec!["B", "A", "C"]);
    }

    #[test]
    fn drag_upwards_takes_target_position() {
        let mut tasks = vec![task("A", "c"), task("B", "c"), task("C", "c"), task("D", "c")];
        assert!(move_onto(&mut tasks, "D", "B"));
        assert_eq!(ids(&tasks), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn drag_downwards_to_last() {
        let mut tasks = vec![task("A", "c"), task("B", "c"), task("C", "c")];
        assert!(move_onto(&mut tasks, "A", "C"));
        assert_eq!(ids(&tasks), vec!["B", "C", "A"]);
    }

    #[test]
    fn hidden_tasks_move_behind_visible_block() {
        let tasks = vec![
            task("W1", "work"),
            task("P1", "personal"),
            task("W2", "work"),
            task("P2", "personal"),
        ];
        let out = reorder_in_view(&tasks, &ViewKey::parse("personal"), "P2", "P1").unwrap();
        assert_eq!(ids(&out), vec!["P2", "P1", "W1", "W2"]);
    }

    #[test]
    fn completed_tasks_are_outside_category_view() {
        let mut tasks = vec![task("A", "c"), task("B", "c"), task("C", "c")];
        tasks[0].completed = true;
        let out = reorder_in_view(&tasks, &ViewKey::parse("c"), "C", "B").unwrap();
        assert_eq!(ids(&out), vec!["C", "B", "A"]);
    }

    #[test]
    fn noop_cases() {
        let tasks = vec![task("A", "cat1"), task("B", "cat1"), task("C", "cat2")];
        let view = ViewKey::parse("cat1");
        assert_eq!(reorder_in_view(&tasks, &view, "A", "A"), None);
        assert_eq!(reorder_in_view(&tasks, &view, "A", "missing"), None);
        // C exists but is not visible in cat1
        assert_eq!(reorder_in_view(&tasks, &view, "C", "A"), None);
    }

    #[test]
    fn all_view_reorders_across_categories() {
        let tasks = vec![task("A", "x"), task("B", "y"), task("C", "z")];
        let out = reorder_in_view(&tasks, &ViewKey::All, "C", "A").unwrap();
        assert_eq!(ids(&out), vec!["C", "A", "B"]);
    }

    #[test]
    fn partition_keeps_membership() {
        let tasks = vec![task("A", "x"), task("B", "y"), task("C", "x")];
        let split = partition(&tasks, &ViewKey::parse("x"));
        assert_eq!(ids(&split.visible), vec!["A", "C"]);
        assert_eq!(ids(&split.rest), vec!["B"]);
        assert_eq!(recombine(split).len(), 3);
    }
}
