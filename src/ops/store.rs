use chrono::Utc;
use uuid::Uuid;

use crate::io::persistence::PersistenceAdapter;
use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::ack::Acknowledgement;
use crate::model::category::{Category, CategoryDraft};
use crate::model::task::{Task, TaskDraft};
use crate::model::view::ViewKey;
use crate::ops::{reorder, views};

/// Something listeners are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Tasks or categories changed; re-read state.
    Changed,
    Acknowledged(Acknowledgement),
}

pub type Listener = Box<dyn FnMut(&StoreEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of `delete_category`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRemoval {
    Deleted,
    NotFound,
    /// Refused: tasks still reference the category
    InUse { tasks: usize },
}

/// Error type for id lookups from user input
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {kind} matches {query:?}")]
    NotFound { kind: &'static str, query: String },
    #[error("{query:?} is ambiguous: matches {matches}")]
    Ambiguous { query: String, matches: String },
}

/// The task and category collections plus their persistence.
///
/// All mutations go through this type. Each one runs to completion,
/// rewrites both blobs and then notifies listeners.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    persistence: PersistenceAdapter<S>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    /// Set when the last save failed
    dirty: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load persisted state and return a ready store.
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let snapshot = persistence.load();
        TaskStore {
            tasks: snapshot.tasks,
            categories: snapshot.categories,
            persistence,
            listeners: Vec::new(),
            next_listener: 0,
            dirty: false,
        }
    }

    /// Flush unsaved state and release the store.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.flush()
    }

    /// Retry the last save if it failed.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.persistence.save(&self.tasks, &self.categories)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether in-memory state is ahead of the medium.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut PersistenceAdapter<S> {
        &mut self.persistence
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the listener was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn acknowledge(&mut self, ack: Acknowledgement) {
        self.emit(StoreEvent::Acknowledged(ack));
    }

    /// Persist, then tell listeners. A failed save keeps in-memory state and
    /// is retried by the next mutation or `flush`.
    fn commit(&mut self, ack: Option<Acknowledgement>) {
        let saved = self.persistence.save(&self.tasks, &self.categories);
        self.emit(StoreEvent::Changed);
        if let Some(ack) = ack {
            self.acknowledge(ack);
        }
        match saved {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::warn!(error = %e, "changes kept in memory only");
                self.dirty = true;
                self.acknowledge(Acknowledgement::save_failed(&e.to_string()));
            }
        }
    }

    fn new_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            let taken = self.tasks.iter().any(|t| t.id == id)
                || self.categories.iter().any(|c| c.id == id);
            if !taken {
                return id;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn tasks_by_category(&self, category_id: &str) -> Vec<&Task> {
        views::tasks_by_category(&self.tasks, category_id)
    }

    pub fn filter_by_view(&self, view: &ViewKey) -> Vec<&Task> {
        views::filter_by_view(&self.tasks, view)
    }

    pub fn view_count(&self, view: &ViewKey) -> usize {
        views::view_count(&self.tasks, view)
    }

    pub fn uncategorized_tasks(&self) -> Vec<&Task> {
        views::uncategorized(&self.tasks, &self.categories)
    }

    /// Find a task by full id or unique id prefix.
    pub fn resolve_task_id(&self, query: &str) -> Result<String, LookupError> {
        resolve_by_prefix("task", query, self.tasks.iter().map(|t| t.id.as_str()))
    }

    /// Find a category by id, then by case-insensitive name, then by unique id prefix.
    pub fn resolve_category_id(&self, query: &str) -> Result<String, LookupError> {
        if let Some(c) = self.category(query) {
            return Ok(c.id.clone());
        }
        let by_name: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(query))
            .collect();
        match by_name.as_slice() {
            [only] => return Ok(only.id.clone()),
            [] => {}
            many => {
                return Err(LookupError::Ambiguous {
                    query: query.to_string(),
                    matches: many
                        .iter()
                        .map(|c| c.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        resolve_by_prefix(
            "category",
            query,
            self.categories.iter().map(|c| c.id.as_str()),
        )
    }

    // -----------------------------------------------------------------------
    // Task mutations
    // -----------------------------------------------------------------------

    /// Append a new task. Blank titles are ignored and return `None`.
    pub fn add_task(&mut self, draft: TaskDraft) -> Option<String> {
        if !draft.has_title() {
            tracing::debug!("ignoring task with blank title");
            return None;
        }
        let id = self.new_id();
        let task = draft.into_task(id.clone(), Utc::now());
        tracing::debug!(id = %task.id, category = %task.category_id, "task added");
        self.tasks.push(task);
        self.commit(Some(Acknowledgement::task_added()));
        Some(id)
    }

    /// Replace the stored task with the same id. The creation time is kept.
    pub fn update_task(&mut self, mut task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            return false;
        };
        task.created_at = slot.created_at;
        *slot = task;
        self.commit(Some(Acknowledgement::task_updated()));
        true
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        tracing::debug!(id, "task deleted");
        self.commit(Some(Acknowledgement::task_deleted()));
        true
    }

    /// Toggle completion. Returns the new state.
    pub fn complete_task(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.commit(Some(Acknowledgement::task_toggled(completed)));
        Some(completed)
    }

    /// Replace the whole sequence. Membership is the caller's responsibility.
    pub fn reorder_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.commit(None);
    }

    /// Drop `dragged` onto `target` within `view`. Returns false when
    /// nothing moved (same task, or either one not visible in the view).
    pub fn move_task(&mut self, view: &ViewKey, dragged: &str, target: &str) -> bool {
        match reorder::reorder_in_view(&self.tasks, view, dragged, target) {
            Some(tasks) => {
                tracing::debug!(%view, dragged, target, "task moved");
                self.reorder_tasks(tasks);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Category mutations
    // -----------------------------------------------------------------------

    /// Append a new category. Duplicate names are allowed.
    pub fn add_category(&mut self, draft: CategoryDraft) -> String {
        let id = self.new_id();
        self.categories.push(draft.into_category(id.clone()));
        self.commit(Some(Acknowledgement::category_added()));
        id
    }

    pub fn update_category(&mut self, category: Category) -> bool {
        let Some(slot) = self.categories.iter_mut().find(|c| c.id == category.id) else {
            return false;
        };
        *slot = category;
        self.commit(Some(Acknowledgement::category_updated()));
        true
    }

    /// Remove a category unless tasks still reference it.
    pub fn delete_category(&mut self, id: &str) -> CategoryRemoval {
        let referencing = self.tasks.iter().filter(|t| t.category_id == id).count();
        if referencing > 0 {
            tracing::debug!(id, tasks = referencing, "category in use, not deleted");
            self.acknowledge(Acknowledgement::category_in_use());
            return CategoryRemoval::InUse { tasks: referencing };
        }
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return CategoryRemoval::NotFound;
        }
        self.commit(Some(Acknowledgement::category_deleted()));
        CategoryRemoval::Deleted
    }
}

fn resolve_by_prefix<'a>(
    kind: &'static str,
    query: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<String, LookupError> {
    let not_found = || LookupError::NotFound {
        kind,
        query: query.to_string(),
    };
    if query.is_empty() {
        return Err(not_found());
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(query)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == query) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [] => Err(not_found()),
        [only] => Ok(only.to_string()),
        many => Err(LookupError::Ambiguous {
            query: query.to_string(),
            matches: many.join(", "),
        }),
    }
}
