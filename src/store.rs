use crate::persist::{PersistenceError, SaveFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Entity ─────────────────────────────────────────────────────

/// A task — the single domain entity.
///
/// `created_at` is set once at creation and never changes. New tasks always
/// get `Some(now)`; `None` is tolerated when loading old save files and sorts
/// as "now" in the date view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub details: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Colors urgency in the list; nothing is scheduled off it.
    pub due_date: Option<chrono::NaiveDate>,
    pub completed: bool,
}

// ── Events ─────────────────────────────────────────────────────

/// What actually happened. Returned by every successful mutation so the UI
/// can react (move selection, log) without re-diffing the list.
/// Each event carries the revision it was applied at.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    TaskCreated { revision: u64, task: Task },
    TaskUpdated { revision: u64, task_id: Uuid },
    TaskToggled { revision: u64, task_id: Uuid, completed: bool },
    TaskDeleted { revision: u64, task_id: Uuid },
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StoreError {
    TaskNotFound,
    Persistence(PersistenceError),
}

impl From<PersistenceError> for StoreError {
    fn from(e: PersistenceError) -> Self {
        StoreError::Persistence(e)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound => write!(f, "task not found"),
            StoreError::Persistence(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ── The store ──────────────────────────────────────────────────

/// The authoritative task list. Lives in memory, loaded from redb on boot.
///
/// Every mutation persists to the save file FIRST and only touches the
/// in-memory list once the write committed — a failed write leaves both disk
/// and screen state exactly as they were. Successful mutations bump
/// `revision`, which is what makes `list()` a live query: a derived view
/// computed at revision N is stale whenever `revision() != N`.
pub struct TaskStore {
    tasks: Vec<Task>,
    revision: u64,
    save: SaveFile,
}

impl TaskStore {
    /// Load the store from an opened save file. Called once at boot.
    pub fn open(save: SaveFile) -> Result<Self, PersistenceError> {
        let mut tasks = save.load_tasks()?;
        // Store order is creation order; (created_at, id) reproduces it.
        tasks.sort_by_key(|t| (t.created_at, t.id));
        Ok(TaskStore {
            tasks,
            revision: 0,
            save,
        })
    }

    /// All tasks in store order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Create a task with a fresh id and timestamp, not completed.
    pub fn create(&mut self, title: String, details: String) -> Result<StoreEvent, StoreError> {
        let task = Task {
            id: Uuid::new_v4(),
            title,
            details,
            created_at: Some(Utc::now()),
            due_date: None,
            completed: false,
        };

        self.save.upsert_task(&task)?;

        self.revision += 1;
        let event = StoreEvent::TaskCreated {
            revision: self.revision,
            task: task.clone(),
        };
        self.tasks.push(task);
        Ok(event)
    }

    /// Replace a task's title and details. Identity and timestamp are kept.
    pub fn update(
        &mut self,
        id: Uuid,
        title: String,
        details: String,
    ) -> Result<StoreEvent, StoreError> {
        let idx = self.index_of(id)?;

        let mut updated = self.tasks[idx].clone();
        updated.title = title;
        updated.details = details;

        self.save.upsert_task(&updated)?;

        self.tasks[idx] = updated;
        self.revision += 1;
        Ok(StoreEvent::TaskUpdated {
            revision: self.revision,
            task_id: id,
        })
    }

    /// Flip a task's completion flag.
    pub fn toggle(&mut self, id: Uuid) -> Result<StoreEvent, StoreError> {
        let idx = self.index_of(id)?;

        let mut updated = self.tasks[idx].clone();
        updated.completed = !updated.completed;

        self.save.upsert_task(&updated)?;

        let completed = updated.completed;
        self.tasks[idx] = updated;
        self.revision += 1;
        Ok(StoreEvent::TaskToggled {
            revision: self.revision,
            task_id: id,
            completed,
        })
    }

    /// Remove a task for good.
    pub fn delete(&mut self, id: Uuid) -> Result<StoreEvent, StoreError> {
        let idx = self.index_of(id)?;

        self.save.remove_task(id)?;

        self.tasks.remove(idx);
        self.revision += 1;
        Ok(StoreEvent::TaskDeleted {
            revision: self.revision,
            task_id: id,
        })
    }

    fn index_of(&self, id: Uuid) -> Result<usize, StoreError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store(name: &str) -> (TaskStore, SaveFile, String) {
        let path = format!("/tmp/ticklist_test_store_{name}_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);
        let sf = SaveFile::open(&path).unwrap();
        let store = TaskStore::open(sf.clone()).unwrap();
        (store, sf, path)
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
    }

    fn created_id(event: &StoreEvent) -> Uuid {
        match event {
            StoreEvent::TaskCreated { task, .. } => task.id,
            _ => panic!("expected TaskCreated"),
        }
    }

    #[test]
    fn create_assigns_fresh_identity() {
        let (mut store, _, path) = temp_store("identity");

        let a = created_id(&store.create("one".into(), String::new()).unwrap());
        let b = created_id(&store.create("two".into(), String::new()).unwrap());
        assert_ne!(a, b);

        let task = store.get(a).unwrap();
        assert!(!task.completed);
        let age = Utc::now() - task.created_at.unwrap();
        assert!(age.num_seconds() < 5);

        cleanup(&path);
    }

    #[test]
    fn round_trip_survives_reload() {
        let (mut store, sf, path) = temp_store("round_trip");

        let id = created_id(
            &store
                .create("Buy milk".into(), "2% milk, 1 gallon".into())
                .unwrap(),
        );
        let stamp = store.get(id).unwrap().created_at;
        drop(store);

        // Reboot — same save file, fresh store
        let store = TaskStore::open(sf).unwrap();
        assert_eq!(store.list().len(), 1);
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.details, "2% milk, 1 gallon");
        assert_eq!(task.created_at, stamp);
        assert!(!task.completed);

        cleanup(&path);
    }

    #[test]
    fn reload_preserves_store_order() {
        let (mut store, sf, path) = temp_store("order");

        let ids: Vec<Uuid> = (0..3)
            .map(|i| created_id(&store.create(format!("task {i}"), String::new()).unwrap()))
            .collect();
        drop(store);

        let store = TaskStore::open(sf).unwrap();
        let reloaded: Vec<Uuid> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(reloaded, ids);

        cleanup(&path);
    }

    #[test]
    fn toggle_twice_restores_everything() {
        let (mut store, _, path) = temp_store("toggle");

        let id = created_id(&store.create("flip me".into(), "back and forth".into()).unwrap());
        let before = store.get(id).unwrap().clone();

        let event = store.toggle(id).unwrap();
        assert!(matches!(
            event,
            StoreEvent::TaskToggled { completed: true, .. }
        ));
        assert!(store.get(id).unwrap().completed);

        store.toggle(id).unwrap();
        let after = store.get(id).unwrap();
        assert!(!after.completed);
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.details, before.details);
        assert_eq!(after.created_at, before.created_at);

        cleanup(&path);
    }

    #[test]
    fn update_keeps_identity_and_timestamp() {
        let (mut store, _, path) = temp_store("update");

        let id = created_id(&store.create("A".into(), String::new()).unwrap());
        let stamp = store.get(id).unwrap().created_at;

        store.update(id, "B".into(), "now with details".into()).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.title, "B");
        assert_eq!(task.details, "now with details");
        assert_eq!(task.created_at, stamp);

        cleanup(&path);
    }

    #[test]
    fn delete_removes_from_disk() {
        let (mut store, sf, path) = temp_store("delete");

        let id = created_id(&store.create("doomed".into(), String::new()).unwrap());
        store.delete(id).unwrap();
        assert!(store.get(id).is_none());
        drop(store);

        let store = TaskStore::open(sf).unwrap();
        assert_eq!(store.list().len(), 0);

        cleanup(&path);
    }

    #[test]
    fn missing_task_is_not_a_persistence_error() {
        let (mut store, _, path) = temp_store("missing");

        let rev = store.revision();
        let err = store.toggle(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound));
        assert_eq!(store.revision(), rev); // nothing changed

        cleanup(&path);
    }

    #[test]
    fn revision_increments_on_every_mutation() {
        let (mut store, _, path) = temp_store("revision");
        assert_eq!(store.revision(), 0);

        let id = created_id(&store.create("tick".into(), String::new()).unwrap());
        assert_eq!(store.revision(), 1);

        store.toggle(id).unwrap();
        assert_eq!(store.revision(), 2);

        // Events carry the revision they were applied at.
        let event = store.update(id, "tock".into(), String::new()).unwrap();
        assert!(matches!(event, StoreEvent::TaskUpdated { revision: 3, .. }));

        let event = store.delete(id).unwrap();
        assert!(matches!(
            event,
            StoreEvent::TaskDeleted { revision: 4, task_id } if task_id == id
        ));
        assert_eq!(store.revision(), 4);

        cleanup(&path);
    }
}
