//! UI state machine: one list screen plus two modal form screens.
//!
//! All store mutations happen synchronously inside the key handler; the frame
//! drawn right after reflects the new derived view, so every write produces
//! exactly one re-render before the next interaction.

use crate::store::{StoreError, StoreEvent, TaskStore};
use crate::view::{derived_view, FilterStatus, SortOrder};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::ListState;
use uuid::Uuid;

// ── Forms ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Details,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Title => Field::Details,
            Field::Details => Field::Title,
        }
    }
}

/// Local edit buffers for the editor and new-task screens. Holds no store
/// reference — nothing is written until the form is submitted.
#[derive(Debug, Default)]
pub struct TaskForm {
    pub title: String,
    pub details: String,
    pub focus: Field,
}

/// Tagged outcome of a form screen. Submitting with both fields empty is a
/// valid submission, distinct from cancelling.
#[derive(Debug, PartialEq, Eq)]
pub enum FormOutcome {
    Cancelled,
    Submitted { title: String, details: String },
}

impl TaskForm {
    fn with(title: String, details: String) -> Self {
        TaskForm {
            title,
            details,
            focus: Field::Title,
        }
    }

    fn active_buffer(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Details => &mut self.details,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<FormOutcome> {
        match key.code {
            KeyCode::Esc => Some(FormOutcome::Cancelled),
            KeyCode::Enter => Some(FormOutcome::Submitted {
                title: self.title.clone(),
                details: self.details.clone(),
            }),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::Backspace => {
                self.active_buffer().pop();
                None
            }
            KeyCode::Char(c) => {
                self.active_buffer().push(c);
                None
            }
            _ => None,
        }
    }
}

// ── Screens ────────────────────────────────────────────────────

pub enum Screen {
    List,
    /// Editing one existing task. The form was loaded from the task once on
    /// open; it does not track later store changes.
    Editor { task_id: Uuid, form: TaskForm },
    NewTask { form: TaskForm },
}

// ── App ────────────────────────────────────────────────────────

pub struct App {
    pub store: TaskStore,
    pub screen: Screen,
    pub sort: SortOrder,
    pub filter: FilterStatus,
    pub list_state: ListState,
    /// Transient notification, shown in the footer until the next keypress.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let mut list_state = ListState::default();
        if !store.list().is_empty() {
            list_state.select(Some(0));
        }
        App {
            store,
            screen: Screen::List,
            sort: SortOrder::default(),
            filter: FilterStatus::default(),
            list_state,
            status: None,
            should_quit: false,
        }
    }

    /// The sorted/filtered projection currently on screen.
    pub fn derived(&self) -> Vec<&crate::store::Task> {
        derived_view(self.store.list(), self.sort, self.filter)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status = None;

        match self.screen {
            Screen::List => self.on_list_key(key),
            Screen::NewTask { .. } => self.on_new_task_key(key),
            Screen::Editor { .. } => self.on_editor_key(key),
        }
    }

    // ── List screen ────────────────────────────────────────────

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('s') => {
                self.sort = self.sort.toggled();
                self.clamp_selection();
            }
            KeyCode::Char('f') => {
                self.filter = self.filter.cycled();
                self.clamp_selection();
            }
            KeyCode::Char('a') => {
                self.screen = Screen::NewTask {
                    form: TaskForm::default(),
                };
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Enter => self.open_editor(),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let len = self.derived().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        let len = self.derived().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Id of the task displayed at the selected position.
    fn selected_id(&self) -> Option<Uuid> {
        let view = self.derived();
        self.list_state
            .selected()
            .and_then(|i| view.get(i))
            .map(|t| t.id)
    }

    /// Move the selection to wherever `id` now sits in the derived view,
    /// falling back to a clamped index if it was filtered out.
    fn select_task(&mut self, id: Uuid) {
        let pos = self.derived().iter().position(|t| t.id == id);
        match pos {
            Some(i) => self.list_state.select(Some(i)),
            None => self.clamp_selection(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.derived().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            None => self.list_state.select(Some(0)),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.toggle(id) {
            // Selection follows the task's identity across the re-sort.
            Ok(_) => self.select_task(id),
            Err(e) => self.fail("toggle", e),
        }
    }

    /// Delete what is displayed at the selected position. The derived-view
    /// index is resolved to the task's id first — never a raw store index.
    fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.delete(id) {
            Ok(_) => self.clamp_selection(),
            Err(e) => self.fail("delete", e),
        }
    }

    fn open_editor(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some((title, details)) = self
            .store
            .get(id)
            .map(|t| (t.title.clone(), t.details.clone()))
        else {
            return;
        };
        // One-time load; edits live in the form until Save.
        self.screen = Screen::Editor {
            task_id: id,
            form: TaskForm::with(title, details),
        };
    }

    // ── New-task screen ────────────────────────────────────────

    fn on_new_task_key(&mut self, key: KeyEvent) {
        let outcome = match &mut self.screen {
            Screen::NewTask { form } => form.handle_key(key),
            _ => return,
        };
        match outcome {
            None => {}
            Some(FormOutcome::Cancelled) => self.screen = Screen::List,
            Some(FormOutcome::Submitted { title, details }) => {
                match self.store.create(title, details) {
                    Ok(event) => {
                        self.screen = Screen::List;
                        if let StoreEvent::TaskCreated { task, .. } = event {
                            self.select_task(task.id);
                        }
                    }
                    // Stay on the form; nothing was written.
                    Err(e) => self.fail("add task", e),
                }
            }
        }
    }

    // ── Editor screen ──────────────────────────────────────────

    fn on_editor_key(&mut self, key: KeyEvent) {
        let (task_id, outcome) = match &mut self.screen {
            Screen::Editor { task_id, form } => (*task_id, form.handle_key(key)),
            _ => return,
        };
        match outcome {
            None => {}
            // Navigating back without Save discards the buffers.
            Some(FormOutcome::Cancelled) => self.screen = Screen::List,
            Some(FormOutcome::Submitted { title, details }) => {
                match self.store.update(task_id, title, details) {
                    Ok(_) => self.screen = Screen::List,
                    Err(e) => self.fail("save", e),
                }
            }
        }
    }

    // ── Errors ─────────────────────────────────────────────────

    /// Recoverable failure: log it, tell the user, change nothing else.
    fn fail(&mut self, what: &str, err: StoreError) {
        tracing::warn!(error = %err, "{what} failed");
        self.status = Some(format!("{what} failed: {err}"));
    }
}

// ── Tests ──────────────────────────────────────────────────────
