//! The derived view: sorted/filtered projection of the store, plus the row
//! tone policy. Pure functions only — the app recomputes this whenever the
//! store revision moves.

use crate::store::Task;
use chrono::{NaiveDate, Utc};

// ── View modes ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    ByDate,
    ByStatus,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::ByDate => SortOrder::ByStatus,
            SortOrder::ByStatus => SortOrder::ByDate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::ByDate => "date",
            SortOrder::ByStatus => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStatus {
    #[default]
    All,
    Completed,
    NotCompleted,
}

impl FilterStatus {
    pub fn cycled(self) -> Self {
        match self {
            FilterStatus::All => FilterStatus::Completed,
            FilterStatus::Completed => FilterStatus::NotCompleted,
            FilterStatus::NotCompleted => FilterStatus::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterStatus::All => "all",
            FilterStatus::Completed => "completed",
            FilterStatus::NotCompleted => "not completed",
        }
    }

    fn keeps(self, task: &Task) -> bool {
        match self {
            FilterStatus::All => true,
            FilterStatus::Completed => task.completed,
            FilterStatus::NotCompleted => !task.completed,
        }
    }
}

// ── Projection ─────────────────────────────────────────────────

/// Sort then filter. Both sorts are stable, so ties keep store order, and
/// filtering after sorting commutes with sorting after filtering.
pub fn derived_view(tasks: &[Task], sort: SortOrder, filter: FilterStatus) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks.iter().collect();

    match sort {
        SortOrder::ByDate => {
            // A missing timestamp sorts as "now", i.e. after everything
            // created earlier.
            let now = Utc::now();
            view.sort_by_key(|t| t.created_at.unwrap_or(now));
        }
        SortOrder::ByStatus => view.sort_by_key(|t| t.completed),
    }

    view.retain(|t| filter.keeps(t));
    view
}

// ── Row tone ───────────────────────────────────────────────────

/// Display-only urgency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    /// Completed, regardless of due date.
    Muted,
    /// Open and due today or tomorrow.
    Urgent,
    Normal,
}

pub fn tone_for(task: &Task, today: NaiveDate) -> RowTone {
    if task.completed {
        return RowTone::Muted;
    }
    match task.due_date {
        Some(due) if due == today || Some(due) == today.succ_opt() => RowTone::Urgent,
        _ => RowTone::Normal,
    }
}

// ── Tests ──────────────────────────────────────────────────────
