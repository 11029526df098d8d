//! ratatui rendering. Pure drawing — all state lives in `App`.

use crate::app::{App, Field, Screen, TaskForm};
use crate::view::{tone_for, RowTone};
use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    if let Screen::List = app.screen {
        draw_list(frame, app);
        return;
    }
    match &app.screen {
        Screen::Editor { form, .. } => draw_form(frame, form, "Edit Task", app.status.as_deref()),
        Screen::NewTask { form } => draw_form(frame, form, "New Task", app.status.as_deref()),
        Screen::List => {}
    }
}

// ── List screen ────────────────────────────────────────────────

fn draw_list(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!(
        "sort: {}   filter: {}",
        app.sort.label(),
        app.filter.label()
    ))
    .block(Block::default().title("To-Do List").borders(Borders::ALL))
    .style(Style::default().fg(Color::Cyan));
    frame.render_widget(header, chunks[0]);

    let today = Local::now().date_naive();
    let items: Vec<ListItem> = app
        .derived()
        .iter()
        .map(|task| {
            let mark = if task.completed { "[x]" } else { "[ ]" };
            let title = if task.title.is_empty() {
                "(no title)"
            } else {
                task.title.as_str()
            };
            let mut line = format!("{mark} {title}");
            if let Some(due) = task.due_date {
                line.push_str(&format!("  · due {due}"));
            }

            let style = match tone_for(task, today) {
                RowTone::Muted => Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
                RowTone::Urgent => Style::default().fg(Color::Red),
                RowTone::Normal => Style::default().fg(Color::Green),
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let count = items.len();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Tasks ({count})"))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");
    frame.render_stateful_widget(list, chunks[1], &mut app.list_state);

    let help = "j/k: move  Space: toggle  Enter: edit  a: add  d: delete  \
                s: sort  f: filter  q: quit";
    draw_footer(frame, chunks[2], help, app.status.as_deref());
}

// ── Form screens ───────────────────────────────────────────────

fn draw_form(frame: &mut Frame, form: &TaskForm, title: &str, status: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(
        field_widget(&form.title, "Title", title, form.focus == Field::Title),
        chunks[0],
    );
    frame.render_widget(
        field_widget(&form.details, "Details", title, form.focus == Field::Details),
        chunks[1],
    );

    let help = "Tab: switch field  Enter: save  Esc: back";
    draw_footer(frame, chunks[2], help, status);
}

fn field_widget<'a>(text: &'a str, name: &'a str, screen: &str, focused: bool) -> Paragraph<'a> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label = if focused {
        format!("{screen} — {name}")
    } else {
        name.to_string()
    };
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(label).borders(Borders::ALL).border_style(border))
}

// ── Footer ─────────────────────────────────────────────────────

/// Help line, replaced by the status notification when there is one.
fn draw_footer(frame: &mut Frame, area: Rect, help: &str, status: Option<&str>) {
    let footer = match status {
        Some(msg) => Paragraph::new(msg.to_string())
            .block(Block::default().title("Status").borders(Borders::ALL))
            .style(Style::default().fg(Color::Red)),
        None => Paragraph::new(help)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .style(Style::default().fg(Color::Yellow)),
    };
    frame.render_widget(footer, area);
}
