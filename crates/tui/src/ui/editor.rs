//! Workflow editor: name, ordered task list and the selected task's config.

use qflow_types::{Task, TaskConfig};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use serde_json::Value;

use crate::app::{App, EditorMode};
use crate::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [name_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(area);
    let [tasks_area, config_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(main_area);

    render_name(frame, app, name_area);
    render_tasks(frame, app, tasks_area);
    render_config(frame, app, config_area);
    render_status(frame, app, status_area);
}

fn render_name(frame: &mut Frame, app: &App, area: Rect) {
    let (text, editing) = match &app.mode {
        EditorMode::EditName { buffer } => (format!("{buffer}▏"), true),
        _ if app.draft.name.is_empty() => ("(unnamed, press n)".to_string(), false),
        _ => (app.draft.name.clone(), false),
    };
    let style = if editing { theme::highlight_style() } else { theme::text_style() };
    let widget = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_style(editing))
            .title(Span::styled(" Workflow Name ", theme::title_style())),
    );
    frame.render_widget(widget, area);
}

fn task_line(index: usize, task: &Task) -> Line<'static> {
    let summary = match &task.config {
        TaskConfig::Classical(config) => format!("{} ({} values)", config.operation, config.data.len()),
        TaskConfig::Quantum(config) => format!("{} × {} on {}", config.circuit, config.shots, config.backend),
    };
    Line::from(vec![
        Span::styled(format!("{:>2}. ", index + 1), theme::text_muted()),
        Span::styled(format!("{:<9}", task.kind().as_str()), theme::kind_style(task.kind())),
        Span::styled(format!("{:<8} ", task.id.as_str()), theme::text_muted()),
        Span::styled(summary, theme::text_style()),
    ])
}

fn render_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let dragging = match app.mode {
        EditorMode::Dragging { source } => Some(source),
        _ => None,
    };
    let items: Vec<ListItem> = app
        .draft
        .tasks
        .tasks()
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let item = ListItem::new(task_line(index, task));
            if dragging == Some(index) {
                item.style(theme::highlight_style())
            } else {
                item
            }
        })
        .collect();
    let title = match dragging {
        Some(source) => format!(" Tasks (moving #{}) ", source + 1),
        None => " Tasks ".to_string(),
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border_style(dragging.is_some()))
                .title(Span::styled(title, theme::title_style())),
        )
        .highlight_style(theme::list_highlight_style())
        .highlight_symbol(if dragging.is_some() { "⇅ " } else { "› " });

    let mut state = ListState::default();
    if !app.draft.tasks.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_config(frame: &mut Frame, app: &App, area: Rect) {
    let editing = match &app.mode {
        EditorMode::EditField { field_index, buffer } => Some((*field_index, buffer.as_str())),
        _ => None,
    };
    let lines: Vec<Line> = match app.selected_task() {
        None => vec![Line::styled("No task selected", theme::text_muted())],
        Some(task) => app
            .selected_fields()
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let (value, style) = match editing {
                    Some((active, buffer)) if active == index => (format!("{buffer}▏"), theme::highlight_style()),
                    _ => (
                        match task.config.field(*field) {
                            Some(Value::String(text)) => text,
                            Some(other) => other.to_string(),
                            None => String::new(),
                        },
                        theme::text_style(),
                    ),
                };
                Line::from(vec![
                    Span::styled(format!("{:<10}", field.as_str()), theme::title_style()),
                    Span::styled(value, style),
                ])
            })
            .collect(),
    };
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_style(editing.is_some()))
            .title(Span::styled(" Config ", theme::title_style())),
    );
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let style = match app.submission.state() {
        qflow_engine::SubmissionState::Success { .. } if app.notice.is_none() => Style::default().fg(theme::OK),
        qflow_engine::SubmissionState::Submitting { .. } if app.notice.is_none() => theme::text_muted(),
        _ => theme::error_style(),
    };
    let text = app.status_line().unwrap_or_default();
    let widget = Paragraph::new(Span::styled(text, style))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(theme::border_style(false)));
    frame.render_widget(widget, area);
}
