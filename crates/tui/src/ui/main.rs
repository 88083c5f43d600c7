use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::app::{App, EditorMode, View};
use crate::theme;

/// Renders the whole frame: view tabs, the active view, and the key hints.
pub fn draw(frame: &mut Frame, app: &App) {
    let [tabs_area, body_area, hints_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_tabs(frame, app, tabs_area);
    match app.view {
        View::Editor => super::editor::render(frame, app, body_area),
        View::Dashboard => super::dashboard::render(frame, app, body_area),
    }
    render_hints(frame, app, hints_area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let selected = match app.view {
        View::Editor => 0,
        View::Dashboard => 1,
    };
    let tabs = Tabs::new(vec!["Workflow Editor", "Dashboard"])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border_style(false))
                .title(Span::styled(" qflow ", theme::title_style())),
        )
        .style(theme::text_muted())
        .highlight_style(theme::list_highlight_style())
        .select(selected);
    frame.render_widget(tabs, area);
}

fn hints_for(app: &App) -> &'static [(&'static str, &'static str)] {
    match (app.view, &app.mode) {
        (View::Dashboard, _) => &[("Tab", " editor  "), ("r", " refresh  "), ("q", " quit")],
        (View::Editor, EditorMode::Browse) => &[
            ("Tab", " dashboard  "),
            ("n", " name  "),
            ("c/u", " add classical/quantum  "),
            ("e", " edit  "),
            ("Space", " move  "),
            ("s", " submit  "),
            ("q", " quit"),
        ],
        (View::Editor, EditorMode::EditName { .. }) => &[("Enter", " save  "), ("Esc", " cancel")],
        (View::Editor, EditorMode::EditField { .. }) => &[("Tab", " next field  "), ("Enter", " save  "), ("Esc", " cancel")],
        (View::Editor, EditorMode::Dragging { .. }) => &[("↑/↓", " choose slot  "), ("Space", " drop  "), ("Esc", " cancel")],
    }
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let spans: Vec<Span> = hints_for(app)
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, theme::list_highlight_style()),
                Span::styled(*label, theme::text_muted()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
