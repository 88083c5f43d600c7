//! Workflow status cards and performance charts.

use qflow_engine::{MetricsView, StatusCard};
use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::app::App;
use crate::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let error_height = if app.dashboard.error.is_some() { 3 } else { 0 };
    let [error_area, workflows_area, charts_area, summaries_area] = Layout::vertical([
        Constraint::Length(error_height),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Min(4),
    ])
    .areas(area);

    if let Some(error) = &app.dashboard.error {
        let widget = Paragraph::new(Span::styled(error.clone(), theme::error_style()))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(theme::error_style()));
        frame.render_widget(widget, error_area);
    }

    let loading = app.dashboard.is_loading();
    render_workflows(frame, app, workflows_area, loading);
    render_charts(frame, app.dashboard.metrics.as_ref(), app.dashboard.metrics_placeholder(), charts_area);
    render_summaries(frame, app.dashboard.metrics.as_ref(), summaries_area);
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(false))
        .title(Span::styled(title, theme::title_style()))
}

fn card_item(card: &StatusCard) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(format!("#{:<5}", card.workflow_id), theme::text_muted()),
        Span::styled(format!("{:<32}", card.name), theme::text_style()),
        Span::styled(card.status.clone(), theme::status_style(card.accent)),
    ]))
}

fn render_workflows(frame: &mut Frame, app: &App, area: Rect, loading: bool) {
    let title = if loading { " Workflows (loading…) " } else { " Workflows " };
    match (&app.dashboard.workflows, app.dashboard.workflows_placeholder()) {
        (_, Some(placeholder)) => {
            frame.render_widget(Paragraph::new(Span::styled(placeholder, theme::text_muted())).block(titled(title)), area);
        }
        (Some(cards), None) => {
            let items: Vec<ListItem> = cards.iter().map(card_item).collect();
            frame.render_widget(List::new(items).block(titled(title)), area);
        }
        (None, None) => frame.render_widget(titled(title), area),
    }
}

fn render_charts(frame: &mut Frame, metrics: Option<&MetricsView>, placeholder: Option<&'static str>, area: Rect) {
    let Some(view) = metrics else {
        frame.render_widget(titled(" Performance "), area);
        return;
    };
    if let Some(placeholder) = placeholder {
        frame.render_widget(
            Paragraph::new(Span::styled(placeholder, theme::text_muted())).block(titled(" Performance ")),
            area,
        );
        return;
    }

    let [runtime_area, shots_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    // Bars are integral; runtime is charted in milliseconds and labelled in seconds.
    let runtime_bars: Vec<Bar> = view
        .series
        .labels
        .iter()
        .zip(&view.series.runtime)
        .map(|(label, seconds)| {
            Bar::default()
                .value((seconds * 1000.0).round().max(0.0) as u64)
                .text_value(format!("{seconds:.2}s"))
                .label(Line::from(label.clone()))
        })
        .collect();
    let shots_bars: Vec<Bar> = view
        .series
        .labels
        .iter()
        .zip(&view.series.shots)
        .map(|(label, shots)| Bar::default().value(*shots).label(Line::from(label.clone())))
        .collect();

    let runtime_chart = BarChart::default()
        .block(titled(" Runtime (s) "))
        .data(BarGroup::default().bars(&runtime_bars))
        .bar_width(8)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .value_style(theme::text_style());
    let shots_chart = BarChart::default()
        .block(titled(" Shots "))
        .data(BarGroup::default().bars(&shots_bars))
        .bar_width(8)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::QUANTUM))
        .value_style(theme::text_style());

    frame.render_widget(runtime_chart, runtime_area);
    frame.render_widget(shots_chart, shots_area);
}

fn render_summaries(frame: &mut Frame, metrics: Option<&MetricsView>, area: Rect) {
    let lines: Vec<Line> = metrics
        .map(|view| {
            view.summaries
                .iter()
                .map(|summary| {
                    let mut spans = vec![Span::styled(format!("{}  ", summary.heading), theme::list_highlight_style())];
                    for line in &summary.lines {
                        spans.push(Span::styled(format!("{}: ", line.label), theme::text_muted()));
                        spans.push(Span::styled(format!("{}  ", line.value), theme::text_style()));
                    }
                    Line::from(spans)
                })
                .collect()
        })
        .unwrap_or_default();
    frame.render_widget(Paragraph::new(lines).block(titled(" Task Metrics ")), area);
}
