//! Colors and styles for the qflow TUI.
//!
//! A dark theme with a single blue accent; quantum tasks and completed
//! workflows get their own tint so they stand out in lists.

use qflow_engine::StatusAccent;
use qflow_types::TaskKind;
use ratatui::style::{Color, Modifier, Style};

/// Accent color for highlights and focus indicators.
pub const ACCENT: Color = Color::Rgb(8, 171, 237);

/// Primary foreground color for normal text.
pub const FG: Color = Color::Rgb(224, 224, 230);

/// Muted foreground color for hints, labels and secondary information.
pub const FG_MUTED: Color = Color::Rgb(168, 168, 175);

pub const BORDER: Color = Color::Rgb(72, 72, 80);
pub const BORDER_FOCUS: Color = ACCENT;

pub const BG_HIGHLIGHT: Color = Color::Rgb(20, 32, 44);

/// Error states and validation failures.
pub const WARN: Color = Color::Rgb(220, 96, 110);

pub const OK: Color = Color::Rgb(98, 196, 124);

pub const QUANTUM: Color = Color::Rgb(178, 132, 238);

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BORDER_FOCUS)
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn title_style() -> Style {
    Style::default().fg(FG_MUTED).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn text_muted() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Focused input rows.
pub fn highlight_style() -> Style {
    Style::default().fg(FG).bg(BG_HIGHLIGHT)
}

/// Selected list items: accent + bold, no fill.
pub fn list_highlight_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(WARN)
}

pub fn kind_style(kind: TaskKind) -> Style {
    match kind {
        TaskKind::Classical => text_style(),
        TaskKind::Quantum => Style::default().fg(QUANTUM),
    }
}

pub fn status_style(accent: StatusAccent) -> Style {
    match accent {
        StatusAccent::Completed => Style::default().fg(OK).add_modifier(Modifier::BOLD),
        StatusAccent::Other => text_muted(),
    }
}
