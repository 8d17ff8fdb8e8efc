//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod status;

use chrono::{Local, TimeZone};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};

pub use chat::format_clock;

use crate::{App, Phase};

/// Render the entire UI with message times in the local zone.
pub fn render(frame: &mut Frame, app: &App) {
    render_in(frame, app, &Local);
}

/// Render the entire UI with message times in `zone`.
pub fn render_in<Tz>(frame: &mut Frame, app: &App, zone: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    const CHAT_AREA_MIN_HEIGHT: u16 = 3;
    const TYPING_HEIGHT: u16 = 1;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CHAT_AREA_MIN_HEIGHT),
            Constraint::Length(TYPING_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [chat_area, typing_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, app, *chat_area, zone);
    if app.phase() == Phase::Chat {
        let typing = Paragraph::new(format!(" {}", app.typing_line()))
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
        frame.render_widget(typing, *typing_area);
    }
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
}
