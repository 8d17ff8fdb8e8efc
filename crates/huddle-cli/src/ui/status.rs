//! Status bar
//!
//! Displays connection state, the local name, and the latest status.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{App, ConnectionState};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mut info = String::new();
    if let Some(name) = app.user_name() {
        info.push_str(" | ");
        info.push_str(name);
    }
    if let Some(status) = app.status_message() {
        info.push_str(" | ");
        info.push_str(status);
    }

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::styled(info, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
