//! Chat area
//!
//! Displays the room history, newest at the bottom.

use chrono::TimeZone;
use huddle_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Format epoch milliseconds as `HH:MM` in `zone`.
///
/// Timestamps outside chrono's range render as `--:--`.
pub fn format_clock<Tz>(epoch_millis: u64, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    i64::try_from(epoch_millis)
        .ok()
        .and_then(|ms| zone.timestamp_millis_opt(ms).single())
        .map_or_else(|| "--:--".to_string(), |time| time.format("%H:%M").to_string())
}

/// Render the chat area, stamping messages in `zone`.
pub fn render<Tz>(frame: &mut Frame, app: &App, area: Rect, zone: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let block = Block::default().borders(Borders::ALL).title(" Huddle ");

    let items: Vec<ListItem> = if app.messages().is_empty() {
        let hint = if app.user_name().is_some() {
            "No messages yet"
        } else {
            "Enter a display name to join the room"
        };
        vec![ListItem::new(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))]
    } else {
        app.messages()
            .iter()
            .map(|msg| {
                let color = if app.is_mine(msg) { Color::Green } else { Color::Cyan };

                ListItem::new(Line::from(vec![
                    Span::styled(format_clock(msg.timestamp, zone), Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::styled(
                        msg.sender.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(": "),
                    Span::raw(msg.text.clone()),
                ]))
            })
            .collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}
