//! Top status bar: runner state, the active notification and the session id

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::ServiceStatus;
use crate::service::RunnerState;

pub fn render_status_bar(frame: &mut Frame, area: Rect, service: &ServiceStatus) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28), // Runner state
            Constraint::Min(0),     // Notification
            Constraint::Length(26), // Session
        ])
        .split(area);

    let (state_text, state_color) = match service.runner {
        RunnerState::Running if service.foreground => ("● Running (foreground)", Color::Green),
        RunnerState::Running => ("● Running", Color::Yellow),
        RunnerState::Starting => ("◌ Starting", Color::Yellow),
        RunnerState::Stopped => ("○ Stopped", Color::Red),
    };

    let runner = Paragraph::new(state_text)
        .style(Style::default().fg(state_color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Service ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(runner, chunks[0]);

    let notification_text = match &service.notification {
        Some(title) => format!("🔔 {}", title),
        None => "No notification".to_string(),
    };
    let notification = Paragraph::new(notification_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Notification "));
    frame.render_widget(notification, chunks[1]);

    let (session_text, session_color) = match &service.session_id {
        Some(id) => (id.as_str(), Color::White),
        None => ("No session", Color::DarkGray),
    };
    let session = Paragraph::new(session_text)
        .style(Style::default().fg(session_color))
        .block(Block::default().borders(Borders::ALL).title(" Session "));
    frame.render_widget(session, chunks[2]);
}
