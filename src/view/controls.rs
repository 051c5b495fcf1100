//! Control buttons

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::{ControlButton, NowPlayingInfo, UiState};

pub fn render_controls(frame: &mut Frame, area: Rect, info: &NowPlayingInfo, ui_state: &UiState) {
    let play_label = if info.projection.is_playing { "⏸ Pause" } else { "▶ Play" };
    let favorite_label = ui_state
        .custom_button_label
        .as_deref()
        .map(|label| format!("♥ {}", label))
        .unwrap_or_else(|| "♥".to_string());

    let buttons = [
        (ControlButton::Previous, "⏮ Prev".to_string()),
        (ControlButton::PlayPause, play_label.to_string()),
        (ControlButton::Next, "Next ⏭".to_string()),
        (ControlButton::Favorite, favorite_label),
    ];

    let mut spans = Vec::with_capacity(buttons.len() * 2);
    for (button, label) in buttons {
        let style = if !info.controller_connected {
            Style::default().fg(Color::DarkGray)
        } else if button == ui_state.focused {
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw("   "));
    }
    spans.pop();

    let title = if info.controller_connected { " Controls " } else { " Controls (connecting...) " };
    let controls = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(controls, area);
}
