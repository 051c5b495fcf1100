//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::NowPlayingInfo;
use super::utils::format_percent;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, info: &NowPlayingInfo) {
    let status_text = if info.projection.is_playing {
        format!(" ▶ {} | {} ", info.track.title, info.track.artist)
    } else {
        format!(" ⏸  {} | {} ", info.track.title, info.track.artist)
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(status_text))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(f64::from(info.projection.progress).clamp(0.0, 1.0))
        .label(format_percent(info.projection.progress));

    frame.render_widget(gauge, area);
}
