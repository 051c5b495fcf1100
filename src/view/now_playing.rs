//! Artwork tile and track metadata

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{NowPlayingInfo, Track};
use super::utils::truncate_string;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtworkSize {
    /// Decode at the source image's own dimensions
    Original,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtworkScale {
    Fit,
}

/// How the remote artwork for a track is loaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtworkRequest {
    pub uri: String,
    pub crossfade: bool,
    pub size: ArtworkSize,
    pub scale: ArtworkScale,
    pub allow_hardware: bool,
}

impl ArtworkRequest {
    pub fn for_track(track: &Track) -> Self {
        Self {
            uri: track.artwork_uri.clone(),
            crossfade: true,
            size: ArtworkSize::Original,
            scale: ArtworkScale::Fit,
            allow_hardware: false,
        }
    }
}

pub fn render_now_playing(frame: &mut Frame, area: Rect, info: &NowPlayingInfo) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Artwork
            Constraint::Percentage(60), // Metadata
        ])
        .split(area);

    render_artwork(frame, chunks[0], &ArtworkRequest::for_track(&info.track));
    render_metadata(frame, chunks[1], info);
}

// Terminals cannot draw the bitmap, so the tile describes the request instead.
fn render_artwork(frame: &mut Frame, area: Rect, request: &ArtworkRequest) {
    let dim = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled("♫", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(format!("Image:{}", request.uri), dim)),
        Line::from(Span::styled(
            format!(
                "{:?} size, {:?} scale, crossfade {}",
                request.size,
                request.scale,
                if request.crossfade { "on" } else { "off" }
            ),
            dim,
        )),
    ];

    let artwork = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Artwork ")
                .padding(Padding::uniform(1)),
        );
    frame.render_widget(artwork, area);
}

fn render_metadata(frame: &mut Frame, area: Rect, info: &NowPlayingInfo) {
    let width = area.width.saturating_sub(4) as usize;
    let label = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(Span::styled(truncate_string(&format!("Title: {}", info.track.title), width), label)),
        Line::from(Span::styled(
            truncate_string(&format!("Artist: {}", info.track.artist), width),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Track {} of {}", info.projection.current_index + 1, info.queue_len),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let metadata = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Now Playing ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(metadata, area);
}
