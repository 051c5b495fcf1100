//! Utility functions for rendering UI components

use ratatui::layout::Rect;

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

pub fn format_percent(progress: f32) -> String {
    format!("{:.0}%", (progress * 100.0).clamp(0.0, 100.0))
}

/// Popup rectangle centered in `area`, shrunk to fit.
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_string("Item_10", 10), "Item_10   ");
        assert_eq!(truncate_string("Sunflower from Silesia", 10), "Sunflow...");
    }

    #[test]
    fn popup_fits_small_screens() {
        let popup = centered_popup(Rect::new(0, 0, 30, 10), 62, 20);
        assert_eq!((popup.width, popup.height), (26, 6));
        assert_eq!((popup.x, popup.y), (2, 2));
    }
}
