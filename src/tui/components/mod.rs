//! Widgets that make up the main screen
//!
//! Each component is a short-lived view over borrowed state, built every frame.

pub mod catalog;
pub mod help;
pub mod playground;
pub mod sidebar;
pub mod status;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::tui::{theme::Theme, Frame};

/// Base trait for all UI components
pub trait Component {
    /// Render the component
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// Create a centered rectangle with given percentage of the screen
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
