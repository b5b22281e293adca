use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::time::{Duration, Instant};

use super::Component;
use crate::tui::{theme::Theme, Frame};

/// How long an announcement stays in the status bar
pub const STATUS_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A transient announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, kind: StatusKind, now: Instant) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at: now,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= STATUS_DURATION
    }
}

/// Bottom line: announcement on the left, provider and hints on the right
pub struct StatusBar<'a> {
    pub message: Option<&'a StatusMessage>,
    pub provider: &'a str,
    pub busy: bool,
}

impl Component for StatusBar<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(40)])
            .split(area);

        let left = match self.message {
            Some(message) => {
                let style = match message.kind {
                    StatusKind::Info => theme.status_bar_style(),
                    StatusKind::Success => theme.status_bar_style().patch(theme.success_style()),
                    StatusKind::Error => theme.status_bar_style().patch(theme.error_style()),
                };
                Line::styled(format!(" {}", message.text), style)
            }
            None => Line::styled(" Ready", theme.status_bar_style()),
        };
        frame.render_widget(Paragraph::new(left).style(theme.status_bar_style()), chunks[0]);

        let mut right = vec![Span::styled(self.provider.to_string(), theme.tag_style())];
        if self.busy {
            right.push(Span::styled(" ● busy", theme.warning_style()));
        }
        right.push(Span::styled("  F1 help  Ctrl+C quit ", theme.dim_style()));
        let right = Paragraph::new(Line::from(right))
            .alignment(Alignment::Right)
            .style(theme.status_bar_style());
        frame.render_widget(right, chunks[1]);
    }
}
