use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::{centered_rect, Component};
use crate::{
    tui::{keys::KeyMap, theme::Theme, Frame},
    version,
};

/// Key reference shown over everything else
pub struct HelpOverlay<'a> {
    pub keys: &'a KeyMap,
}

impl Component for HelpOverlay<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let help_area = centered_rect(60, 70, area);

        let mut lines = vec![
            Line::styled(
                format!("{} {}", version::DISPLAY_NAME, version::display_version()),
                theme.heading_style(),
            ),
            Line::default(),
        ];
        lines.extend(self.keys.help_lines().into_iter().map(|(key, description)| {
            Line::from(vec![
                Span::styled(format!("{:>8}  ", key), theme.accent_style()),
                Span::styled(description, theme.text_style()),
            ])
        }));
        lines.push(Line::default());
        lines.push(Line::styled(
            "Arrows or j/k move, Enter selects. Press any key to close.",
            theme.dim_style(),
        ));

        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(theme.border_style(true))
                .style(theme.base_style()),
        );

        frame.render_widget(Clear, help_area);
        frame.render_widget(help, help_area);
    }
}
