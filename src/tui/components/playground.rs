//! The side panel: prompt generator and chat assistant

use rand::seq::SliceRandom;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::Component;
use crate::{
    session::{ChatRole, PanelMode, SessionState},
    tui::{input::TextInput, markdown::MarkdownRenderer, theme::Theme, Frame},
};

/// Clipboard indicator key for the generated response
pub const RESPONSE_COPY_KEY: &str = "response";

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub const MOTIVATIONAL_QUOTES: [&str; 8] = [
    "Creativity takes courage. - Henri Matisse",
    "The art of simplicity is a puzzle of complexity. - Douglas Horton",
    "Design is not just what it looks like, it is how it works. - Steve Jobs",
    "Quality is not an act, it is a habit. - Aristotle",
    "Simplicity is the ultimate sophistication. - Leonardo da Vinci",
    "Every great design begins with an even better story. - Lorinda Mamo",
    "Innovation distinguishes between a leader and a follower. - Steve Jobs",
    "Code is poetry. - WordPress",
];

/// A quote for a freshly opened panel
pub fn random_quote() -> &'static str {
    MOTIVATIONAL_QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOTIVATIONAL_QUOTES[0])
}

/// Rows `lines` occupy once wrapped to `width` columns
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

/// Scroll offset that keeps the bottom of `lines` visible
fn tail_scroll(lines: &[Line<'_>], area: Rect) -> u16 {
    wrapped_height(lines, area.width).saturating_sub(area.height)
}

pub struct Playground<'a> {
    pub state: &'a SessionState,
    pub draft: &'a TextInput,
    pub chat_input: &'a TextInput,
    pub focused: bool,
    pub quote: &'a str,
    pub model: &'a str,
    pub copied: Option<&'a str>,
    /// Advances on every tick while something is in flight
    pub frame_count: usize,
}

impl Playground<'_> {
    fn spinner(&self) -> &'static str {
        SPINNER[self.frame_count % SPINNER.len()]
    }

    fn inner_block<'b>(&self, title: &'b str, focused: bool, theme: &Theme) -> Block<'b> {
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(theme.border_style(focused))
    }

    fn render_editor(&self, input: &TextInput, area: Rect, frame: &mut Frame, title: &str, theme: &Theme) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let (cursor_line, _) = input.cursor();
        let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1));

        let lines: Vec<Line> = input
            .lines()
            .iter()
            .map(|l| Line::styled(l.clone(), theme.text_style()))
            .collect();
        let editor = Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .block(self.inner_block(title, self.focused, theme));
        frame.render_widget(editor, area);

        if self.focused {
            let x = area.x + 1 + input.cursor_display_column() as u16;
            let y = area.y + 1 + (cursor_line - scroll) as u16;
            frame.set_cursor(x.min(area.right().saturating_sub(2)), y);
        }
    }

    fn render_generator(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Percentage(40),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(area);

        let quote = Paragraph::new(Line::styled(
            self.quote.to_string(),
            theme.dim_style().add_modifier(Modifier::ITALIC),
        ));
        frame.render_widget(quote, rows[0]);

        self.render_editor(self.draft, rows[1], frame, " Prompt (Ctrl+R to run) ", theme);

        let block = self.inner_block(" Response ", false, theme);
        let inner = block.inner(rows[2]);
        frame.render_widget(block, rows[2]);

        let lines = if self.state.loading {
            vec![Line::from(vec![
                Span::styled(format!("{} ", self.spinner()), theme.accent_style()),
                Span::styled("Generative AI is processing. Please wait.", theme.dim_style()),
            ])]
        } else if let Some(response) = &self.state.response {
            MarkdownRenderer::new(theme).render(response)
        } else {
            vec![Line::styled(
                "Edit the prompt, then press Ctrl+R to generate.",
                theme.dim_style(),
            )]
        };
        let response = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(response, inner);

        let mut footer = vec![
            Span::styled(self.model.to_string(), theme.tag_style()),
            Span::raw("  "),
        ];
        if self.state.response.is_some() {
            if self.copied == Some(RESPONSE_COPY_KEY) {
                footer.push(Span::styled("✓ Copied!", theme.success_style()));
            } else {
                footer.push(Span::styled("Ctrl+Y", theme.accent_style()));
                footer.push(Span::styled(" copy response", theme.dim_style()));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), rows[3]);
    }

    fn chat_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let turns = self.state.history.turns();
        if turns.is_empty() {
            return vec![
                Line::styled("PM Genius assistant", theme.heading_style()),
                Line::styled(
                    "Ask about planning, Scrum ceremonies, SAFe, Jira automation or team roles.",
                    theme.dim_style(),
                ),
            ];
        }

        let renderer = MarkdownRenderer::new(theme);
        let mut lines = Vec::new();
        for (i, turn) in turns.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            match turn.role {
                ChatRole::User => {
                    lines.push(Line::styled("You", theme.accent_style()));
                    lines.extend(
                        turn.text
                            .lines()
                            .map(|l| Line::styled(l.to_string(), theme.text_style())),
                    );
                }
                ChatRole::Model => {
                    lines.push(Line::styled("PM Genius", theme.tag_style().add_modifier(Modifier::BOLD)));
                    if turn.text.is_empty() && self.state.streaming {
                        lines.push(Line::styled(format!("{} thinking…", self.spinner()), theme.dim_style()));
                    } else {
                        lines.extend(renderer.render(&turn.text));
                    }
                }
            }
        }
        lines
    }

    fn render_chat(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let lines = self.chat_lines(theme);
        let scroll = tail_scroll(&lines, rows[0]);
        let history = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(history, rows[0]);

        let title = if self.state.streaming {
            " Message (waiting for reply) "
        } else {
            " Message (Enter to send) "
        };
        self.render_editor(self.chat_input, rows[1], frame, title, theme);

        let stats = self.state.history.stats();
        let footer = Line::from(vec![
            Span::styled(self.model.to_string(), theme.tag_style()),
            Span::styled(
                format!("  {} messages  Ctrl+L clear", stats.total_turns),
                theme.dim_style(),
            ),
        ]);
        frame.render_widget(Paragraph::new(footer), rows[2]);
    }
}

impl Component for Playground<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = match (self.state.mode, &self.state.selected_item) {
            (PanelMode::Chat, _) => " Chat ".to_string(),
            (PanelMode::Generator, Some(item)) => format!(" Playground · {} ", item.title),
            (PanelMode::Generator, None) => " Playground ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(theme.heading_style())
            .border_style(theme.border_style(self.focused))
            .style(theme.base_style());
        let inner = block.inner(area);

        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        match self.state.mode {
            PanelMode::Generator => self.render_generator(frame, inner, theme),
            PanelMode::Chat => self.render_chat(frame, inner, theme),
        }
    }
}
