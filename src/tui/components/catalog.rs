use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::Component;
use crate::{
    catalog::{FilteredSection, PromptItem},
    tui::{input::TextInput, theme::{Theme, ThemeMode}, Frame},
};

pub const SEARCH_PLACEHOLDER: &str = "Find your muse (WBS, Risk, Code)...";

/// Clipboard indicator key for an item's body text
pub fn text_copy_key(item_id: &str) -> String {
    format!("text:{}", item_id)
}

/// Clipboard indicator key for an item's code sample
pub fn code_copy_key(item_id: &str) -> String {
    format!("code:{}", item_id)
}

/// Search box plus theme and reasoning badges
pub struct Header<'a> {
    pub search: &'a TextInput,
    pub focused: bool,
    pub theme_mode: ThemeMode,
    pub extended_reasoning: bool,
}

impl Component for Header<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(28)])
            .split(area);

        let search_line = if self.search.is_empty() && !self.focused {
            Line::styled(SEARCH_PLACEHOLDER, theme.dim_style().add_modifier(Modifier::ITALIC))
        } else {
            Line::styled(self.search.text(), theme.text_style())
        };
        let search = Paragraph::new(search_line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(theme.border_style(self.focused)),
        );
        frame.render_widget(search, chunks[0]);
        if self.focused {
            let x = chunks[0].x + 1 + self.search.cursor_display_column() as u16;
            frame.set_cursor(x.min(chunks[0].right().saturating_sub(2)), chunks[0].y + 1);
        }

        let reasoning = if self.extended_reasoning {
            Span::styled("◆ Extended", theme.accent_style())
        } else {
            Span::styled("◇ Standard", theme.dim_style())
        };
        let badges = Paragraph::new(Line::from(vec![
            Span::styled(format!("☼ {}", self.theme_mode.label()), theme.tag_style()),
            Span::raw("  "),
            reasoning,
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(false)),
        );
        frame.render_widget(badges, chunks[1]);
    }
}

/// The active section: hero, item list and the highlighted item's detail
pub struct SectionView<'a> {
    pub section: Option<&'a FilteredSection<'a>>,
    pub search_term: &'a str,
    pub summary: Option<&'a str>,
    pub cursor: usize,
    pub focused: bool,
    /// Key of something copied within the indicator window
    pub copied: Option<&'a str>,
}

impl SectionView<'_> {
    fn render_empty(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = vec![
            Line::default(),
            Line::styled(
                format!("No masterpieces found for \"{}\"", self.search_term),
                theme.heading_style(),
            ),
            Line::default(),
            Line::styled(
                "Try a different term, or press Esc to clear the canvas.",
                theme.dim_style(),
            ),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(theme.border_style(false)))
            .style(theme.base_style());
        frame.render_widget(paragraph, area);
    }

    fn render_hero(&self, section: &FilteredSection<'_>, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = vec![
            Line::styled(
                format!("{} Collection", section.section.category.label()),
                theme.tag_style().add_modifier(Modifier::BOLD),
            ),
            Line::styled(section.title().to_string(), theme.heading_style().fg(theme.primary)),
            Line::styled(section.section.description.clone(), theme.dim_style()),
        ];
        if let Some(summary) = self.summary {
            lines.push(Line::styled(summary.to_string(), theme.warning_style()));
        }
        let hero = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(theme.base_style());
        frame.render_widget(hero, area);
    }

    fn render_items(&self, items: &[&PromptItem], frame: &mut Frame, area: Rect, theme: &Theme) {
        let list_items: Vec<ListItem> = items
            .iter()
            .map(|item| {
                let mut spans = vec![Span::styled(item.title.clone(), theme.text_style())];
                if item.code_snippet.is_some() {
                    spans.push(Span::styled(" </>", theme.tag_style()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(list_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Prompts ({}) ", items.len()))
                    .border_style(theme.border_style(self.focused)),
            )
            .style(theme.base_style())
            .highlight_style(theme.selection_style())
            .highlight_symbol("› ");

        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(self.cursor.min(items.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_detail(&self, item: &PromptItem, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = vec![Line::styled(item.title.clone(), theme.heading_style())];

        if !item.tags.is_empty() {
            let tags: Vec<Span> = item
                .tags
                .iter()
                .flat_map(|tag| [Span::styled(format!("#{}", tag), theme.tag_style()), Span::raw(" ")])
                .collect();
            lines.push(Line::from(tags));
        }
        if let Some(description) = &item.description {
            lines.push(Line::styled(description.clone(), theme.dim_style().add_modifier(Modifier::ITALIC)));
        }
        lines.push(Line::default());
        lines.extend(item.text.lines().map(|l| Line::styled(l.to_string(), theme.text_style())));

        if let Some(snippet) = &item.code_snippet {
            lines.push(Line::default());
            lines.push(Line::styled(snippet.language.clone(), theme.dim_style()));
            lines.extend(
                snippet
                    .code
                    .lines()
                    .map(|l| Line::styled(format!("  {}", l), theme.code_style())),
            );
        }

        lines.push(Line::default());
        lines.push(self.copy_hint(item, theme));

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Prompt ")
                    .border_style(theme.border_style(false)),
            )
            .style(theme.base_style());
        frame.render_widget(detail, area);
    }

    fn copy_hint(&self, item: &PromptItem, theme: &Theme) -> Line<'static> {
        let text_copied = self.copied == Some(text_copy_key(&item.id).as_str());
        let code_copied = self.copied == Some(code_copy_key(&item.id).as_str());

        let mut spans = vec![
            Span::styled("Enter", theme.accent_style()),
            Span::styled(" open in playground  ", theme.dim_style()),
        ];
        if text_copied {
            spans.push(Span::styled("✓ Copied!", theme.success_style()));
        } else {
            spans.push(Span::styled("y", theme.accent_style()));
            spans.push(Span::styled(" copy", theme.dim_style()));
        }
        if item.code_snippet.is_some() {
            spans.push(Span::raw("  "));
            if code_copied {
                spans.push(Span::styled("✓ Code copied!", theme.success_style()));
            } else {
                spans.push(Span::styled("Y", theme.accent_style()));
                spans.push(Span::styled(" copy code", theme.dim_style()));
            }
        }
        Line::from(spans)
    }
}

impl Component for SectionView<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(section) = self.section else {
            self.render_empty(frame, area, theme);
            return;
        };

        let hero_height = if self.summary.is_some() { 5 } else { 4 };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(hero_height), Constraint::Min(3)])
            .split(area);
        self.render_hero(section, frame, rows[0], theme);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        self.render_items(&section.items, frame, columns[0], theme);

        if let Some(item) = section.items.get(self.cursor.min(section.items.len().saturating_sub(1))) {
            self.render_detail(item, frame, columns[1], theme);
        }
    }
}
