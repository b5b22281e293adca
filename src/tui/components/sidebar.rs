use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use super::Component;
use crate::{
    catalog::{Catalog, Section},
    tui::{theme::Theme, Frame},
};

/// Sections in sidebar order, i.e. grouped by category
pub fn sidebar_sections(catalog: &Catalog) -> Vec<&Section> {
    catalog
        .grouped()
        .into_iter()
        .flat_map(|(_, sections)| sections)
        .collect()
}

/// Section navigation grouped under category headings
pub struct Sidebar<'a> {
    pub catalog: &'a Catalog,
    pub active_section_id: Option<&'a str>,
    /// Index into [`sidebar_sections`]
    pub cursor: usize,
    pub focused: bool,
}

impl Component for Sidebar<'_> {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut items = Vec::new();
        let mut selected_row = None;
        let mut index = 0;

        for (category, sections) in self.catalog.grouped() {
            if !items.is_empty() {
                items.push(ListItem::new(Line::default()));
            }
            items.push(ListItem::new(Line::styled(
                category.label().to_uppercase(),
                theme.dim_style(),
            )));
            for section in sections {
                let active = self.active_section_id == Some(section.id.as_str());
                let marker = if active { "▸ " } else { "  " };
                let style = if active { theme.accent_style() } else { theme.text_style() };
                if index == self.cursor {
                    selected_row = Some(items.len());
                }
                items.push(ListItem::new(Line::from(vec![
                    Span::styled(marker, theme.accent_style()),
                    Span::styled(section.title.clone(), style),
                ])));
                index += 1;
            }
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Collections ")
                    .border_style(theme.border_style(self.focused)),
            )
            .style(theme.base_style())
            .highlight_style(if self.focused {
                theme.selection_style()
            } else {
                theme.text_style()
            });

        let mut state = ListState::default();
        state.select(selected_row);
        frame.render_stateful_widget(list, area, &mut state);
    }
}
