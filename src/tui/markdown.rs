//! Markdown to styled lines for model responses and chat replies

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::theme::Theme;

/// Renders markdown with the colors of one theme
pub struct MarkdownRenderer<'t> {
    theme: &'t Theme,
}

struct RenderContext {
    lines: Vec<Line<'static>>,
    current_line: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Next number for each open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    in_quote: bool,
}

impl RenderContext {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        let merged = self.style().patch(style);
        self.styles.push(merged);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn flush_line(&mut self) {
        if !self.current_line.is_empty() {
            let spans = std::mem::take(&mut self.current_line);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_line(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.current_line.is_empty() && self.in_quote {
            self.current_line.push(Span::raw("│ "));
        }
        let style = self.style();
        self.current_line.push(Span::styled(text.to_string(), style));
    }
}

impl<'t> MarkdownRenderer<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self { theme }
    }

    /// Render markdown content to lines
    pub fn render(&self, content: &str) -> Vec<Line<'static>> {
        let parser = Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH);
        let mut context = RenderContext {
            lines: Vec::new(),
            current_line: Vec::new(),
            styles: vec![self.theme.text_style()],
            lists: Vec::new(),
            in_code_block: false,
            in_quote: false,
        };

        for event in parser {
            match event {
                Event::Start(tag) => self.handle_start_tag(tag, &mut context),
                Event::End(tag_end) => self.handle_end_tag(tag_end, &mut context),
                Event::Text(text) => self.handle_text(&text, &mut context),
                Event::Code(code) => {
                    context.current_line.push(Span::styled(code.to_string(), self.theme.code_style()));
                }
                Event::SoftBreak => context.push_text(" "),
                Event::HardBreak => context.flush_line(),
                Event::Rule => {
                    context.blank_line();
                    context.lines.push(Line::styled("─".repeat(24), self.theme.dim_style()));
                }
                Event::TaskListMarker(checked) => {
                    context.push_text(if checked { "[x] " } else { "[ ] " });
                }
                Event::Html(html) | Event::InlineHtml(html) => context.push_text(&html),
                Event::FootnoteReference(label) => context.push_text(&format!("[{}]", label)),
            }
        }

        context.flush_line();
        while context.lines.last().is_some_and(|line| line.spans.is_empty()) {
            context.lines.pop();
        }
        context.lines
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self
                .theme
                .heading_style()
                .fg(self.theme.primary)
                .add_modifier(Modifier::UNDERLINED),
            HeadingLevel::H2 => self.theme.heading_style().fg(self.theme.primary),
            _ => self.theme.heading_style(),
        }
    }

    fn handle_start_tag(&self, tag: Tag, context: &mut RenderContext) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                context.blank_line();
                context.push_style(self.heading_style(level));
            }
            Tag::BlockQuote => {
                context.blank_line();
                context.in_quote = true;
                context.push_style(self.theme.dim_style().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                context.blank_line();
                context.in_code_block = true;
                if let CodeBlockKind::Fenced(language) = kind {
                    if !language.is_empty() {
                        context.lines.push(Line::styled(language.to_string(), self.theme.dim_style()));
                    }
                }
            }
            Tag::List(start) => {
                if context.lists.is_empty() {
                    context.blank_line();
                } else {
                    context.flush_line();
                }
                context.lists.push(start);
            }
            Tag::Item => {
                context.flush_line();
                let depth = context.lists.len().saturating_sub(1);
                let marker = match context.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                context.current_line.push(Span::raw("  ".repeat(depth)));
                context.current_line.push(Span::styled(marker, self.theme.accent_style()));
            }
            Tag::Emphasis => context.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => context.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => context.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => context.push_style(self.theme.tag_style().add_modifier(Modifier::UNDERLINED)),
            _ => {}
        }
    }

    fn handle_end_tag(&self, tag_end: TagEnd, context: &mut RenderContext) {
        match tag_end {
            TagEnd::Paragraph => {
                if context.lists.is_empty() {
                    context.blank_line();
                } else {
                    context.flush_line();
                }
            }
            TagEnd::Heading(_) => {
                context.pop_style();
                context.blank_line();
            }
            TagEnd::BlockQuote => {
                context.pop_style();
                context.in_quote = false;
                context.blank_line();
            }
            TagEnd::CodeBlock => {
                context.in_code_block = false;
                context.blank_line();
            }
            TagEnd::List(_) => {
                context.lists.pop();
                if context.lists.is_empty() {
                    context.blank_line();
                }
            }
            TagEnd::Item => context.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                context.pop_style();
            }
            _ => {}
        }
    }

    fn handle_text(&self, text: &str, context: &mut RenderContext) {
        if context.in_code_block {
            for line in text.trim_end_matches('\n').split('\n') {
                context.lines.push(Line::from(Span::styled(
                    format!("  {}", line),
                    self.theme.code_style(),
                )));
            }
        } else {
            context.push_text(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(content: &str) -> Vec<Line<'static>> {
        let theme = Theme::light();
        MarkdownRenderer::new(&theme).render(content)
    }

    #[test]
    fn test_heading_and_paragraph() {
        let lines = render("# Project Charter\n\nDefine the **scope** first.");
        assert_eq!(plain_text(&lines), "Project Charter\n\nDefine the scope first.");

        let heading = &lines[0].spans[0];
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));

        let strong = lines[2]
            .spans
            .iter()
            .find(|span| span.content == "scope")
            .unwrap();
        assert!(strong.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_lists() {
        let text = plain_text(&render("- Scope\n- Budget\n\n1. Plan\n2. Execute"));
        assert!(text.contains("• Scope"));
        assert!(text.contains("• Budget"));
        assert!(text.contains("1. Plan"));
        assert!(text.contains("2. Execute"));
    }

    #[test]
    fn test_code_block_keeps_lines() {
        let lines = render("```python\nimport requests\nprint(1)\n```");
        let text = plain_text(&lines);
        assert!(text.starts_with("python"));
        assert!(text.contains("  import requests\n  print(1)"));
        let theme = Theme::light();
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.code));
    }

    #[test]
    fn test_inline_code() {
        let theme = Theme::light();
        let lines = MarkdownRenderer::new(&theme).render("Use `project = PROJ` in JQL");
        let code = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "project = PROJ")
            .unwrap();
        assert_eq!(code.style.fg, Some(theme.code));
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(plain_text(&render("No response generated.")), "No response generated.");
        assert!(render("").is_empty());
    }
}
