// Text processing utilities

use unicode_width::UnicodeWidthStr;

/// String and text manipulation utilities
pub mod string {
    use super::*;
    use unicode_width::UnicodeWidthChar;

    /// Truncate text to a display width with an ellipsis
    pub fn truncate(text: &str, max_width: usize) -> String {
        if text.width() <= max_width {
            return text.to_string();
        }
        if max_width == 0 {
            return String::new();
        }

        let mut out = String::new();
        let mut width = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if width + w + 1 > max_width {
                break;
            }
            out.push(c);
            width += w;
        }
        out.push('…');
        out
    }

    /// Word wrap text to the given width, keeping blank lines
    pub fn word_wrap(text: &str, width: usize) -> Vec<String> {
        if width == 0 {
            return text.lines().map(str::to_string).collect();
        }
        text.lines()
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(line, width)
                        .into_iter()
                        .map(|l| l.into_owned())
                        .collect()
                }
            })
            .collect()
    }

    /// Clean and normalize whitespace
    pub fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Text formatting utilities
pub mod format {
    use super::*;

    /// Indent every line of `text` by `spaces`
    pub fn indent(text: &str, spaces: usize) -> String {
        let pad = " ".repeat(spaces);
        text.lines()
            .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", pad, line) })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Left-align `text` in a column of `width` display cells
    pub fn pad_right(text: &str, width: usize) -> String {
        let w = text.width();
        if w >= width {
            text.to_string()
        } else {
            format!("{}{}", text, " ".repeat(width - w))
        }
    }
}
