//! Multi-line text field used for the prompt draft, the chat box and search

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Cursor movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Editable text held as lines, with the cursor column counted in chars
#[derive(Debug, Clone)]
pub struct TextInput {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_column: usize,
    multiline: bool,
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_column: 0,
            multiline: true,
        }
    }

    /// A field where Enter is not consumed as a newline
    pub fn single_line() -> Self {
        Self {
            multiline: false,
            ..Self::new()
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// (line, column) of the cursor, column in chars
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_column)
    }

    /// Display column of the cursor on its line
    pub fn cursor_display_column(&self) -> usize {
        let line = &self.lines[self.cursor_line];
        line[..self.byte_index(line, self.cursor_column)].width()
    }

    /// Replace the content and put the cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if !self.multiline && self.lines.len() > 1 {
            self.lines = vec![self.lines.join(" ")];
        }
        self.cursor_line = self.lines.len() - 1;
        self.cursor_column = self.lines[self.cursor_line].chars().count();
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_line = 0;
        self.cursor_column = 0;
    }

    fn byte_index(&self, line: &str, column: usize) -> usize {
        line.char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn line_chars(&self) -> usize {
        self.lines[self.cursor_line].chars().count()
    }

    /// Insert text at cursor
    pub fn insert_text(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                if self.multiline {
                    self.insert_newline();
                } else {
                    self.insert_str(" ");
                }
            }
            self.insert_str(part);
        }
    }

    fn insert_str(&mut self, text: &str) {
        let line = &self.lines[self.cursor_line];
        let at = self.byte_index(line, self.cursor_column);
        self.lines[self.cursor_line].insert_str(at, text);
        self.cursor_column += text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    /// Insert new line
    pub fn insert_newline(&mut self) {
        let line = &self.lines[self.cursor_line];
        let at = self.byte_index(line, self.cursor_column);
        let after = self.lines[self.cursor_line].split_off(at);
        self.lines.insert(self.cursor_line + 1, after);
        self.cursor_line += 1;
        self.cursor_column = 0;
    }

    /// Delete character before cursor (backspace)
    pub fn delete_previous_char(&mut self) {
        if self.cursor_column > 0 {
            self.cursor_column -= 1;
            let line = &self.lines[self.cursor_line];
            let at = self.byte_index(line, self.cursor_column);
            self.lines[self.cursor_line].remove(at);
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_column = self.line_chars();
            self.lines[self.cursor_line].push_str(&current);
        }
    }

    /// Delete character at cursor
    pub fn delete_char(&mut self) {
        if self.cursor_column < self.line_chars() {
            let line = &self.lines[self.cursor_line];
            let at = self.byte_index(line, self.cursor_column);
            self.lines[self.cursor_line].remove(at);
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
        }
    }

    /// Move cursor
    pub fn move_cursor(&mut self, direction: CursorDirection) {
        match direction {
            CursorDirection::Left => {
                if self.cursor_column > 0 {
                    self.cursor_column -= 1;
                } else if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.cursor_column = self.line_chars();
                }
            }
            CursorDirection::Right => {
                if self.cursor_column < self.line_chars() {
                    self.cursor_column += 1;
                } else if self.cursor_line + 1 < self.lines.len() {
                    self.cursor_line += 1;
                    self.cursor_column = 0;
                }
            }
            CursorDirection::Up => {
                if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.cursor_column = self.cursor_column.min(self.line_chars());
                }
            }
            CursorDirection::Down => {
                if self.cursor_line + 1 < self.lines.len() {
                    self.cursor_line += 1;
                    self.cursor_column = self.cursor_column.min(self.line_chars());
                }
            }
            CursorDirection::Home => self.cursor_column = 0,
            CursorDirection::End => self.cursor_column = self.line_chars(),
        }
    }

    /// Apply an editing key. Returns true when the key changed the text or
    /// moved the cursor.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Enter if self.multiline => self.insert_newline(),
            KeyCode::Backspace => self.delete_previous_char(),
            KeyCode::Delete => self.delete_char(),
            KeyCode::Left => self.move_cursor(CursorDirection::Left),
            KeyCode::Right => self.move_cursor(CursorDirection::Right),
            KeyCode::Up if self.multiline => self.move_cursor(CursorDirection::Up),
            KeyCode::Down if self.multiline => self.move_cursor(CursorDirection::Down),
            KeyCode::Home => self.move_cursor(CursorDirection::Home),
            KeyCode::End => self.move_cursor(CursorDirection::End),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_newlines() {
        let mut input = TextInput::new();
        for c in "Scope".chars() {
            input.handle_key(&key(KeyCode::Char(c)));
        }
        input.handle_key(&key(KeyCode::Enter));
        input.insert_text("Budget");
        assert_eq!(input.text(), "Scope\nBudget");
        assert_eq!(input.cursor(), (1, 6));

        input.move_cursor(CursorDirection::Home);
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.text(), "ScopeBudget");
        assert_eq!(input.cursor(), (0, 5));
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::new();
        input.set_text("café ok");
        input.move_cursor(CursorDirection::Home);
        for _ in 0..4 {
            input.move_cursor(CursorDirection::Right);
        }
        input.delete_previous_char();
        assert_eq!(input.text(), "caf ok");
        input.insert_char('é');
        assert_eq!(input.text(), "café ok");
        assert_eq!(input.cursor_display_column(), 4);
    }

    #[test]
    fn test_single_line_ignores_enter() {
        let mut input = TextInput::single_line();
        input.set_text("risk");
        assert!(!input.handle_key(&key(KeyCode::Enter)));
        input.insert_text(" log\nnext");
        assert_eq!(input.text(), "risk log next");
        assert_eq!(input.lines().len(), 1);
    }

    #[test]
    fn test_set_text_and_clear() {
        let mut input = TextInput::new();
        input.set_text("a\nbc");
        assert_eq!(input.cursor(), (1, 2));
        input.delete_char();
        assert_eq!(input.text(), "a\nbc");
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_control_keys_pass_through() {
        let mut input = TextInput::new();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(!input.handle_key(&ctrl_r));
        assert!(input.is_empty());
    }
}
