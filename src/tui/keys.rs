use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub description: String,
}

impl KeyBinding {
    pub fn new(key: KeyCode, modifiers: KeyModifiers, description: &str) -> Self {
        Self {
            key,
            modifiers,
            description: description.to_string(),
        }
    }

    pub fn plain(key: KeyCode, description: &str) -> Self {
        Self::new(key, KeyModifiers::NONE, description)
    }

    pub fn ctrl(c: char, description: &str) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL, description)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        // Shifted characters arrive with SHIFT set on some terminals
        let modifiers = match event.code {
            KeyCode::Char(_) => event.modifiers.difference(KeyModifiers::SHIFT),
            _ => event.modifiers,
        };
        self.key == event.code && self.modifiers == modifiers
    }

    /// Human readable key, e.g. `Ctrl+R`
    pub fn label(&self) -> String {
        let key = match self.key {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) if self.modifiers.contains(KeyModifiers::CONTROL) => {
                c.to_ascii_uppercase().to_string()
            }
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            other => format!("{:?}", other),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", key)
        } else {
            key
        }
    }
}

/// Application key mappings
///
/// Global bindings carry a modifier so they work while a text field has focus.
/// The plain-character ones only apply when browsing.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit application
    pub quit: KeyBinding,

    /// Show help
    pub help: KeyBinding,
    pub help_alt: KeyBinding,

    pub search: KeyBinding,
    pub toggle_theme: KeyBinding,
    pub open_chat: KeyBinding,
    pub export: KeyBinding,
    pub copy_text: KeyBinding,
    pub copy_code: KeyBinding,
    pub copy_response: KeyBinding,
    pub next_focus: KeyBinding,

    pub run: KeyBinding,
    pub extended: KeyBinding,
    pub expand: KeyBinding,
    pub clear_chat: KeyBinding,
    pub close: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::ctrl('c', "Quit application"),
            help: KeyBinding::plain(KeyCode::F(1), "Show/hide help"),
            help_alt: KeyBinding::plain(KeyCode::Char('?'), "Show/hide help"),
            search: KeyBinding::plain(KeyCode::Char('/'), "Search the catalog"),
            toggle_theme: KeyBinding::plain(KeyCode::Char('t'), "Cycle light, dark and contrast themes"),
            open_chat: KeyBinding::plain(KeyCode::Char('c'), "Open the chat assistant"),
            export: KeyBinding::plain(KeyCode::Char('x'), "Export the catalog as JSON"),
            copy_text: KeyBinding::plain(KeyCode::Char('y'), "Copy prompt text"),
            copy_code: KeyBinding::plain(KeyCode::Char('Y'), "Copy code sample"),
            copy_response: KeyBinding::ctrl('y', "Copy the generated response"),
            next_focus: KeyBinding::plain(KeyCode::Tab, "Move focus"),
            run: KeyBinding::ctrl('r', "Run the prompt / send the message"),
            extended: KeyBinding::ctrl('e', "Toggle extended reasoning"),
            expand: KeyBinding::ctrl('f', "Expand or shrink the panel"),
            clear_chat: KeyBinding::ctrl('l', "Clear the chat history"),
            close: KeyBinding::plain(KeyCode::Esc, "Close panel, overlay or search"),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Check if the event should show help
    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    fn bindings(&self) -> [&KeyBinding; 15] {
        [
            &self.next_focus,
            &self.search,
            &self.open_chat,
            &self.run,
            &self.extended,
            &self.expand,
            &self.clear_chat,
            &self.copy_text,
            &self.copy_code,
            &self.copy_response,
            &self.export,
            &self.toggle_theme,
            &self.close,
            &self.help,
            &self.quit,
        ]
    }

    /// `(key, description)` pairs for the help overlay
    pub fn help_lines(&self) -> Vec<(String, String)> {
        self.bindings()
            .iter()
            .map(|binding| (binding.label(), binding.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_binding_matches() {
        let keys = KeyMap::default();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(keys.run.matches(&ctrl_r));
        assert!(!keys.run.matches(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)));
        assert!(keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_shifted_char_matches() {
        let keys = KeyMap::default();
        let shift_y = KeyEvent::new(KeyCode::Char('Y'), KeyModifiers::SHIFT);
        assert!(keys.copy_code.matches(&shift_y));
        assert!(!keys.copy_text.matches(&shift_y));
        assert!(keys.help_alt.matches(&KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_help_lines() {
        let lines = KeyMap::default().help_lines();
        assert!(lines.iter().any(|(key, _)| key == "Ctrl+R"));
        assert!(lines.iter().any(|(key, _)| key == "F1"));
        assert!(lines.iter().any(|(key, _)| key == "Esc"));
    }
}
