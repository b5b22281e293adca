//! Visual themes and the theme context handed to renderers

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectable visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    HighContrast,
    Neon,
}

impl ThemeMode {
    pub fn name(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::HighContrast => "high-contrast",
            ThemeMode::Neon => "neon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "high-contrast" | "high_contrast" | "contrast" => Some(ThemeMode::HighContrast),
            "neon" => Some(ThemeMode::Neon),
            _ => None,
        }
    }

    /// Next theme of the toggle cycle. Neon is only reachable explicitly and
    /// toggles back to light.
    pub fn next(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::HighContrast,
            ThemeMode::HighContrast | ThemeMode::Neon => ThemeMode::Light,
        }
    }

    /// Short label for the header badge
    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::HighContrast => "Contrast",
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
            ThemeMode::Neon => "Neon",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Application theme configuration
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary colors
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,

    /// Text colors
    pub text: Color,
    pub text_dim: Color,
    pub heading: Color,

    /// Background colors
    pub background: Color,
    pub background_alt: Color,
    pub code_background: Color,

    /// Border colors
    pub border: Color,
    pub border_focused: Color,

    /// Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    /// Special colors
    pub selection: Color,
    pub selection_text: Color,
    pub code: Color,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::HighContrast => Self::high_contrast(),
            ThemeMode::Neon => Self::neon(),
        }
    }

    /// Warm stone palette with gold accents
    pub fn light() -> Self {
        Self {
            primary: Color::Rgb(180, 134, 11),    // Gold
            secondary: Color::Rgb(30, 64, 175),   // Deep blue
            accent: Color::Rgb(190, 18, 60),      // Rose
            text: Color::Rgb(28, 25, 23),         // Stone-900
            text_dim: Color::Rgb(120, 113, 108),  // Stone-500
            heading: Color::Rgb(28, 25, 23),
            background: Color::Rgb(250, 250, 249), // Stone-50
            background_alt: Color::Rgb(231, 229, 228), // Stone-200
            code_background: Color::Rgb(245, 245, 244),
            border: Color::Rgb(214, 211, 209),    // Stone-300
            border_focused: Color::Rgb(180, 134, 11),
            success: Color::Rgb(21, 128, 61),
            warning: Color::Rgb(180, 83, 9),
            error: Color::Rgb(185, 28, 28),
            selection: Color::Rgb(180, 134, 11),
            selection_text: Color::Rgb(255, 255, 255),
            code: Color::Rgb(157, 23, 77),
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: Color::Rgb(234, 179, 8),     // Gold-400
            secondary: Color::Rgb(96, 165, 250),  // Blue-400
            accent: Color::Rgb(244, 114, 182),    // Pink-400
            text: Color::Rgb(245, 245, 244),
            text_dim: Color::Rgb(168, 162, 158),
            heading: Color::Rgb(250, 250, 249),
            background: Color::Rgb(28, 25, 23),   // Stone-900
            background_alt: Color::Rgb(41, 37, 36), // Stone-800
            code_background: Color::Rgb(12, 10, 9),
            border: Color::Rgb(87, 83, 78),
            border_focused: Color::Rgb(234, 179, 8),
            success: Color::Rgb(74, 222, 128),
            warning: Color::Rgb(251, 191, 36),
            error: Color::Rgb(248, 113, 113),
            selection: Color::Rgb(68, 64, 60),
            selection_text: Color::Rgb(250, 204, 21),
            code: Color::Rgb(251, 146, 60),
        }
    }

    /// Black, white and yellow only
    pub fn high_contrast() -> Self {
        Self {
            primary: Color::Yellow,
            secondary: Color::White,
            accent: Color::Yellow,
            text: Color::White,
            text_dim: Color::White,
            heading: Color::Yellow,
            background: Color::Black,
            background_alt: Color::Black,
            code_background: Color::Black,
            border: Color::White,
            border_focused: Color::Yellow,
            success: Color::Yellow,
            warning: Color::Yellow,
            error: Color::Yellow,
            selection: Color::Yellow,
            selection_text: Color::Black,
            code: Color::Yellow,
        }
    }

    pub fn neon() -> Self {
        Self {
            primary: Color::Rgb(255, 0, 255),     // Neon pink
            secondary: Color::Rgb(0, 255, 255),   // Neon cyan
            accent: Color::Rgb(57, 255, 20),      // Neon green
            text: Color::Rgb(0, 255, 255),
            text_dim: Color::Rgb(168, 162, 158),
            heading: Color::Rgb(255, 0, 255),
            background: Color::Rgb(13, 2, 33),
            background_alt: Color::Rgb(26, 11, 46),
            code_background: Color::Rgb(17, 24, 39),
            border: Color::Rgb(128, 0, 128),
            border_focused: Color::Rgb(0, 255, 255),
            success: Color::Rgb(57, 255, 20),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 49, 49),
            selection: Color::Rgb(26, 11, 46),
            selection_text: Color::Rgb(0, 255, 255),
            code: Color::Rgb(57, 255, 20),
        }
    }

    /// Base style for normal elements
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Style for text content
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn heading_style(&self) -> Style {
        Style::default().fg(self.heading).add_modifier(Modifier::BOLD)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    /// Style for borders
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Style for selected items
    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.selection_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background_alt)
    }

    pub fn tag_style(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code).bg(self.code_background)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }
}

/// The active theme, owned by the UI app and passed to every renderer
#[derive(Debug, Clone)]
pub struct ThemeContext {
    mode: ThemeMode,
    theme: Theme,
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl ThemeContext {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            mode,
            theme: Theme::for_mode(mode),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set(&mut self, mode: ThemeMode) {
        self.mode = mode;
        self.theme = Theme::for_mode(mode);
    }

    /// Advance the toggle cycle and return the new mode
    pub fn toggle(&mut self) -> ThemeMode {
        self.set(self.mode.next());
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycle() {
        let mut ctx = ThemeContext::default();
        assert_eq!(ctx.mode(), ThemeMode::Light);
        assert_eq!(ctx.toggle(), ThemeMode::Dark);
        assert_eq!(ctx.toggle(), ThemeMode::HighContrast);
        assert_eq!(ctx.toggle(), ThemeMode::Light);

        ctx.set(ThemeMode::Neon);
        assert_eq!(ctx.theme().primary, Color::Rgb(255, 0, 255));
        assert_eq!(ctx.toggle(), ThemeMode::Light);
    }

    #[test]
    fn test_names_round_trip() {
        for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::HighContrast, ThemeMode::Neon] {
            assert_eq!(ThemeMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(ThemeMode::from_name("Contrast"), Some(ThemeMode::HighContrast));
        assert_eq!(ThemeMode::from_name("sepia"), None);
    }

    #[test]
    fn test_high_contrast_palette() {
        let theme = Theme::high_contrast();
        assert_eq!(theme.background, Color::Black);
        assert_eq!(theme.heading, Color::Yellow);
        assert_eq!(theme.selection_style().fg, Some(Color::Black));
    }
}
