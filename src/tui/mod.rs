//! Terminal User Interface module using ratatui

mod app;
mod components;
mod events;
mod input;
mod keys;
mod markdown;
mod theme;

pub use theme::ThemeMode;

use app::TuiApp;
use events::EventHandler;

use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Set while raw mode and the alternate screen are in effect
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    TERMINAL_ACTIVE.store(false, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Best-effort restore from a panic hook, where no terminal handle exists.
/// Does nothing unless the interactive UI currently owns the terminal.
pub fn restore_terminal_on_panic() {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

/// Main TUI entry point
pub async fn run(app: &crate::app::App) -> Result<()> {
    let mut terminal = init_terminal()?;
    let mut event_handler = EventHandler::default();
    let mut tui = TuiApp::new(app, event_handler.sender());

    let result = run_app(&mut terminal, &mut tui, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut TuiApp<'_>,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        match event_handler.next().await {
            Some(event) => {
                if app.handle_event(event) {
                    break; // Exit requested
                }
            }
            None => break,
        }
    }
    info!("Leaving interactive mode");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_restore_is_noop_without_ui() {
        assert!(!TERMINAL_ACTIVE.load(Ordering::SeqCst));
        restore_terminal_on_panic();
        assert!(!TERMINAL_ACTIVE.load(Ordering::SeqCst));
    }
}
