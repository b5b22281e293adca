//! System clipboard access and the transient "copied" indicator

use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// How long the "copied" indicator stays visible
pub const COPY_INDICATOR_DURATION: Duration = Duration::from_millis(2000);

/// Copy `text` to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy to clipboard")?;
    tracing::debug!("Copied {} chars to clipboard", text.len());
    Ok(())
}

/// Copy `text` from a background thread so the UI loop never blocks.
///
/// On Linux the thread keeps ownership of the selection until another
/// application takes it.
pub fn copy_in_background(text: String) {
    std::thread::spawn(move || match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            #[cfg(target_os = "linux")]
            let result = {
                use arboard::SetExtLinux;
                clipboard.set().wait().text(text)
            };
            #[cfg(not(target_os = "linux"))]
            let result = clipboard.set_text(text);

            if let Err(e) = result {
                tracing::warn!("Failed to copy to clipboard: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Failed to access clipboard: {}", e);
        }
    });
}

/// Remembers what was copied last and for how long to show it
#[derive(Debug, Clone)]
pub struct CopyIndicator {
    copied: Option<(String, Instant)>,
    duration: Duration,
}

impl Default for CopyIndicator {
    fn default() -> Self {
        Self::new(COPY_INDICATOR_DURATION)
    }
}

impl CopyIndicator {
    pub fn new(duration: Duration) -> Self {
        Self {
            copied: None,
            duration,
        }
    }

    /// Record a copy of the thing identified by `key` at `now`
    pub fn mark(&mut self, key: impl Into<String>, now: Instant) {
        self.copied = Some((key.into(), now));
    }

    /// Key of the copied thing while the indicator is still showing
    pub fn active(&self, now: Instant) -> Option<&str> {
        self.copied
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.duration)
            .map(|(key, _)| key.as_str())
    }

    pub fn is_active_for(&self, key: &str, now: Instant) -> bool {
        self.active(now) == Some(key)
    }

    /// Forget an expired copy. Returns true if the indicator just reverted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.copied.is_some() && self.active(now).is_none() {
            self.copied = None;
            return true;
        }
        false
    }
}
