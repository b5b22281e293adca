//! Version information for PM Genius
//!
//! Values are taken from Cargo.toml at build time.

/// The version of PM Genius, set at build time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the application
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// The description of the application
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Product name shown in the UI
pub const DISPLAY_NAME: &str = "PM Genius";

/// Get the full version string
pub fn full_version() -> String {
    format!("{} v{}", APP_NAME, VERSION)
}

/// Get a formatted version string for display
pub fn display_version() -> String {
    format!("v{}", VERSION)
}

/// User agent sent with API requests
pub fn user_agent() -> String {
    format!("{}/{}", APP_NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "pm-genius");
        assert!(!APP_DESCRIPTION.is_empty());
    }

    #[test]
    fn test_version_functions() {
        let full = full_version();
        assert!(full.contains(APP_NAME));
        assert!(full.contains(VERSION));

        let display = display_version();
        assert!(display.starts_with('v'));
        assert!(display.contains(VERSION));

        assert_eq!(user_agent(), format!("pm-genius/{}", VERSION));
    }
}
