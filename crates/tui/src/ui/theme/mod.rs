//! Theme styling for the TUI layer.
//!
//! A single Dracula-derived palette behind the [`Theme`] trait, plus the
//! helper builders components use instead of hard-coding colors.

pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use roles::Theme;

pub fn default_theme() -> Box<dyn Theme> {
    Box::new(DraculaTheme::new())
}
