//! Terminal rendering: components, the main view, theme, and the event loop.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
pub mod utils;
