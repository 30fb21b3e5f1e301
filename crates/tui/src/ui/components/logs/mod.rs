//! Logs strip for user-facing diagnostics.

mod logs_component;
mod state;

pub use logs_component::LogsComponent;
pub use state::LogsState;
