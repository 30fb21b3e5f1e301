//! Trigger view: the widget body with its two buttons.

mod state;
mod trigger_component;

pub use state::TriggerState;
pub use trigger_component::TriggerComponent;
