//! Property pane: the configuration surface hosting the list selector.

mod property_pane_component;
mod state;

pub use property_pane_component::PropertyPaneComponent;
pub use state::{FIELD_LABEL, GROUP_NAME, PANE_DESCRIPTION, PropertyPaneState};
