//! UI components: trigger view, property pane, popup overlay, logs strip.

pub mod component;
pub mod logs;
pub mod popup;
pub mod property_pane;
pub mod trigger;

pub(crate) use component::Component;
pub use logs::LogsComponent;
pub use popup::PopupComponent;
pub use property_pane::PropertyPaneComponent;
pub use trigger::TriggerComponent;
