//! The overlay that shows fetched records.

mod popup_component;

pub use popup_component::PopupComponent;
