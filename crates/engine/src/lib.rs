//! # Listpeek Engine
//!
//! The engine holds the stateful core of the widget, independent of any
//! terminal or rendering concerns:
//!
//! - **`catalog`**: discovers selectable data sources and publishes them to
//!   the configuration surface
//! - **`selection`**: the persisted selected data source
//! - **`fetcher`**: runs the filtered record query for a selection
//! - **`overlay`**: the overlay state machine, including stale-result
//!   discard and outside-click dismissal
//! - **`pointer`**: scoped subscriptions to the root pointer event stream
//!
//! All network access goes through [`listpeek_api::JsonSource`].

pub mod catalog;
pub mod fetcher;
pub mod overlay;
pub mod pointer;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::DataSourceCatalog;
pub use fetcher::{RecordFetcher, RecordQuery};
pub use overlay::{CloseReason, CompletionOutcome, DiscardReason, OverlayController, OverlayState};
pub use pointer::{PointerHub, PointerSubscription};
pub use selection::{SelectionChange, SelectionConfig};

use listpeek_types::SelectorOption;

/// The host-provided settings UI the widget feeds.
///
/// Implementations redraw their selector when options are published and
/// when a refresh is requested.
pub trait ConfigurationSurface {
    /// Replace the selector options with `options`, in order.
    fn publish_options(&mut self, options: Vec<SelectorOption>);

    /// Ask the surface to redraw.
    fn request_refresh(&mut self);

    /// Side channel for non-fatal diagnostics.
    fn report_diagnostic(&mut self, _message: &str) {}
}
