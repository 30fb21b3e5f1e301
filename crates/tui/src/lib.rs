//! # Listpeek TUI Library
//!
//! Terminal rendition of the list popup widget. The body shows the current
//! selection and a "Show Popup" button; pressing it opens an overlay that
//! fetches the selected list's items and renders them as `label: value`
//! lines. A side property pane (toggled with `p`) lists the site's lists and
//! persists the choice.
//!
//! ## Architecture
//!
//! Components (trigger, property pane, popup, logs) handle input and render
//! themselves against a shared [`app::App`]. They return `Effect`s that the
//! runtime turns into navigation changes or background tasks (see `cmd`).

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use listpeek_api::JsonSource;
use listpeek_util::WidgetPreferences;

pub use app::WidgetConfig;

/// Runs the widget until the user quits.
///
/// `source` serves every discovery and fetch request; `preferences` holds
/// the persisted list selection.
///
/// # Errors
///
/// Terminal setup or teardown failures (raw mode, alternate screen).
/// Network failures never surface here; they are shown in the UI.
pub async fn run(config: WidgetConfig, source: Arc<dyn JsonSource>, preferences: Arc<WidgetPreferences>) -> Result<()> {
    ui::runtime::run_app(config, source, preferences).await
}
