//! The persisted "selected data source" setting.
//!
//! No validation against the catalog happens here: an identifier that is no
//! longer discovered is still accepted and simply yields no records.

use std::sync::Arc;

use listpeek_types::SelectionState;
use listpeek_util::WidgetPreferences;
use tracing::{debug, warn};

use crate::ConfigurationSurface;

/// Change notification produced by [`SelectionConfig::set_selected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: SelectionState,
    pub current: SelectionState,
}

impl SelectionChange {
    /// Whether the identifier actually differs from the previous one.
    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug)]
pub struct SelectionConfig {
    state: SelectionState,
    store: Arc<WidgetPreferences>,
}

impl SelectionConfig {
    /// Seed the selection from the persisted preferences.
    pub fn load(store: Arc<WidgetPreferences>) -> Self {
        let state = SelectionState::new(store.selected_source());
        Self { state, store }
    }

    pub fn current(&self) -> &SelectionState {
        &self.state
    }

    /// Select `identifier` and request a surface refresh.
    ///
    /// Setting the current identifier again changes nothing but still
    /// refreshes the surface. Persistence failures are reported as
    /// diagnostics; the in-memory selection is updated regardless.
    pub fn set_selected(&mut self, identifier: impl Into<String>, surface: &mut dyn ConfigurationSurface) -> SelectionChange {
        let next = SelectionState::new(Some(identifier.into()));
        let previous = std::mem::replace(&mut self.state, next);
        let change = SelectionChange {
            previous,
            current: self.state.clone(),
        };

        if change.is_changed() {
            debug!(
                previous = change.previous.identifier_or_empty(),
                current = change.current.identifier_or_empty(),
                "data source selection changed"
            );
            if let Err(error) = self.store.set_selected_source(self.state.identifier().map(str::to_string)) {
                warn!(error = %error, path = %self.store.path().display(), "failed to persist selected data source");
                surface.report_diagnostic(&format!("Could not save selection: {error}"));
            }
        }
        surface.request_refresh();
        change
    }
}
