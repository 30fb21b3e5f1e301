//! Shared data model for the listpeek workspace.
//!
//! Everything here is plain data: descriptors discovered from the site, the
//! persisted selection, fetched records, overlay visibility, and the message
//! and effect enums the UI loop exchanges with background tasks.

use std::fmt;

use serde::{Deserialize, Serialize};

mod errors;

pub use errors::{DiscoveryError, FetchError, FetchErrorKind, TransportError};

/// A selectable data source discovered from the host site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceDescriptor {
    pub identifier: String,
    pub display_name: String,
}

impl DataSourceDescriptor {
    /// Lists are addressed by title, so the title doubles as identifier and label.
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            identifier: title.clone(),
            display_name: title,
        }
    }

    pub fn selector_option(&self) -> SelectorOption {
        SelectorOption {
            key: self.identifier.clone(),
            text: self.display_name.clone(),
        }
    }
}

/// One entry of the single-choice selector on the configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOption {
    pub key: String,
    pub text: String,
}

/// The currently selected data source. An empty identifier means "none".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected_identifier: Option<String>,
}

impl SelectionState {
    pub fn new(identifier: Option<String>) -> Self {
        Self {
            selected_identifier: identifier.filter(|value| !value.trim().is_empty()),
        }
    }

    /// The selected identifier, or `None` when nothing (or an empty string) is selected.
    pub fn identifier(&self) -> Option<&str> {
        self.selected_identifier.as_deref()
    }

    /// The selected identifier, with "nothing selected" rendered as `""`.
    pub fn identifier_or_empty(&self) -> &str {
        self.identifier().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_identifier.is_none()
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.identifier_or_empty() == identifier
    }
}

/// A fetched row: `Title` rendered as label, `Answer` as value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub label: String,
    pub value: String,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Coarse overlay visibility derived from the controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayVisibility {
    #[default]
    Hidden,
    Visible,
}

/// Rectangular screen region in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && u32::from(column) < u32::from(self.x) + u32::from(self.width)
            && u32::from(row) < u32::from(self.y) + u32::from(self.height)
    }
}

/// A pointer press observed on the root listening surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub column: u16,
    pub row: u16,
}

/// Tag attached to every record fetch so its result can be matched against
/// the selection that is current when it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub sequence: u64,
    pub identifier: String,
}

/// A resolved fetch, still carrying the ticket it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Vec<Record>, FetchError>,
}

/// Modal overlays the main view can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Popup,
}

/// Messages delivered to the UI loop.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbbers)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// A catalog discovery task finished
    CatalogLoaded {
        generation: u64,
        result: Result<Vec<DataSourceDescriptor>, DiscoveryError>,
    },
    /// A record fetch task finished
    RecordsFetched(FetchCompletion),
}

/// Side effects requested by components and executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run catalog discovery in the background
    RefreshCatalog,
    /// Run a record fetch in the background
    FetchRecords(FetchTicket),
    /// Open a modal overlay
    ShowModal(Modal),
    /// Close the open modal overlay
    CloseModal,
    /// Tear the widget down and leave the event loop
    Quit,
}
