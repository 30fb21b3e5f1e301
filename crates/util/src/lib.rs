//! Shared helpers for the listpeek crates: persisted widget configuration,
//! OData literal handling, path expansion, and log redaction.

pub mod odata;
pub mod path_processing;
pub mod preferences;
pub mod text_processing;

pub use path_processing::{config_file_path, expand_tilde};
pub use preferences::{PreferencesError, PreferencesPayload, WidgetPreferences};
pub use text_processing::{redact_sensitive, truncate_with_ellipsis};
