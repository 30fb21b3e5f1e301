//! Error taxonomy shared by the network client, the engine, and the UI.
//!
//! None of these errors are fatal to the host. Discovery failures become a
//! logged diagnostic; fetch failures become a terminal overlay state that
//! renders a message instead of records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by the network client before a JSON payload is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, or other I/O failure.
    #[error("network error: {0}")]
    Network(String),
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The body could not be parsed as JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

/// Catalog refresh failed; the previous descriptor sequence stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("list discovery failed: {0}")]
    Transport(#[from] TransportError),
    #[error("list discovery returned an unexpected payload: {0}")]
    Malformed(String),
}

/// Record fetch failure as observed by the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No data source is selected; no request was issued.
    #[error("no data source selected")]
    MissingSource,
    #[error("{0}")]
    Transport(String),
    /// The response parsed but did not carry a `value` sequence of items.
    #[error("response did not contain a list of items")]
    MalformedResponse,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::MissingSource => FetchErrorKind::MissingSource,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::MalformedResponse => FetchErrorKind::MalformedResponse,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        FetchError::Transport(error.to_string())
    }
}

/// Payload-free discriminant of [`FetchError`], carried by the overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchErrorKind {
    MissingSource,
    Transport,
    MalformedResponse,
}

impl FetchErrorKind {
    /// Message shown in place of the record list.
    pub fn user_message(self) -> &'static str {
        match self {
            FetchErrorKind::MissingSource => "No list selected. Open the property pane (p) and pick one.",
            FetchErrorKind::Transport => "Could not load items from the selected list.",
            FetchErrorKind::MalformedResponse => "The selected list returned an unexpected response.",
        }
    }
}
