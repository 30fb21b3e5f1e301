//! Overlay state machine.
//!
//! ```text
//! Hidden --open--> Loading --fetch ok--> Shown(records) | ShownEmpty
//!                          --fetch err-> ShownError(kind)
//! any visible state --close (control, outside click, teardown)--> Hidden
//! ```
//!
//! Every fetch carries a [`FetchTicket`]. A completion is applied only when
//! its ticket is the one in flight and its identifier still matches the
//! current selection; anything else is a stale result and is discarded.
//! The root pointer subscription is held exactly while the state is not
//! `Hidden`.

use listpeek_types::{FetchCompletion, FetchErrorKind, FetchTicket, OverlayVisibility, PointerEvent, Record, Region, SelectionState};
use tracing::{debug, info};

use crate::pointer::{PointerHub, PointerSubscription};
use crate::selection::SelectionChange;

const POINTER_OWNER: &str = "overlay";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Hidden,
    Loading {
        identifier: String,
    },
    Shown(Vec<Record>),
    ShownEmpty,
    ShownError(FetchErrorKind),
}

impl OverlayState {
    pub fn visibility(&self) -> OverlayVisibility {
        match self {
            OverlayState::Hidden => OverlayVisibility::Hidden,
            _ => OverlayVisibility::Visible,
        }
    }
}

/// What closed the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseControl,
    OutsideClick,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The overlay was closed before the fetch resolved.
    Hidden,
    /// A newer fetch was issued after this one.
    Superseded,
    /// The selection moved away from the fetched identifier.
    SelectionChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    Discarded(DiscardReason),
}

#[derive(Debug)]
pub struct OverlayController {
    state: OverlayState,
    hub: PointerHub,
    observer: Option<PointerSubscription>,
    in_flight: Option<FetchTicket>,
    next_sequence: u64,
    region: Option<Region>,
}

impl OverlayController {
    pub fn new(hub: PointerHub) -> Self {
        Self {
            state: OverlayState::Hidden,
            hub,
            observer: None,
            in_flight: None,
            next_sequence: 0,
            region: None,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn visibility(&self) -> OverlayVisibility {
        self.state.visibility()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility() == OverlayVisibility::Visible
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, OverlayState::Loading { .. })
    }

    /// Records currently rendered; empty for every state but `Shown`.
    pub fn records(&self) -> &[Record] {
        match &self.state {
            OverlayState::Shown(records) => records,
            _ => &[],
        }
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    pub fn is_observing_pointer(&self) -> bool {
        self.observer.is_some()
    }

    /// Open (or re-open) the overlay and issue a fetch for the current selection.
    ///
    /// The caller runs the returned ticket through the record fetcher and
    /// reports back via [`Self::complete`].
    pub fn open(&mut self, selection: &SelectionState) -> FetchTicket {
        if self.observer.is_none() {
            self.observer = Some(self.hub.subscribe(POINTER_OWNER));
        }
        let ticket = self.issue(selection);
        info!(identifier = %ticket.identifier, sequence = ticket.sequence, "overlay opened");
        ticket
    }

    /// React to a selection change: re-fetch when visible and the identifier differs.
    pub fn on_selection_changed(&mut self, change: &SelectionChange) -> Option<FetchTicket> {
        if !self.is_visible() || !change.is_changed() {
            return None;
        }
        let ticket = self.issue(&change.current);
        debug!(identifier = %ticket.identifier, sequence = ticket.sequence, "selection changed; re-fetching");
        Some(ticket)
    }

    fn issue(&mut self, selection: &SelectionState) -> FetchTicket {
        self.next_sequence += 1;
        let ticket = FetchTicket {
            sequence: self.next_sequence,
            identifier: selection.identifier_or_empty().to_string(),
        };
        self.state = OverlayState::Loading {
            identifier: ticket.identifier.clone(),
        };
        self.in_flight = Some(ticket.clone());
        ticket
    }

    /// Apply a resolved fetch, unless it is stale.
    pub fn complete(&mut self, completion: FetchCompletion, selection: &SelectionState) -> CompletionOutcome {
        let FetchCompletion { ticket, result } = completion;
        let reason = if !self.is_visible() {
            Some(DiscardReason::Hidden)
        } else if self.in_flight.as_ref() != Some(&ticket) {
            Some(DiscardReason::Superseded)
        } else if !selection.matches(&ticket.identifier) {
            Some(DiscardReason::SelectionChanged)
        } else {
            None
        };
        if let Some(reason) = reason {
            debug!(identifier = %ticket.identifier, sequence = ticket.sequence, ?reason, "discarding stale fetch result");
            return CompletionOutcome::Discarded(reason);
        }

        self.in_flight = None;
        self.state = match result {
            Ok(records) if records.is_empty() => OverlayState::ShownEmpty,
            Ok(records) => OverlayState::Shown(records),
            Err(error) => OverlayState::ShownError(error.kind()),
        };
        CompletionOutcome::Applied
    }

    /// Record where the overlay was drawn, for outside-click hit testing.
    pub fn set_region(&mut self, region: Region) {
        if self.is_visible() {
            self.region = Some(region);
        }
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// Route a pointer press observed on the root surface.
    ///
    /// Returns `true` when the press landed outside the overlay and closed it.
    /// Without a live subscription the event is ignored.
    pub fn handle_pointer_down(&mut self, event: PointerEvent) -> bool {
        if self.observer.is_none() {
            return false;
        }
        let Some(region) = self.region else {
            return false;
        };
        if region.contains(event.column, event.row) {
            return false;
        }
        self.close(CloseReason::OutsideClick);
        true
    }

    /// Hide the overlay, discard any fetched data, and release the pointer subscription.
    pub fn close(&mut self, reason: CloseReason) {
        if !self.is_visible() {
            return;
        }
        self.state = OverlayState::Hidden;
        self.in_flight = None;
        self.region = None;
        self.observer = None;
        debug!(?reason, "overlay closed");
    }
}
