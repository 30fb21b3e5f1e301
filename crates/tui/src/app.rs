//! Application state for the listpeek TUI.
//!
//! `App` is the composition root: it owns the catalog, the persisted
//! selection, the record fetcher, and the overlay controller, and it feeds
//! catalog output into the property pane (the configuration surface).
//! Components call into the methods here and hand the returned effects to
//! the runtime.

use std::rc::Rc;
use std::sync::Arc;

use listpeek_api::JsonSource;
use listpeek_engine::{
    CloseReason, CompletionOutcome, DataSourceCatalog, OverlayController, OverlayState, PointerHub, RecordFetcher, RecordQuery,
    SelectionConfig,
};
use listpeek_types::{Effect, Modal, Msg};
use listpeek_util::WidgetPreferences;
use rat_focus::{Focus, FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tracing::debug;

use crate::ui::components::logs::LogsState;
use crate::ui::components::property_pane::PropertyPaneState;
use crate::ui::components::trigger::TriggerState;
use crate::ui::theme::{self, Theme};

const THROBBER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Host-supplied settings for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Heading rendered at the top of the overlay.
    pub title: String,
    pub query: RecordQuery,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: "Popup Title".into(),
            query: RecordQuery::default(),
        }
    }
}

/// Cross-cutting context shared by every component.
#[derive(Debug)]
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    pub config: WidgetConfig,
}

pub struct App {
    pub ctx: SharedCtx,
    pub catalog: DataSourceCatalog,
    pub selection: SelectionConfig,
    pub fetcher: RecordFetcher,
    pub overlay: OverlayController,
    pub pointer_hub: PointerHub,
    pub trigger: TriggerState,
    pub property_pane: PropertyPaneState,
    pub logs: LogsState,
    pub focus: Rc<Focus>,
    pub open_modal_kind: Option<Modal>,
    pub throbber_idx: usize,
    root_focus: FocusFlag,
}

impl App {
    pub fn new(config: WidgetConfig, source: Arc<dyn JsonSource>, preferences: Arc<WidgetPreferences>) -> Self {
        let pointer_hub = PointerHub::new();
        let fetcher = RecordFetcher::new(Arc::clone(&source)).with_query(config.query.clone());
        let mut app = Self {
            ctx: SharedCtx {
                theme: theme::default_theme(),
                config,
            },
            catalog: DataSourceCatalog::new(source),
            selection: SelectionConfig::load(preferences),
            fetcher,
            overlay: OverlayController::new(pointer_hub.clone()),
            pointer_hub,
            trigger: TriggerState::default(),
            property_pane: PropertyPaneState::default(),
            logs: LogsState::default(),
            focus: Rc::default(),
            open_modal_kind: None,
            throbber_idx: 0,
            root_focus: FocusFlag::named("root"),
        };
        app.focus = Rc::new(FocusBuilder::build_for(&app));
        app.focus.focus(&app.trigger.f_show_popup);
        app
    }

    /// Apply a message from the runtime and return follow-up effects.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_busy() {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER.len();
                }
            }
            Msg::Resize(_, _) => {}
            Msg::CatalogLoaded { generation, result } => {
                self.catalog.apply(generation, result, &mut self.property_pane);
                self.property_pane.sync_cursor(self.selection.current());
            }
            Msg::RecordsFetched(completion) => {
                let outcome = self.overlay.complete(completion, self.selection.current());
                let error_message = match self.overlay.state() {
                    OverlayState::ShownError(kind) if outcome == CompletionOutcome::Applied => Some(kind.user_message()),
                    _ => None,
                };
                if let Some(message) = error_message {
                    self.append_log_message(message);
                }
            }
        }
        self.drain_surface_diagnostics();
        Vec::new()
    }

    /// Open (or re-open) the overlay for the current selection.
    pub fn open_overlay(&mut self) -> Vec<Effect> {
        let ticket = self.overlay.open(self.selection.current());
        vec![Effect::ShowModal(Modal::Popup), Effect::FetchRecords(ticket)]
    }

    pub fn close_overlay(&mut self, reason: CloseReason) -> Vec<Effect> {
        self.overlay.close(reason);
        vec![Effect::CloseModal]
    }

    /// Show or hide the property pane. Showing it starts a catalog refresh.
    pub fn toggle_property_pane(&mut self) -> Vec<Effect> {
        let visible = !self.property_pane.is_visible();
        self.property_pane.set_visible(visible);
        if !visible {
            self.focus_trigger();
            return Vec::new();
        }
        self.property_pane.sync_cursor(self.selection.current());
        vec![Effect::RefreshCatalog]
    }

    pub fn hide_property_pane(&mut self) {
        self.property_pane.set_visible(false);
        self.focus_trigger();
    }

    /// Persist `identifier` as the selection and re-fetch if the overlay shows another source.
    pub fn select_source(&mut self, identifier: String) -> Vec<Effect> {
        let change = self.selection.set_selected(identifier, &mut self.property_pane);
        self.drain_surface_diagnostics();
        if change.is_changed() {
            self.append_log_message(format!("Selected list: {}", change.current.identifier_or_empty()));
        }
        match self.overlay.on_selection_changed(&change) {
            Some(ticket) => vec![Effect::FetchRecords(ticket)],
            None => Vec::new(),
        }
    }

    /// Append a user-facing line to the logs strip. Secrets are redacted.
    pub fn append_log_message(&mut self, message: impl AsRef<str>) {
        self.logs.push(message);
    }

    /// Release everything the widget holds on the host.
    pub fn teardown(&mut self) {
        self.overlay.close(CloseReason::Teardown);
        self.open_modal_kind = None;
        debug!(listeners = self.pointer_hub.listener_count(), "widget torn down");
    }

    /// True while a network task the user is waiting on is running.
    pub fn is_busy(&self) -> bool {
        self.overlay.is_loading() || self.catalog.is_refreshing()
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER[self.throbber_idx % THROBBER.len()]
    }

    fn focus_trigger(&mut self) {
        let old_focus = Rc::unwrap_or_clone(std::mem::take(&mut self.focus));
        self.focus = Rc::new(FocusBuilder::rebuild_for(&*self, Some(old_focus)));
        self.focus.focus(&self.trigger.f_show_popup);
    }

    fn drain_surface_diagnostics(&mut self) {
        for diagnostic in self.property_pane.take_diagnostics() {
            self.logs.push(diagnostic);
        }
    }
}

impl HasFocus for App {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.widget(&self.trigger);
        if self.property_pane.is_visible() {
            builder.widget(&self.property_pane);
        }
        if self.logs.is_visible {
            builder.widget(&self.logs);
        }
    }

    fn focus(&self) -> FocusFlag {
        self.root_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}
