use listpeek_engine::ConfigurationSurface;
use listpeek_types::{SelectionState, SelectorOption};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

pub const PANE_DESCRIPTION: &str = "Choose the list whose entries the popup shows";
pub const GROUP_NAME: &str = "Data source";
pub const FIELD_LABEL: &str = "Select a list";

/// Selector options and cursor for the property pane.
///
/// This is the [`ConfigurationSurface`] the engine publishes into. Diagnostics
/// are queued until the app moves them into the logs strip.
#[derive(Debug)]
pub struct PropertyPaneState {
    visible: bool,
    options: Vec<SelectorOption>,
    list_state: ListState,
    redraw_requests: u64,
    pending_diagnostics: Vec<String>,
    container: FocusFlag,
    pub f_selector: FocusFlag,
}

impl Default for PropertyPaneState {
    fn default() -> Self {
        Self {
            visible: false,
            options: Vec::new(),
            list_state: ListState::default(),
            redraw_requests: 0,
            pending_diagnostics: Vec::new(),
            container: FocusFlag::named("property_pane"),
            f_selector: FocusFlag::named("property_pane.selector"),
        }
    }
}

impl PropertyPaneState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }

    pub fn list_offset(&self) -> usize {
        self.list_state.offset()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Option under the cursor.
    pub fn cursor_option(&self) -> Option<&SelectorOption> {
        self.options.get(self.list_state.selected()?)
    }

    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(index) => (index + 1) % self.options.len(),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let previous = match self.list_state.selected() {
            Some(0) | None => self.options.len() - 1,
            Some(index) => index - 1,
        };
        self.list_state.select(Some(previous));
    }

    /// Put the cursor on the option matching `selection`, or the first option.
    pub fn sync_cursor(&mut self, selection: &SelectionState) {
        let position = selection
            .identifier()
            .and_then(|identifier| self.options.iter().position(|option| option.key == identifier));
        let fallback = (!self.options.is_empty()).then_some(0);
        self.list_state.select(position.or(fallback));
    }

    /// Number of redraws the engine asked for.
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_diagnostics)
    }
}

impl ConfigurationSurface for PropertyPaneState {
    fn publish_options(&mut self, options: Vec<SelectorOption>) {
        self.options = options;
        if self.list_state.selected().is_some_and(|index| index >= self.options.len()) {
            self.list_state.select(None);
        }
    }

    fn request_refresh(&mut self) {
        self.redraw_requests += 1;
    }

    fn report_diagnostic(&mut self, message: &str) {
        self.pending_diagnostics.push(message.to_string());
    }
}

impl HasFocus for PropertyPaneState {
    fn build(&self, builder: &mut FocusBuilder) {
        let start = builder.start(self);
        builder.leaf_widget(&self.f_selector);
        builder.end(start);
    }

    fn focus(&self) -> FocusFlag {
        self.container.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}
