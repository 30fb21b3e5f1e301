use listpeek_util::redact_sensitive;
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

const MAX_ENTRIES: usize = 500;

#[derive(Debug)]
pub struct LogsState {
    pub entries: Vec<String>,
    pub is_visible: bool,
    pub list_state: ListState,
    pub container_focus: FocusFlag,
}

impl Default for LogsState {
    fn default() -> Self {
        Self {
            entries: vec!["Welcome to listpeek".into()],
            is_visible: false,
            list_state: ListState::default(),
            container_focus: FocusFlag::named("root.logs"),
        }
    }
}

impl LogsState {
    /// Append a redacted line and keep the newest entry selected.
    pub fn push(&mut self, message: impl AsRef<str>) {
        self.entries.push(redact_sensitive(message.as_ref()));
        if self.entries.len() > MAX_ENTRIES {
            let overflow = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..overflow);
        }
        self.list_state.select(Some(self.entries.len() - 1));
    }

    pub fn toggle_visible(&mut self) {
        self.is_visible = !self.is_visible;
    }

    pub fn scroll_up(&mut self) {
        let selected = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(selected.saturating_sub(1)));
    }

    pub fn scroll_down(&mut self) {
        let last = self.entries.len().saturating_sub(1);
        let selected = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((selected + 1).min(last)));
    }
}

impl HasFocus for LogsState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_lines_are_redacted() {
        let mut logs = LogsState::default();
        logs.push("request failed: Authorization: Bearer secret-token");
        let last = logs.entries.last().expect("entry");
        assert!(!last.contains("secret-token"));
        assert_eq!(logs.list_state.selected(), Some(logs.entries.len() - 1));
    }

    #[test]
    fn entries_are_capped() {
        let mut logs = LogsState::default();
        for index in 0..(MAX_ENTRIES + 10) {
            logs.push(format!("line {index}"));
        }
        assert_eq!(logs.entries.len(), MAX_ENTRIES);
        assert_eq!(logs.entries.last().map(String::as_str), Some("line 509"));
    }
}
