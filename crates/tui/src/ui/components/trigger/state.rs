use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;

/// Focus targets of the widget body.
#[derive(Debug)]
pub struct TriggerState {
    container: FocusFlag,
    pub f_show_popup: FocusFlag,
    pub f_configure: FocusFlag,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            container: FocusFlag::named("trigger"),
            f_show_popup: FocusFlag::named("trigger.show_popup"),
            f_configure: FocusFlag::named("trigger.configure"),
        }
    }
}

impl HasFocus for TriggerState {
    fn build(&self, builder: &mut FocusBuilder) {
        let start = builder.start(self);
        builder.leaf_widget(&self.f_show_popup);
        builder.leaf_widget(&self.f_configure);
        builder.end(start);
    }

    fn focus(&self) -> FocusFlag {
        self.container.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}
