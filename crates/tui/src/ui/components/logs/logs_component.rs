use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use listpeek_types::Effect;
use listpeek_util::truncate_with_ellipsis;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::text::Span;
use ratatui::widgets::{List, ListItem};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

/// Read-only strip of user-facing diagnostics.
#[derive(Debug, Default)]
pub struct LogsComponent {
    area: Rect,
}

impl Component for LogsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.logs.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => app.logs.scroll_down(),
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::BackTab => {
                app.focus.prev();
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if !self.area.contains(Position::new(mouse.column, mouse.row)) {
            return Vec::new();
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => app.logs.scroll_up(),
            MouseEventKind::ScrollDown => app.logs.scroll_down(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        self.area = rect;
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Logs"), app.logs.container_focus.get());
        let width = usize::from(block.inner(rect).width.saturating_sub(2));
        let items: Vec<ListItem> = app
            .logs
            .entries
            .iter()
            .map(|entry| ListItem::new(Span::styled(truncate_with_ellipsis(entry, width), theme.text_secondary_style())))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selection_style())
            .highlight_symbol("› ");
        frame.render_stateful_widget(list, rect, &mut app.logs.list_state);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" ↑/↓", " Scroll ")])
    }
}
