//! Popup overlay component.
//!
//! Renders whatever the [`OverlayController`](listpeek_engine::OverlayController)
//! currently holds and reports its drawn region back to it, so presses
//! outside that region can be detected on the root surface.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use listpeek_engine::{CloseReason, OverlayState};
use listpeek_types::{Effect, Region};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

const CLOSE_LABEL: &str = "[ X ]";

#[derive(Debug, Default)]
pub struct PopupComponent {
    close_area: Rect,
}

impl PopupComponent {
    fn body_lines(app: &App) -> Vec<ListItem<'static>> {
        let theme = &*app.ctx.theme;
        match app.overlay.state() {
            OverlayState::Hidden => Vec::new(),
            OverlayState::Loading { identifier } => {
                let text = if identifier.is_empty() {
                    format!("{} Loading…", app.throbber())
                } else {
                    format!("{} Loading items from {identifier}…", app.throbber())
                };
                vec![ListItem::new(Span::styled(text, theme.text_muted_style()))]
            }
            OverlayState::Shown(records) => records
                .iter()
                .map(|record| ListItem::new(Span::styled(record.to_string(), theme.text_primary_style())))
                .collect(),
            OverlayState::ShownEmpty => vec![ListItem::new(Span::styled("No items found.", theme.text_muted_style()))],
            OverlayState::ShownError(kind) => vec![ListItem::new(Span::styled(kind.user_message(), theme.status_error()))],
        }
    }
}

impl Component for PopupComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => app.close_overlay(CloseReason::CloseControl),
            _ => Vec::new(),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) && self.close_area.contains(Position::new(mouse.column, mouse.row)) {
            return app.close_overlay(CloseReason::CloseControl);
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        app.overlay.set_region(Region::new(rect.x, rect.y, rect.width, rect.height));
        frame.render_widget(Clear, rect);

        let theme = &*app.ctx.theme;
        let block = th::block(theme, None, true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [header_area, _, body_area, ..] = self.get_preferred_layout(app, inner)[..] else {
            return;
        };

        let close_width = CLOSE_LABEL.width() as u16;
        let [heading_area, close_area] = Layout::horizontal([Constraint::Min(1), Constraint::Length(close_width)]).areas(header_area);
        let heading = Paragraph::new(Line::from(Span::styled(
            app.ctx.config.title.clone(),
            theme.text_primary_style().add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(heading, heading_area);
        frame.render_widget(Paragraph::new(Span::styled(CLOSE_LABEL, theme.accent_emphasis_style())), close_area);
        self.close_area = close_area;

        if let OverlayState::ShownError(kind) = app.overlay.state() {
            let message = Paragraph::new(Span::styled(kind.user_message(), theme.status_error())).wrap(Wrap { trim: true });
            frame.render_widget(message, body_area);
            return;
        }
        frame.render_widget(List::new(Self::body_lines(app)), body_area);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" Esc", " Close "), (" Click outside", " Dismiss ")])
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::vertical([
            Constraint::Length(1), // Heading + close control
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Records
        ])
        .split(area)
        .to_vec()
    }
}
