use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use listpeek_types::Effect;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

const SHOW_POPUP_LABEL: &str = "Show Popup";
const CONFIGURE_LABEL: &str = "Configure";

/// The widget body: current selection plus the trigger and configure buttons.
#[derive(Debug, Default)]
pub struct TriggerComponent {
    show_popup_area: Rect,
    configure_area: Rect,
}

impl TriggerComponent {
    fn activate_focused(&self, app: &mut App) -> Vec<Effect> {
        if app.trigger.f_configure.get() {
            return app.toggle_property_pane();
        }
        app.open_overlay()
    }
}

impl Component for TriggerComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab => {
                app.focus.next();
                Vec::new()
            }
            KeyCode::BackTab => {
                app.focus.prev();
                Vec::new()
            }
            KeyCode::Enter => self.activate_focused(app),
            KeyCode::Char('s') => app.open_overlay(),
            KeyCode::Char('q') => vec![Effect::Quit],
            _ => Vec::new(),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let position = Position::new(mouse.column, mouse.row);
        if self.show_popup_area.contains(position) {
            app.focus.focus(&app.trigger.f_show_popup);
            return app.open_overlay();
        }
        if self.configure_area.contains(position) {
            app.focus.focus(&app.trigger.f_configure);
            return app.toggle_property_pane();
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.trigger.f_show_popup.get() || app.trigger.f_configure.get();
        let block = th::block(theme, Some("listpeek"), focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [status_area, _, buttons_area, ..] = self.get_preferred_layout(app, inner)[..] else {
            return;
        };

        let selection = app.selection.current();
        let status = match selection.identifier() {
            Some(identifier) => Line::from(vec![
                Span::styled("Selected list: ", theme.text_secondary_style()),
                Span::styled(identifier.to_string(), theme.text_primary_style()),
            ]),
            None => Line::from(Span::styled("No list selected", theme.text_muted_style())),
        };
        frame.render_widget(Paragraph::new(status), status_area);

        let [show_popup_area, _, configure_area] = Layout::horizontal([
            Constraint::Length(SHOW_POPUP_LABEL.len() as u16 + 4),
            Constraint::Length(2),
            Constraint::Length(CONFIGURE_LABEL.len() as u16 + 4),
        ])
        .areas(buttons_area);
        th::render_button(frame, show_popup_area, SHOW_POPUP_LABEL, app.trigger.f_show_popup.get(), theme);
        th::render_button(frame, configure_area, CONFIGURE_LABEL, app.trigger.f_configure.get(), theme);
        self.show_popup_area = show_popup_area;
        self.configure_area = configure_area;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                (" Tab", " Focus "),
                (" Enter", " Activate "),
                (" s", " Show popup "),
                (" p", " Configure "),
                (" q", " Quit "),
            ],
        )
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::vertical([
            Constraint::Length(1), // Selection status
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Buttons
            Constraint::Min(0),
        ])
        .split(area)
        .to_vec()
    }
}
