use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use listpeek_types::{Effect, Modal, Msg, PointerEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use super::components::{Component, LogsComponent, PopupComponent, PropertyPaneComponent, TriggerComponent};
use super::theme::theme_helpers as th;
use super::utils::centered_min;
use crate::app::App;

pub struct ModalLayout(Box<dyn Fn(Rect) -> Rect>);

impl std::fmt::Debug for ModalLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModalLayout")
    }
}

type ModalView = (Box<dyn Component>, ModalLayout);

/// Root view: routes input and lays out the widget body, property pane,
/// logs strip, and the open modal.
#[derive(Default)]
pub struct MainView {
    pub trigger_view: TriggerComponent,
    pub property_pane_view: PropertyPaneComponent,
    pub logs_view: LogsComponent,
    /// Currently open modal component
    pub modal_view: Option<ModalView>,
}

impl std::fmt::Debug for MainView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainView")
            .field("modal_open", &self.modal_view.is_some())
            .finish()
    }
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the open modal kind (use None to clear).
    ///
    /// Not meant to be called directly; emit `Effect::ShowModal` or
    /// `Effect::CloseModal` instead.
    pub fn set_open_modal_kind(&mut self, app: &mut App, modal: Option<Modal>) {
        self.modal_view = modal.map(|kind| match kind {
            Modal::Popup => (
                Box::new(PopupComponent::default()) as Box<dyn Component>,
                ModalLayout(Box::new(|rect| centered_min(60, 60, 36, 8, rect))),
            ),
        });
        app.open_modal_kind = modal;
    }

    pub fn restore_focus(&mut self, app: &mut App) {
        app.focus.first();
    }

    fn routes_to_property_pane(app: &App, key: &KeyEvent) -> bool {
        if !app.property_pane.is_visible() {
            return false;
        }
        // Esc belongs to the overlay while it is up.
        if app.overlay.is_visible() {
            return key.code != KeyCode::Esc;
        }
        app.property_pane.f_selector.get()
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some((modal, _)) = self.modal_view.as_mut() {
            effects.extend(modal.handle_message(app, msg));
        }
        effects.extend(app.update(msg.clone()));
        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.logs.toggle_visible();
            return Vec::new();
        }

        if key.code == KeyCode::Char('p') && key.modifiers.is_empty() {
            return app.toggle_property_pane();
        }

        // An open pane keeps receiving keys while the overlay is up.
        if Self::routes_to_property_pane(app, &key) {
            return self.property_pane_view.handle_key_events(app, key);
        }

        if let Some((modal, _)) = self.modal_view.as_mut() {
            return modal.handle_key_events(app, key);
        }

        if app.logs.is_visible && app.logs.container_focus.get() {
            return self.logs_view.handle_key_events(app, key);
        }

        self.trigger_view.handle_key_events(app, key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        let is_press = matches!(mouse.kind, MouseEventKind::Down(_));

        // Root pointer surface: only consulted while something is subscribed.
        let closed_by_outside_press = is_press
            && app.pointer_hub.has_listeners()
            && app.overlay.handle_pointer_down(PointerEvent {
                column: mouse.column,
                row: mouse.row,
            });
        if closed_by_outside_press {
            effects.push(Effect::CloseModal);
        } else if let Some((modal, _)) = self.modal_view.as_mut()
            && app.overlay.is_visible()
        {
            effects.extend(modal.handle_mouse_events(app, mouse));
            if app.property_pane.is_visible() {
                effects.extend(self.property_pane_view.handle_mouse_events(app, mouse));
            }
            return effects;
        }

        // The press that dismissed the overlay still reaches what lies beneath it.
        effects.extend(self.trigger_view.handle_mouse_events(app, mouse));
        if app.property_pane.is_visible() {
            effects.extend(self.property_pane_view.handle_mouse_events(app, mouse));
        }
        if app.logs.is_visible {
            effects.extend(self.logs_view.handle_mouse_events(app, mouse));
        }
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let background = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(background, area);

        let layout = self.get_preferred_layout(app, area);
        let (widget_area, pane_area, logs_area, hints_area) = (layout[0], layout[1], layout[2], layout[3]);

        self.trigger_view.render(frame, widget_area, app);
        if app.property_pane.is_visible() {
            self.property_pane_view.render(frame, pane_area, app);
        }
        if app.logs.is_visible {
            self.logs_view.render(frame, logs_area, app);
        }

        let hint_spans = self.get_hint_spans(app);
        let hints_widget = Paragraph::new(Line::from(hint_spans)).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints_widget, hints_area);

        if let Some((modal, position)) = self.modal_view.as_mut() {
            render_overlay(frame, widget_area, app);
            let modal_area = position.0(widget_area);
            modal.render(frame, modal_area, app);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans: Vec<Span> = vec![Span::styled("Hints: ", app.ctx.theme.text_muted_style())];

        if app.property_pane.f_selector.get() && app.property_pane.is_visible() {
            hint_spans.extend(self.property_pane_view.get_hint_spans(app));
        } else if let Some((modal, _)) = self.modal_view.as_ref() {
            hint_spans.extend(modal.get_hint_spans(app));
        } else if app.logs.is_visible && app.logs.container_focus.get() {
            hint_spans.extend(self.logs_view.get_hint_spans(app));
        } else {
            hint_spans.extend(self.trigger_view.get_hint_spans(app));
        }

        hint_spans.extend(th::build_hint_spans(
            &*app.ctx.theme,
            &[(" Ctrl+L", " Toggle logs "), (" Ctrl+C", " Exit ")],
        ));
        hint_spans
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let [content_area, hints_area] = Layout::vertical([
            Constraint::Min(1),    // Widget, pane, logs
            Constraint::Length(1), // Hints bar
        ])
        .areas(area);

        let pane_width = if app.property_pane.is_visible() { 40 } else { 0 };
        let [left_area, pane_area] = Layout::horizontal([
            Constraint::Min(1),              // Widget body (+ logs)
            Constraint::Length(pane_width), // Property pane
        ])
        .areas(content_area);

        let logs_constraint = if app.logs.is_visible {
            Constraint::Percentage(35)
        } else {
            Constraint::Length(0)
        };
        let [widget_area, logs_area] = Layout::vertical([Constraint::Min(1), logs_constraint]).areas(left_area);

        vec![widget_area, pane_area, logs_area, hints_area]
    }
}

/// Dim the widget body behind an open modal.
fn render_overlay(frame: &mut Frame, area: Rect, app: &App) {
    frame.render_widget(Block::default().style(app.ctx.theme.modal_background_style()).dim(), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyEventKind, KeyEventState, MouseButton};
    use listpeek_engine::OverlayState;
    use listpeek_types::{FetchCompletion, Record};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::app::test_support::{ScriptedSource, app_with};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Apply navigation effects the way the runtime does and drop the rest.
    fn apply_navigation(view: &mut MainView, app: &mut App, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::ShowModal(modal) => view.set_open_modal_kind(app, Some(*modal)),
                Effect::CloseModal => view.set_open_modal_kind(app, None),
                _ => {}
            }
        }
    }

    fn draw(view: &mut MainView, app: &mut App, terminal: &mut Terminal<TestBackend>) -> String {
        terminal.draw(|frame| view.render(frame, frame.area(), app)).expect("draw");
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn open_with_records(view: &mut MainView, app: &mut App, records: Vec<Record>) {
        app.select_source("FAQ".into());
        let effects = app.open_overlay();
        apply_navigation(view, app, &effects);
        let Some(Effect::FetchRecords(ticket)) = effects.into_iter().find(|e| matches!(e, Effect::FetchRecords(_))) else {
            panic!("expected fetch");
        };
        view.handle_message(
            app,
            &Msg::RecordsFetched(FetchCompletion {
                ticket,
                result: Ok(records),
            }),
        );
    }

    #[test]
    fn popup_renders_heading_records_and_close_control() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        open_with_records(
            &mut view,
            &mut app,
            vec![Record {
                label: "Sam".into(),
                value: "42".into(),
            }],
        );

        let screen = draw(&mut view, &mut app, &mut terminal);

        assert!(screen.contains("Popup Title"));
        assert!(screen.contains("Sam: 42"));
        assert!(screen.contains("[ X ]"));
        assert!(app.overlay.region().is_some());
    }

    #[test]
    fn empty_result_renders_no_record_lines() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        open_with_records(&mut view, &mut app, Vec::new());

        let screen = draw(&mut view, &mut app, &mut terminal);

        assert_eq!(app.overlay.state(), &OverlayState::ShownEmpty);
        assert!(screen.contains("No items found."));
        assert!(!screen.contains("Sam:"));
    }

    #[test]
    fn outside_press_closes_overlay_and_releases_listener() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        open_with_records(&mut view, &mut app, Vec::new());
        draw(&mut view, &mut app, &mut terminal);

        let effects = view.handle_mouse_events(&mut app, press(0, 0));
        apply_navigation(&mut view, &mut app, &effects);

        assert!(!app.overlay.is_visible());
        assert!(view.modal_view.is_none());
        assert_eq!(app.pointer_hub.listener_count(), 0);
    }

    #[test]
    fn inside_press_keeps_overlay_open() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        open_with_records(&mut view, &mut app, Vec::new());
        draw(&mut view, &mut app, &mut terminal);
        let region = app.overlay.region().expect("region");

        let effects = view.handle_mouse_events(&mut app, press(region.x + 2, region.y + region.height - 2));

        assert!(effects.is_empty());
        assert!(app.overlay.is_visible());
    }

    #[test]
    fn escape_closes_overlay_through_close_control() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        open_with_records(&mut view, &mut app, Vec::new());

        let effects = view.handle_key_events(&mut app, key(KeyCode::Esc));
        apply_navigation(&mut view, &mut app, &effects);

        assert!(!app.overlay.is_visible());
        assert!(!app.pointer_hub.has_listeners());
    }

    #[test]
    fn pane_shows_loading_until_first_discovery() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");

        let effects = view.handle_key_events(&mut app, key(KeyCode::Char('p')));
        assert_eq!(effects, vec![Effect::RefreshCatalog]);
        let generation = app.catalog.begin_refresh();
        let screen = draw(&mut view, &mut app, &mut terminal);
        assert!(screen.contains("Loading lists…"));
        assert!(screen.contains("Select a list"));

        view.handle_message(
            &mut app,
            &Msg::CatalogLoaded {
                generation,
                result: Ok(vec![
                    listpeek_types::DataSourceDescriptor::from_title("Announcements"),
                    listpeek_types::DataSourceDescriptor::from_title("FAQ"),
                ]),
            },
        );
        let screen = draw(&mut view, &mut app, &mut terminal);
        assert!(screen.contains("Announcements"));
        assert!(!screen.contains("Loading lists…"));
    }

    #[test]
    fn pane_keys_still_work_while_overlay_is_visible() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let mut view = MainView::new();
        view.handle_key_events(&mut app, key(KeyCode::Char('p')));
        let generation = app.catalog.begin_refresh();
        view.handle_message(
            &mut app,
            &Msg::CatalogLoaded {
                generation,
                result: Ok(vec![
                    listpeek_types::DataSourceDescriptor::from_title("FAQ"),
                    listpeek_types::DataSourceDescriptor::from_title("News"),
                ]),
            },
        );
        open_with_records(&mut view, &mut app, Vec::new());

        view.handle_key_events(&mut app, key(KeyCode::Down));
        let effects = view.handle_key_events(&mut app, key(KeyCode::Enter));

        assert_eq!(app.selection.current().identifier(), Some("News"));
        assert!(matches!(effects.as_slice(), [Effect::FetchRecords(ticket)] if ticket.identifier == "News"));
        assert!(app.overlay.is_loading());
    }
}
