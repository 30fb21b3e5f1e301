use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use listpeek_types::Effect;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph, Wrap};

use super::state::{FIELD_LABEL, GROUP_NAME, PANE_DESCRIPTION};
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

/// Side pane with the single-choice list selector.
#[derive(Debug, Default)]
pub struct PropertyPaneComponent {
    list_area: Rect,
}

impl PropertyPaneComponent {
    fn select_cursor(&self, app: &mut App) -> Vec<Effect> {
        match app.property_pane.cursor_option() {
            Some(option) => {
                let identifier = option.key.clone();
                app.select_source(identifier)
            }
            None => Vec::new(),
        }
    }

    fn row_at(&self, app: &App, position: Position) -> Option<usize> {
        if !self.list_area.contains(position) {
            return None;
        }
        let index = app.property_pane.list_offset() + usize::from(position.y - self.list_area.y);
        (index < app.property_pane.options().len()).then_some(index)
    }
}

impl Component for PropertyPaneComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.property_pane.select_previous();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.property_pane.select_next();
                Vec::new()
            }
            KeyCode::Enter => self.select_cursor(app),
            KeyCode::Char('r') => vec![Effect::RefreshCatalog],
            KeyCode::Esc => {
                app.hide_property_pane();
                Vec::new()
            }
            KeyCode::Tab => {
                app.focus.next();
                Vec::new()
            }
            KeyCode::BackTab => {
                app.focus.prev();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(index) = self.row_at(app, Position::new(mouse.column, mouse.row)) else {
                    return Vec::new();
                };
                app.focus.focus(&app.property_pane.f_selector);
                app.property_pane.list_state_mut().select(Some(index));
                self.select_cursor(app)
            }
            MouseEventKind::ScrollDown if self.list_area.contains(Position::new(mouse.column, mouse.row)) => {
                app.property_pane.select_next();
                Vec::new()
            }
            MouseEventKind::ScrollUp if self.list_area.contains(Position::new(mouse.column, mouse.row)) => {
                app.property_pane.select_previous();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.property_pane.f_selector.get();
        let block = th::block(theme, Some(GROUP_NAME), focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [description_area, label_area, list_area, ..] = self.get_preferred_layout(app, inner)[..] else {
            return;
        };
        self.list_area = list_area;

        frame.render_widget(
            Paragraph::new(Span::styled(PANE_DESCRIPTION, theme.text_muted_style())).wrap(Wrap { trim: true }),
            description_area,
        );

        let mut label = vec![Span::styled(FIELD_LABEL, theme.text_secondary_style().add_modifier(Modifier::BOLD))];
        if app.catalog.is_refreshing() {
            label.push(Span::styled(format!(" {}", app.throbber()), theme.text_muted_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(label)), label_area);

        if !app.catalog.has_loaded() {
            frame.render_widget(Paragraph::new(Span::styled("Loading lists…", theme.text_muted_style())), list_area);
            return;
        }
        if app.property_pane.options().is_empty() {
            frame.render_widget(Paragraph::new(Span::styled("No lists found.", theme.text_muted_style())), list_area);
            return;
        }

        let selected = app.selection.current().identifier().map(str::to_string);
        let items: Vec<ListItem> = app
            .property_pane
            .options()
            .iter()
            .map(|option| {
                let marker = if selected.as_deref() == Some(option.key.as_str()) { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, theme.status_success()),
                    Span::styled(option.text.clone(), theme.text_primary_style()),
                ]))
            })
            .collect();
        let list = List::new(items).highlight_style(theme.selection_style()).highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, app.property_pane.list_state_mut());
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[(" ↑/↓", " Navigate "), (" Enter", " Select "), (" r", " Reload lists "), (" Esc", " Close pane ")],
        )
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::vertical([
            Constraint::Length(2), // Description
            Constraint::Length(1), // Field label
            Constraint::Min(1),    // Options
        ])
        .split(area)
        .to_vec()
    }
}
