//! Runtime: unified event loop and input routing for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop over input, ticks, and background tasks.
//! - Route input to [`MainView`] and execute the returned `Effect`s.
//! - Tear the widget down (overlay closed, pointer listener released) before
//!   the terminal is restored.
//!
//! Ticking: a fast interval (100 ms) only while a discovery or fetch is in
//! flight so the throbber animates; a long interval (5 s) otherwise.
use anyhow::Result;
use crossterm::event::MouseEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use listpeek_api::JsonSource;
use listpeek_types::{Effect, Msg};
use listpeek_util::WidgetPreferences;
use rat_focus::FocusBuilder;
use ratatui::{Terminal, prelude::*};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::app::{App, WidgetConfig};
use crate::cmd;
use crate::ui::components::Component;
use crate::ui::main_component::MainView;

type PendingTasks = FuturesUnordered<cmd::PendingTask>;

/// Spawn a task that reads terminal input and forwards it over a channel.
///
/// Mouse moves are throttled to one per 16 ms.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    let mut last_mouse_move = Instant::now();

    tokio::spawn(async move {
        let sixteen_ms = Duration::from_millis(16);
        loop {
            if !event::poll(sixteen_ms).unwrap_or(false) {
                if sender.is_closed() {
                    break;
                }
                continue;
            }
            match event::read() {
                Ok(event) => {
                    let is_mouse_move = event.as_mouse_event().is_some_and(|e| e.kind == MouseEventKind::Moved);
                    if is_mouse_move {
                        if last_mouse_move.elapsed() < sixteen_ms {
                            continue;
                        }
                        last_mouse_move = Instant::now();
                    }
                    if let Err(e) = sender.send(event).await {
                        debug!("input channel closed: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read event: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    // Rebuild focus just before rendering so structure changes are reflected
    let old_focus = std::mem::take(&mut app.focus);
    app.focus = Rc::new(FocusBuilder::rebuild_for(app, Some(Rc::unwrap_or_clone(old_focus))));
    if app.focus.focused().is_none() {
        main_view.restore_focus(app);
    }
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, &Msg::Resize(width, height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Entry point for the TUI runtime: sets up the terminal, runs the event
/// loop, and performs teardown and cleanup on exit.
pub async fn run_app(config: WidgetConfig, source: Arc<dyn JsonSource>, preferences: Arc<WidgetPreferences>) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut main_view = MainView::new();
    let mut app = App::new(config, source, preferences);
    if let Some(identifier) = app.selection.current().identifier() {
        info!(identifier, "restored data source selection");
    }
    let mut terminal = setup_terminal()?;

    let mut pending_tasks = PendingTasks::new();
    let mut effects: Vec<Effect> = Vec::with_capacity(4);

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    // Some terminals drop resize notifications; poll the size as a fallback.
    let mut last_size: Option<(u16, u16)> = crossterm::terminal::size().ok();

    loop {
        let target_interval = if app.is_busy() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        let mut needs_render = tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
                        break;
                    }
                effects.extend(handle_input_event(&mut app, &mut main_view, event));
                true
            }

            _ = ticker.tick() => {
                let was_busy = app.is_busy();
                effects.extend(main_view.handle_message(&mut app, &Msg::Tick));
                was_busy
            }

            Some(msg) = pending_tasks.next(), if !pending_tasks.is_empty() => {
                effects.extend(main_view.handle_message(&mut app, &msg));
                true
            }

            _ = signal::ctrl_c() => { break; }
        };

        if !effects.is_empty() {
            let mut effects_to_process = std::mem::take(&mut effects);
            if take_quit(&mut effects_to_process) {
                break;
            }
            handle_navigation_effects(&mut app, &mut main_view, &mut effects_to_process);
            process_effects(&mut app, &mut main_view, effects_to_process, &mut pending_tasks, &mut effects);
            needs_render = true;
        }

        if let Ok((w, h)) = crossterm::terminal::size()
            && last_size != Some((w, h))
        {
            last_size = Some((w, h));
            effects.extend(main_view.handle_message(&mut app, &Msg::Resize(w, h)));
            needs_render = true;
        }

        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    app.teardown();
    main_view.set_open_modal_kind(&mut app, None);
    for task in pending_tasks.iter() {
        task.abort();
    }
    cleanup_terminal(&mut terminal)?;
    Ok(())
}

/// Remove every `Quit`; true when at least one was present.
fn take_quit(effects: &mut Vec<Effect>) -> bool {
    effects.extract_if(0.., |effect| matches!(effect, Effect::Quit)).count() > 0
}

fn handle_navigation_effects(app: &mut App, main_view: &mut MainView, effects: &mut Vec<Effect>) {
    let navigation_effects = effects
        .extract_if(0.., |effect| matches!(effect, Effect::ShowModal(_) | Effect::CloseModal))
        .collect::<Vec<Effect>>();

    for effect in navigation_effects {
        match effect {
            Effect::ShowModal(modal) => main_view.set_open_modal_kind(app, Some(modal)),
            Effect::CloseModal => main_view.set_open_modal_kind(app, None),
            _ => {}
        }
    }
}

fn process_effects(
    app: &mut App,
    main_view: &mut MainView,
    effects: Vec<Effect>,
    pending_tasks: &mut PendingTasks,
    effects_out: &mut Vec<Effect>,
) {
    if effects.is_empty() {
        return;
    }

    let command_batch = cmd::run_from_effects(app, effects);
    pending_tasks.extend(command_batch.pending);
    for msg in command_batch.immediate {
        effects_out.extend(main_view.handle_message(app, &msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_is_extracted_and_other_effects_kept() {
        let mut effects = vec![Effect::RefreshCatalog, Effect::Quit, Effect::CloseModal];
        assert!(take_quit(&mut effects));
        assert_eq!(effects, vec![Effect::RefreshCatalog, Effect::CloseModal]);
        assert!(!take_quit(&mut effects));
    }
}
