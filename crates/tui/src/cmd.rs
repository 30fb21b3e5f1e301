//! # Command Execution Layer
//!
//! Translates application effects ([`Effect`]) into commands ([`Cmd`]) and
//! runs them. This is where the pure state of [`App`] meets the network:
//!
//! - [`from_effects`] turns the network-bound effects into [`Cmd`]s. Effects
//!   that need no I/O resolve straight into a [`Msg`].
//! - [`run_from_effects`] spawns the async work on Tokio and returns the
//!   pending tasks alongside the messages that are ready immediately.
//!
//! A task that panics or is aborted still resolves to the message its work
//! would have produced, as a failure, so the overlay and the catalog always
//! leave their loading states.
//!
//! Navigation effects (`ShowModal`, `CloseModal`) and `Quit` are handled by
//! the runtime before anything reaches this module.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use listpeek_api::JsonSource;
use listpeek_engine::{RecordFetcher, catalog};
use listpeek_types::{DiscoveryError, Effect, FetchCompletion, FetchError, FetchTicket, Msg, TransportError};
use tokio::task::{JoinError, JoinHandle, spawn};
use tracing::{debug, error, warn};

use crate::app::App;

/// Side-effectful work executed outside of state updates.
pub enum Cmd {
    /// Discover the site's lists for catalog refresh `generation`.
    DiscoverLists { generation: u64, source: Arc<dyn JsonSource> },
    /// Fetch the records the ticket names.
    FetchRecords { ticket: FetchTicket, fetcher: RecordFetcher },
    /// A message that is ready without any I/O.
    Deliver(Msg),
}

impl std::fmt::Debug for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cmd::DiscoverLists { generation, .. } => f.debug_struct("DiscoverLists").field("generation", generation).finish(),
            Cmd::FetchRecords { ticket, .. } => f.debug_struct("FetchRecords").field("ticket", ticket).finish(),
            Cmd::Deliver(msg) => f.debug_tuple("Deliver").field(msg).finish(),
        }
    }
}

/// What a spawned task was doing, kept to answer for it if the task dies.
#[derive(Debug, Clone)]
enum TaskKind {
    Discovery { generation: u64 },
    Fetch { ticket: FetchTicket },
}

impl TaskKind {
    fn failed(&self, join_error: JoinError) -> Msg {
        error!(task = ?self, error = %join_error, "background task failed");
        let message = format!("background task failed: {join_error}");
        match self {
            TaskKind::Discovery { generation } => Msg::CatalogLoaded {
                generation: *generation,
                result: Err(DiscoveryError::Transport(TransportError::Network(message))),
            },
            TaskKind::Fetch { ticket } => Msg::RecordsFetched(FetchCompletion {
                ticket: ticket.clone(),
                result: Err(FetchError::Transport(message)),
            }),
        }
    }
}

/// A spawned command. Resolves to the message for the app, including when
/// the task panicked or was aborted.
#[derive(Debug)]
pub struct PendingTask {
    handle: JoinHandle<Msg>,
    kind: TaskKind,
}

impl PendingTask {
    fn spawn<F>(kind: TaskKind, work: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Self {
            handle: spawn(work),
            kind,
        }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for PendingTask {
    type Output = Msg;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Msg> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(msg)) => Poll::Ready(msg),
            Poll::Ready(Err(join_error)) => Poll::Ready(self.kind.failed(join_error)),
        }
    }
}

/// Results of running a batch of commands.
#[derive(Debug, Default)]
pub struct CommandBatch {
    /// Spawned tasks; each yields the message to feed back into the app.
    pub pending: Vec<PendingTask>,
    /// Messages that resolved without spawning.
    pub immediate: Vec<Msg>,
}

/// Convert effects into commands.
///
/// A catalog refresh bumps the catalog generation here, so only the result of
/// the last requested discovery is applied. A fetch for a blank identifier
/// resolves to [`FetchError::MissingSource`] without a task.
pub fn from_effects(app: &mut App, effects: Vec<Effect>) -> Vec<Cmd> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::RefreshCatalog => Some(Cmd::DiscoverLists {
                generation: app.catalog.begin_refresh(),
                source: app.catalog.source(),
            }),
            Effect::FetchRecords(ticket) => {
                if app.fetcher.request_for(&ticket.identifier).is_none() {
                    return Some(Cmd::Deliver(Msg::RecordsFetched(FetchCompletion {
                        ticket,
                        result: Err(FetchError::MissingSource),
                    })));
                }
                Some(Cmd::FetchRecords {
                    ticket,
                    fetcher: app.fetcher.clone(),
                })
            }
            Effect::ShowModal(_) | Effect::CloseModal | Effect::Quit => {
                warn!(?effect, "effect reached the command layer unhandled");
                None
            }
        })
        .collect()
}

/// Spawn the commands derived from `effects`.
pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in from_effects(app, effects) {
        match command {
            Cmd::DiscoverLists { generation, source } => {
                debug!(generation, "starting list discovery");
                batch.pending.push(PendingTask::spawn(TaskKind::Discovery { generation }, async move {
                    let result = catalog::discover(source.as_ref()).await;
                    Msg::CatalogLoaded { generation, result }
                }));
            }
            Cmd::FetchRecords { ticket, fetcher } => {
                debug!(sequence = ticket.sequence, identifier = %ticket.identifier, "starting record fetch");
                let kind = TaskKind::Fetch { ticket: ticket.clone() };
                batch.pending.push(PendingTask::spawn(kind, async move {
                    let result = fetcher.fetch(&ticket.identifier).await;
                    Msg::RecordsFetched(FetchCompletion { ticket, result })
                }));
            }
            Cmd::Deliver(msg) => batch.immediate.push(msg),
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use listpeek_types::{FetchErrorKind, Record};
    use serde_json::json;

    use super::*;
    use crate::app::test_support::{ScriptedSource, app_with};

    #[tokio::test]
    async fn refresh_runs_discovery_for_current_generation() {
        let source = Arc::new(ScriptedSource::with_responses([Ok(json!({
            "value": [{ "Title": "FAQ" }, { "Title": "News" }]
        }))]));
        let mut app = app_with(Arc::clone(&source));

        let mut batch = run_from_effects(&mut app, vec![Effect::RefreshCatalog]);

        assert!(batch.immediate.is_empty());
        let msg = batch.pending.remove(0).await;
        let Msg::CatalogLoaded { generation, result } = msg else {
            panic!("expected catalog message");
        };
        assert!(app.catalog.is_refreshing());
        app.update(Msg::CatalogLoaded { generation, result });
        assert_eq!(app.property_pane.options().len(), 2);
        assert!(!app.catalog.is_refreshing());
    }

    #[tokio::test]
    async fn fetch_issues_filtered_items_request() {
        let source = Arc::new(ScriptedSource::with_responses([Ok(json!({
            "value": [{ "Title": "Sam", "Answer": "42" }]
        }))]));
        let mut app = app_with(Arc::clone(&source));
        app.select_source("FAQ".into());
        let ticket = match app.open_overlay().remove(1) {
            Effect::FetchRecords(ticket) => ticket,
            other => panic!("unexpected effect {other:?}"),
        };

        let mut batch = run_from_effects(&mut app, vec![Effect::FetchRecords(ticket)]);
        let msg = batch.pending.remove(0).await;
        app.update(msg);

        assert_eq!(
            app.overlay.records(),
            &[Record {
                label: "Sam".into(),
                value: "42".into()
            }]
        );
        let paths = source.paths.lock().unwrap();
        assert_eq!(paths.as_slice(), ["/_api/web/lists/getbytitle('FAQ')/items"]);
    }

    #[tokio::test]
    async fn blank_selection_resolves_without_network() {
        let source = Arc::new(ScriptedSource::default());
        let mut app = app_with(Arc::clone(&source));
        let effects = app.open_overlay();

        let batch = run_from_effects(&mut app, effects.into_iter().filter(|e| matches!(e, Effect::FetchRecords(_))).collect());

        assert!(batch.pending.is_empty());
        assert_eq!(batch.immediate.len(), 1);
        for msg in batch.immediate {
            app.update(msg);
        }
        assert_eq!(
            app.overlay.state(),
            &listpeek_engine::OverlayState::ShownError(FetchErrorKind::MissingSource)
        );
        assert!(source.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_the_last_refresh_is_applied() {
        let source = Arc::new(ScriptedSource::with_responses([
            Ok(json!({ "value": [{ "Title": "Old" }] })),
            Ok(json!({ "value": [{ "Title": "New" }] })),
        ]));
        let mut app = app_with(Arc::clone(&source));

        let first = run_from_effects(&mut app, vec![Effect::RefreshCatalog]);
        let first_msg = first.pending.into_iter().next().expect("task").await;
        let second = run_from_effects(&mut app, vec![Effect::RefreshCatalog]);
        let second_msg = second.pending.into_iter().next().expect("task").await;

        app.update(second_msg);
        app.update(first_msg);

        let keys: Vec<&str> = app.property_pane.options().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["New"]);
    }

    #[tokio::test]
    async fn aborted_fetch_still_ends_loading_with_transport_error() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        app.select_source("FAQ".into());
        let ticket = match app.open_overlay().remove(1) {
            Effect::FetchRecords(ticket) => ticket,
            other => panic!("unexpected effect {other:?}"),
        };

        let task = PendingTask::spawn(TaskKind::Fetch { ticket }, std::future::pending());
        task.abort();
        app.update(task.await);

        assert_eq!(
            app.overlay.state(),
            &listpeek_engine::OverlayState::ShownError(FetchErrorKind::Transport)
        );
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn panicked_discovery_still_ends_refresh() {
        let mut app = app_with(Arc::new(ScriptedSource::default()));
        let generation = app.catalog.begin_refresh();

        let task = PendingTask::spawn(TaskKind::Discovery { generation }, async move {
            if generation > 0 {
                panic!("discovery blew up");
            }
            Msg::Tick
        });
        let msg = task.await;
        assert!(matches!(&msg, Msg::CatalogLoaded { result: Err(_), .. }));
        app.update(msg);

        assert!(!app.catalog.is_refreshing());
        assert!(app.catalog.has_loaded());
        assert!(!app.is_busy());
        assert!(app.logs.entries.iter().any(|line| line.contains("Could not load lists")));
    }
}
