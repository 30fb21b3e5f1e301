//! Fakes shared by the engine's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use listpeek_api::{JsonSource, ListRequest};
use listpeek_types::{SelectorOption, TransportError};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::ConfigurationSurface;

/// Replays scripted responses in order and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<ListRequest>>,
}

impl ScriptedSource {
    pub fn with_responses(responses: impl IntoIterator<Item = Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonSource for ScriptedSource {
    async fn get_json(&self, request: &ListRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
    }
}

/// Holds each request open until the test releases it, keyed by request path.
#[derive(Default)]
pub struct GatedSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<Value, TransportError>>>>,
}

impl GatedSource {
    /// Register a gate for `path`; sending on the returned sender resolves the request.
    pub fn gate(&self, path: &str) -> oneshot::Sender<Result<Value, TransportError>> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().insert(path.to_string(), receiver);
        sender
    }
}

#[async_trait]
impl JsonSource for GatedSource {
    async fn get_json(&self, request: &ListRequest) -> Result<Value, TransportError> {
        let receiver = self.gates.lock().unwrap().remove(&request.path);
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".into()))),
            None => Err(TransportError::Network(format!("no gate for {}", request.path))),
        }
    }
}

/// Configuration surface that remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub options: Vec<SelectorOption>,
    pub refreshes: usize,
    pub diagnostics: Vec<String>,
}

impl ConfigurationSurface for RecordingSurface {
    fn publish_options(&mut self, options: Vec<SelectorOption>) {
        self.options = options;
    }

    fn request_refresh(&mut self) {
        self.refreshes += 1;
    }

    fn report_diagnostic(&mut self, message: &str) {
        self.diagnostics.push(message.to_string());
    }
}
