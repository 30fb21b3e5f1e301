//! Discovery of the data sources a site offers.
//!
//! Discovery is restartable: every refresh re-queries the site. A successful
//! refresh replaces the descriptor sequence and republishes the selector
//! options; a failed one keeps the previous sequence and only reports a
//! diagnostic. Nothing here returns an error past [`DataSourceCatalog::apply`].

use std::sync::Arc;

use indexmap::IndexMap;
use listpeek_api::{JsonSource, ListRequest};
use listpeek_types::{DataSourceDescriptor, DiscoveryError, SelectorOption};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ConfigurationSurface;

/// Site-relative endpoint listing every list collection.
pub const LISTS_PATH: &str = "/_api/web/lists";

const TITLE_FIELD: &str = "Title";

/// Query the site for its lists and map each `Title` to a descriptor.
///
/// Descriptors keep discovery order; a repeated title keeps its first position.
pub async fn discover(source: &dyn JsonSource) -> Result<Vec<DataSourceDescriptor>, DiscoveryError> {
    let payload = source.get_json(&ListRequest::new(LISTS_PATH)).await?;
    parse_descriptors(&payload)
}

fn parse_descriptors(payload: &Value) -> Result<Vec<DataSourceDescriptor>, DiscoveryError> {
    let entries = payload
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| DiscoveryError::Malformed("missing `value` array".into()))?;

    let mut descriptors: IndexMap<String, DataSourceDescriptor> = IndexMap::with_capacity(entries.len());
    for entry in entries {
        match entry.get(TITLE_FIELD).and_then(Value::as_str) {
            Some(title) => {
                descriptors
                    .entry(title.to_string())
                    .or_insert_with(|| DataSourceDescriptor::from_title(title));
            }
            None => debug!(entry = %entry, "skipping list entry without a Title"),
        }
    }
    Ok(descriptors.into_values().collect())
}

/// Descriptor state plus the refresh bookkeeping around it.
pub struct DataSourceCatalog {
    source: Arc<dyn JsonSource>,
    descriptors: Vec<DataSourceDescriptor>,
    /// Generation of the most recently started refresh.
    requested_generation: u64,
    /// Generation whose outcome was last applied.
    applied_generation: u64,
    loaded_once: bool,
}

impl std::fmt::Debug for DataSourceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceCatalog")
            .field("descriptors", &self.descriptors)
            .field("requested_generation", &self.requested_generation)
            .field("applied_generation", &self.applied_generation)
            .finish()
    }
}

impl DataSourceCatalog {
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self {
            source,
            descriptors: Vec::new(),
            requested_generation: 0,
            applied_generation: 0,
            loaded_once: false,
        }
    }

    /// Handle to the network client, for running [`discover`] off the UI loop.
    pub fn source(&self) -> Arc<dyn JsonSource> {
        Arc::clone(&self.source)
    }

    /// Query the site without touching the applied descriptors.
    pub async fn discover(&self) -> Result<Vec<DataSourceDescriptor>, DiscoveryError> {
        discover(self.source.as_ref()).await
    }

    /// Mark a new refresh as started and return its generation tag.
    pub fn begin_refresh(&mut self) -> u64 {
        self.requested_generation += 1;
        self.requested_generation
    }

    /// True while a started refresh has not been applied yet.
    pub fn is_refreshing(&self) -> bool {
        self.applied_generation < self.requested_generation
    }

    /// True once any refresh has completed, successfully or not.
    pub fn has_loaded(&self) -> bool {
        self.loaded_once
    }

    /// Apply the outcome of the refresh tagged `generation`.
    ///
    /// Returns `true` when the descriptor sequence was replaced. Outcomes older
    /// than an already-applied generation are dropped.
    pub fn apply(
        &mut self,
        generation: u64,
        outcome: Result<Vec<DataSourceDescriptor>, DiscoveryError>,
        surface: &mut dyn ConfigurationSurface,
    ) -> bool {
        if generation < self.applied_generation {
            debug!(generation, applied = self.applied_generation, "dropping out-of-order catalog refresh");
            return false;
        }
        self.applied_generation = generation;
        self.loaded_once = true;

        match outcome {
            Ok(descriptors) => {
                info!(count = descriptors.len(), "data source catalog refreshed");
                self.descriptors = descriptors;
                surface.publish_options(self.selector_options());
                surface.request_refresh();
                true
            }
            Err(error) => {
                warn!(error = %error, "data source catalog refresh failed; keeping previous lists");
                surface.report_diagnostic(&format!("Could not load lists: {error}"));
                surface.request_refresh();
                false
            }
        }
    }

    /// Discover and apply in one step. Never fails; see [`Self::apply`].
    pub async fn refresh(&mut self, surface: &mut dyn ConfigurationSurface) -> bool {
        let generation = self.begin_refresh();
        let outcome = self.discover().await;
        self.apply(generation, outcome, surface)
    }

    /// Descriptors in discovery order.
    pub fn descriptors(&self) -> impl Iterator<Item = &DataSourceDescriptor> {
        self.descriptors.iter()
    }

    pub fn selector_options(&self) -> Vec<SelectorOption> {
        self.descriptors.iter().map(DataSourceDescriptor::selector_option).collect()
    }
}
