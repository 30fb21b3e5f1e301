//! Record fetching for the selected data source.
//!
//! The query is a fixed filter (`Title eq 'Sam'`) projecting `Title` and
//! `Answer`. [`RecordQuery`] makes the fields replaceable, but the default is
//! the literal the widget has always shipped with.

use std::sync::Arc;

use listpeek_api::{JsonSource, ListRequest};
use listpeek_types::{FetchError, Record};
use listpeek_util::odata;
use serde_json::Value;
use tracing::{debug, warn};

/// Field filter and two-field projection applied to every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub filter_field: String,
    pub filter_value: String,
    /// Projected field rendered as the record label.
    pub label_field: String,
    /// Projected field rendered as the record value.
    pub value_field: String,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            filter_field: "Title".into(),
            filter_value: "Sam".into(),
            label_field: "Title".into(),
            value_field: "Answer".into(),
        }
    }
}

impl RecordQuery {
    /// `$filter` and `$select` parameters, in that order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("$filter".to_string(), odata::eq_filter(&self.filter_field, &self.filter_value)),
            ("$select".to_string(), format!("{},{}", self.label_field, self.value_field)),
        ]
    }
}

/// Items endpoint of the list titled `identifier`.
pub fn items_path(identifier: &str) -> String {
    format!(
        "/_api/web/lists/getbytitle({})/items",
        odata::encode_path_segment(&odata::string_literal(identifier))
    )
}

#[derive(Clone)]
pub struct RecordFetcher {
    source: Arc<dyn JsonSource>,
    query: RecordQuery,
}

impl std::fmt::Debug for RecordFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordFetcher").field("query", &self.query).finish()
    }
}

impl RecordFetcher {
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self {
            source,
            query: RecordQuery::default(),
        }
    }

    pub fn with_query(mut self, query: RecordQuery) -> Self {
        self.query = query;
        self
    }

    pub fn query(&self) -> &RecordQuery {
        &self.query
    }

    /// The request a fetch for `identifier` would issue; `None` for a blank identifier.
    pub fn request_for(&self, identifier: &str) -> Option<ListRequest> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }
        let request = self
            .query
            .query_pairs()
            .into_iter()
            .fold(ListRequest::new(items_path(identifier)), |request, (key, value)| {
                request.with_query(key, value)
            });
        Some(request)
    }

    /// Fetch the records of `identifier`.
    ///
    /// A blank identifier fails with [`FetchError::MissingSource`] without
    /// touching the network.
    pub async fn fetch(&self, identifier: &str) -> Result<Vec<Record>, FetchError> {
        let Some(request) = self.request_for(identifier) else {
            warn!("no data source selected; skipping record fetch");
            return Err(FetchError::MissingSource);
        };

        let payload = self.source.get_json(&request).await.map_err(|error| {
            warn!(identifier, error = %error, "record fetch failed");
            FetchError::from(error)
        })?;
        let records = parse_records(&payload, &self.query)?;
        debug!(identifier, count = records.len(), "fetched records");
        Ok(records)
    }
}

fn parse_records(payload: &Value, query: &RecordQuery) -> Result<Vec<Record>, FetchError> {
    let Some(items) = payload.get("value").and_then(Value::as_array) else {
        warn!("record response is missing its `value` array");
        return Err(FetchError::MalformedResponse);
    };

    items
        .iter()
        .map(|item| {
            if !item.is_object() {
                return Err(FetchError::MalformedResponse);
            }
            Ok(Record {
                label: field_text(item, &query.label_field),
                value: field_text(item, &query.value_field),
            })
        })
        .collect()
}

/// Text of `field`; absent and null fields render empty.
fn field_text(item: &Value, field: &str) -> String {
    match item.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSource;
    use listpeek_types::TransportError;
    use serde_json::json;

    fn fetcher_with(responses: Vec<Result<Value, TransportError>>) -> (RecordFetcher, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource::with_responses(responses));
        (RecordFetcher::new(source.clone()), source)
    }

    #[tokio::test]
    async fn fetch_issues_one_scoped_request() {
        let (fetcher, source) = fetcher_with(vec![Ok(json!({ "value": [{ "Title": "Sam", "Answer": "42" }] }))]);

        let records = fetcher.fetch("FAQ").await.expect("records");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to_string(), "Sam: 42");
        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/_api/web/lists/getbytitle('FAQ')/items");
        assert_eq!(requests[0].query_value("$filter"), Some("Title eq 'Sam'"));
        assert_eq!(requests[0].query_value("$select"), Some("Title,Answer"));
    }

    #[tokio::test]
    async fn blank_identifier_never_touches_the_network() {
        let (fetcher, source) = fetcher_with(vec![]);

        assert_eq!(fetcher.fetch("").await, Err(FetchError::MissingSource));
        assert_eq!(fetcher.fetch("   ").await, Err(FetchError::MissingSource));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_value_is_not_an_error() {
        let (fetcher, _) = fetcher_with(vec![Ok(json!({ "value": [] }))]);
        assert_eq!(fetcher.fetch("FAQ").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_transport_error() {
        let (fetcher, _) = fetcher_with(vec![Err(TransportError::Timeout)]);
        let error = fetcher.fetch("FAQ").await.unwrap_err();
        assert_eq!(error, FetchError::Transport("request timed out".into()));
    }

    #[tokio::test]
    async fn missing_value_is_malformed() {
        let (fetcher, _) = fetcher_with(vec![Ok(json!({ "odata.error": { "code": "-1" } })), Ok(json!({ "value": ["x"] }))]);
        assert_eq!(fetcher.fetch("FAQ").await, Err(FetchError::MalformedResponse));
        assert_eq!(fetcher.fetch("FAQ").await, Err(FetchError::MalformedResponse));
    }

    #[test]
    fn titles_with_quotes_and_spaces_are_escaped() {
        let (fetcher, _) = fetcher_with(vec![]);
        let request = fetcher.request_for("Sam's FAQ").expect("request");
        assert_eq!(request.path, "/_api/web/lists/getbytitle('Sam''s%20FAQ')/items");
    }

    #[test]
    fn null_and_numeric_fields_render_as_text() {
        let payload = json!({ "value": [{ "Title": "Sam", "Answer": null }, { "Title": "Sam", "Answer": 7 }] });
        let records = parse_records(&payload, &RecordQuery::default()).expect("records");
        assert_eq!(records[0].value, "");
        assert_eq!(records[1].value, "7");
    }

    #[test]
    fn custom_query_changes_filter_and_projection() {
        let query = RecordQuery {
            filter_field: "Category".into(),
            filter_value: "Billing".into(),
            label_field: "Question".into(),
            value_field: "Answer".into(),
        };
        let (fetcher, _) = fetcher_with(vec![]);
        let request = fetcher.with_query(query).request_for("FAQ").expect("request");
        assert_eq!(request.query_value("$filter"), Some("Category eq 'Billing'"));
        assert_eq!(request.query_value("$select"), Some("Question,Answer"));
    }
}
