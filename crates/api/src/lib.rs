//! Site REST client utilities.
//!
//! This crate is the network boundary of listpeek. It focuses on:
//!
//! - The [`JsonSource`] seam: an async `GET` that yields parsed JSON, which
//!   the engine depends on instead of a concrete HTTP stack
//! - [`SiteClient`], a `reqwest`-backed implementation bound to a validated
//!   site base URL
//! - Building requests with a consistent User-Agent, OData Accept header, and
//!   optional bearer token
//!
//! # Example
//!
//! ```ignore
//! use listpeek_api::{JsonSource, ListRequest, SiteClient, SiteConfig};
//!
//! async fn lists() -> anyhow::Result<()> {
//!     let client = SiteClient::new(SiteConfig::new("https://contoso.example.com/sites/help"))?;
//!     let payload = client.get_json(&ListRequest::new("/_api/web/lists")).await?;
//!     println!("{payload}");
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use listpeek_types::TransportError;
use reqwest::{Client, RequestBuilder, header};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Environment variable holding an optional bearer token for the site.
pub const ACCESS_TOKEN_ENV: &str = "LISTPEEK_ACCESS_TOKEN";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Ask the site for plain JSON without OData metadata envelopes.
const ODATA_ACCEPT: &str = "application/json;odata=nometadata";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A site-relative `GET` request: path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ListRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter by name.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }
}

/// Async `GET` returning parsed JSON.
///
/// The engine only ever talks to the site through this trait, so tests and
/// alternative transports can stand in for [`SiteClient`].
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(&self, request: &ListRequest) -> Result<Value, TransportError>;
}

/// Connection settings for [`SiteClient`].
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl SiteConfig {
    /// Settings for `base_url`, reading the bearer token from [`ACCESS_TOKEN_ENV`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: env::var(ACCESS_TOKEN_ENV).ok().filter(|token| !token.trim().is_empty()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for one site.
///
/// The client pre-configures default headers and resolves request paths
/// against a validated base URL.
pub struct SiteClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl SiteClient {
    /// Construct a [`SiteClient`] from [`SiteConfig`].
    ///
    /// Non-localhost hosts must use HTTPS. A trailing slash on the base URL is
    /// dropped so site-relative paths can always start with `/`.
    pub fn new(config: SiteConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(ODATA_ACCEPT));
        if let Some(token) = config.access_token.as_deref() {
            let mut value =
                header::HeaderValue::from_str(&format!("Bearer {token}")).context("access token is not a valid header value")?;
            value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("listpeek/0.1; {}", env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and site-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }
}

#[async_trait]
impl JsonSource for SiteClient {
    async fn get_json(&self, request: &ListRequest) -> Result<Value, TransportError> {
        let mut builder = self.request(reqwest::Method::GET, &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        debug!(status = status.as_u16(), bytes = text.len(), path = %request.path, "site responded");
        parse_json_body(&text)
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}

fn parse_json_body(text: &str) -> Result<Value, TransportError> {
    serde_json::from_str(text).map_err(|error| TransportError::Decode(error.to_string()))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid site URL '{}': {}", base, e))?;

    let host_name = parsed_base_url.host_str().ok_or_else(|| anyhow!("site URL must include a host"))?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host_name.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "site URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_base_url_accepts_https_and_localhost() {
        assert!(validate_base_url("https://contoso.example.com/sites/help").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("http://127.0.0.1").is_ok());
    }

    #[test]
    fn validate_base_url_rejects_plain_http_and_garbage() {
        let error = validate_base_url("http://contoso.example.com").unwrap_err();
        assert!(error.to_string().contains("https"));
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn site_client_trims_trailing_slash() {
        let client = SiteClient::new(SiteConfig {
            base_url: "https://contoso.example.com/sites/help/".into(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        })
        .expect("client");
        assert_eq!(client.base_url, "https://contoso.example.com/sites/help");
    }

    /// Serve one canned JSON response on localhost and return the raw request head.
    fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).expect("read");
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&head).to_lowercase()
        });
        (base_url, server)
    }

    #[tokio::test]
    async fn bearer_token_is_sent_with_every_request() {
        let (base_url, server) = serve_once(r#"{"value":[]}"#);
        let client = SiteClient::new(SiteConfig {
            base_url,
            access_token: Some("abc123".into()),
            timeout: DEFAULT_TIMEOUT,
        })
        .expect("client");

        let payload = client.get_json(&ListRequest::new("/_api/web/lists")).await.expect("payload");

        assert_eq!(payload["value"], serde_json::json!([]));
        let head = server.join().expect("server");
        assert!(head.starts_with("get /_api/web/lists "));
        assert!(head.contains("authorization: bearer abc123\r\n"));
        assert!(head.contains("accept: application/json;odata=nometadata\r\n"));
        assert!(head.contains("user-agent: listpeek/0.1"));
    }

    #[tokio::test]
    async fn no_authorization_header_without_token() {
        let (base_url, server) = serve_once(r#"{"value":[]}"#);
        let client = SiteClient::new(SiteConfig {
            base_url,
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        })
        .expect("client");

        client
            .get_json(&ListRequest::new("/_api/web/lists").with_query("$select", "Title"))
            .await
            .expect("payload");

        let head = server.join().expect("server");
        assert!(head.starts_with("get /_api/web/lists?"));
        assert!(head.contains("select=title "));
        assert!(!head.contains("authorization:"));
    }

    #[test]
    fn list_request_keeps_query_order() {
        let request = ListRequest::new("/items")
            .with_query("$filter", "Title eq 'Sam'")
            .with_query("$select", "Title,Answer");
        assert_eq!(request.query_value("$select"), Some("Title,Answer"));
        assert_eq!(request.query[0].0, "$filter");
    }

    #[test]
    fn parse_json_body_reports_decode_errors() {
        assert!(matches!(parse_json_body("<html>"), Err(TransportError::Decode(_))));
        assert_eq!(parse_json_body(r#"{"value":[]}"#).unwrap()["value"], serde_json::json!([]));
    }
}
