//! The Transport capability: one request in, one response (or structured
//! failure) out.
//!
//! The client executor treats HTTP dispatch as an abstract capability behind
//! the [`Transport`] trait; [`ReqwestTransport`] is the default binding.
//! A transport instance models one logical backend target and is constructed
//! once per [`ApiClient`](crate::client::ApiClient); it owns the default
//! configuration (base URL, default headers, timeout) while the request
//! carries per-call overrides.

use crate::contract::Method;
use crate::error::TransportError;
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Default configuration for one logical backend target.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Base URL request paths are resolved against. When absent, request
    /// URLs must be absolute.
    pub base_url: Option<String>,
    /// Headers sent on every request (per-call headers override these).
    pub headers: HashMap<String, String>,
    /// Default request timeout. `None` leaves the transport's own default.
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// A config with the given base URL and no other defaults.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `WIREPACT_BASE_URL` and `WIREPACT_TIMEOUT_MS` (milliseconds,
    /// decimal). Unset or unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("WIREPACT_BASE_URL").ok();
        let timeout = env::var("WIREPACT_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis);
        Self {
            base_url,
            headers: HashMap::new(),
            timeout,
        }
    }
}

/// One outbound request as the executor hands it to the transport.
///
/// `headers` are the merged per-call headers; the transport layers them over
/// its configured defaults (per-call wins). `timeout` overrides the
/// configured default for this call only.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Constructed URL (path resolved against the config base URL, or
    /// absolute).
    pub url: String,
    /// Query-string pairs, in order.
    pub query: Vec<(String, String)>,
    /// Per-call headers (override configured defaults).
    pub headers: HashMap<String, String>,
    /// JSON payload, if any.
    pub body: Option<Value>,
    /// Per-call timeout override.
    pub timeout: Option<Duration>,
}

/// A completed 2xx exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lowercase names).
    pub headers: HashMap<String, String>,
    /// Decoded JSON payload (raw text wrapped in a JSON string when the body
    /// is not valid JSON; `null` for an empty body).
    pub data: Value,
}

/// Abstract HTTP dispatch: exactly one request/response cycle per call.
///
/// Implementations decide nothing about contracts; they move bytes and
/// report non-2xx outcomes as [`TransportError::Status`] with the decoded
/// payload attached.
pub trait Transport: Send + Sync {
    /// Issue one request.
    ///
    /// # Errors
    ///
    /// [`TransportError::Status`] for completed non-2xx exchanges,
    /// [`TransportError::Network`] when the request never completed,
    /// [`TransportError::InvalidRequest`] when it could not be constructed.
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Default [`Transport`] backed by a blocking `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Build a transport for one backend target.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] when the underlying client cannot
    /// be constructed.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Network)?;
        Ok(Self { client, config })
    }

    fn resolve_url(&self, raw: &str) -> Result<url::Url, TransportError> {
        let resolved = match &self.config.base_url {
            Some(base) => url::Url::parse(base)
                .and_then(|base| base.join(raw))
                .map_err(|err| TransportError::InvalidRequest(format!("{base}: {err}")))?,
            None => url::Url::parse(raw)
                .map_err(|err| TransportError::InvalidRequest(format!("{raw}: {err}")))?,
        };
        Ok(resolved)
    }
}

/// Decode a response body the way the executor expects payloads: JSON when
/// possible, the raw text as a JSON string otherwise, `null` when empty.
fn decode_body(text: String) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.resolve_url(&request.url)?;
        let mut builder = self.client.request(http::Method::from(request.method), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // Defaults first, per-call overrides win.
        let mut headers = self.config.headers.clone();
        headers.extend(request.headers);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %request.method, url = %request.url, "sending transport request");
        let response = builder.send().map_err(TransportError::Network)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();
        let data = decode_body(response.text().map_err(TransportError::Network)?);

        if (200..300).contains(&status) {
            Ok(TransportResponse {
                status,
                headers,
                data,
            })
        } else {
            warn!(status = status, url = %request.url, "transport request failed");
            Err(TransportError::Status {
                status,
                headers,
                data,
            })
        }
    }
}
