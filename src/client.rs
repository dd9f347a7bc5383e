//! Client executor: builds the request URL from a contract route, dispatches
//! it through the transport, and decodes the response against the declared
//! schemas.
//!
//! Success bodies are decoded strictly: a 2xx payload that fails the success
//! schema is a broken contract and the call fails. Error bodies are decoded
//! best-effort: a mismatch is swallowed so it can never mask the original
//! transport failure.

use crate::contract::ContractRoute;
use crate::error::{ClientError, TransportError};
use crate::transport::{ReqwestTransport, Transport, TransportConfig, TransportRequest};
use crate::typed::{self, DecodeError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-call transport overrides, shallow-merged over the client defaults.
#[derive(Debug, Clone, Default)]
pub struct CallConfig {
    /// Headers layered over the client's default headers.
    pub headers: HashMap<String, String>,
    /// Timeout override for this call only.
    pub timeout: Option<Duration>,
}

/// Call-time arguments for one [`ApiClient::execute`] invocation.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Path placeholder substitutions: `[name]` → value.
    pub params: HashMap<String, String>,
    /// Query-string source (a JSON object; arrays serialize as repeated
    /// keys).
    pub query: Option<Value>,
    /// JSON request payload.
    pub body: Option<Value>,
    /// Explicit headers; these win over [`CallConfig::headers`].
    pub headers: HashMap<String, String>,
    /// Per-call transport overrides.
    pub config: Option<CallConfig>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path placeholder substitution.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the query-string source object.
    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Set the JSON request payload.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add an explicit header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the per-call transport overrides.
    #[must_use]
    pub fn with_config(mut self, config: CallConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A (possibly schema-decoded) successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lowercase names).
    pub headers: HashMap<String, String>,
    /// Payload; when the route declares a success schema this is the
    /// schema-validated value.
    pub data: Value,
}

impl ApiResponse {
    /// Deserialize the validated payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload does not fit `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        typed::decode(&self.data)
    }
}

/// Outbound request executor bound to one transport configuration.
///
/// One `ApiClient` models one logical backend target; a process may hold
/// several independent clients. Nothing is mutated across calls, so a client
/// is freely shareable between threads.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Build a client with the default reqwest transport.
    ///
    /// `Content-Type: application/json` is added to the default headers when
    /// the config does not set one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(mut config: TransportConfig) -> Result<Self, TransportError> {
        config
            .headers
            .entry("content-type".to_string())
            .or_insert_with(|| "application/json".to_string());
        Ok(Self {
            transport: Arc::new(ReqwestTransport::new(config)?),
        })
    }

    /// Build a client over any transport implementation (test seam and
    /// custom stacks).
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute one contract route: construct the URL, dispatch, decode.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] re-raises transport failures, with the
    /// payload replaced by the parsed error-schema value when the contract
    /// declares one that matches (best effort — a mismatch preserves the
    /// original payload). [`ClientError::ContractViolation`] reports a 2xx
    /// body that fails the declared success schema.
    pub fn execute(
        &self,
        route: &ContractRoute,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let url = substitute_path_params(&route.path, &options.params);
        let call = options.config.unwrap_or_default();

        // Call-config headers first, explicit headers win.
        let mut headers = call.headers;
        headers.extend(options.headers);

        let request = TransportRequest {
            method: route.method,
            url: url.clone(),
            query: options.query.as_ref().map(query_pairs).unwrap_or_default(),
            headers,
            body: options.body,
            timeout: call.timeout,
        };

        debug!(method = %route.method, url = %url, "executing contract route");
        match self.transport.send(request) {
            Ok(mut response) => {
                if let Some(schema) = route.definition.response.success_schema() {
                    response.data = schema.parse(&response.data).map_err(|err| {
                        warn!(
                            method = %route.method,
                            url = %url,
                            violations = err.violations.len(),
                            "success response violates contract"
                        );
                        ClientError::ContractViolation(err)
                    })?;
                }
                Ok(ApiResponse {
                    status: response.status,
                    headers: response.headers,
                    data: response.data,
                })
            }
            Err(mut err) => {
                if let Some(schema) = route.definition.response.error_schema() {
                    if let TransportError::Status { data, .. } = &mut err {
                        // Best effort: a mismatch keeps the original payload.
                        if let Ok(decoded) = schema.parse(data) {
                            *data = decoded;
                        }
                    }
                }
                Err(ClientError::Transport(err))
            }
        }
    }
}

/// Replace every `[key]` occurrence in `template` for every present param.
/// Keys absent from the map leave their placeholder untouched; a malformed
/// URL is a caller bug surfaced downstream, not validated here.
fn substitute_path_params(template: &str, params: &HashMap<String, String>) -> String {
    let mut url = template.to_string();
    for (key, value) in params {
        url = url.replace(&format!("[{key}]"), value);
    }
    url
}

/// Serialize a JSON object into ordered query pairs. Arrays become repeated
/// keys (the inverse of the server-side flattening); `null` values are
/// skipped; nested objects serialize as compact JSON.
fn query_pairs(query: &Value) -> Vec<(String, String)> {
    let Some(object) = query.as_object() else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_to_string(other))),
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
