//! Server handler wrapper: converts a framework request into validated,
//! typed arguments for business logic.
//!
//! [`route`] wraps a business handler in a fixed, short-circuiting pipeline:
//! query → body → params, first failure wins and becomes a 400 response with
//! a machine-readable `{error, details}` body. Validation failures never
//! escape the wrapper as errors.

use crate::contract::{Method, RouteDefinition};
use crate::error::Violations;
use crate::schema::Schema;
use crate::typed::{self, DecodeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum inline response headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated response header storage. Header names are `Arc<str>`
/// because they repeat across responses (content-type, cache-control, ...).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The inbound request as the framework delivers it.
///
/// The body is carried raw: JSON decoding is the wrapper's job, because a
/// malformed body must become a 400, not a framework-level failure.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path (no query string).
    pub path: String,
    /// Request headers (lowercase names).
    pub headers: HashMap<String, String>,
    /// Raw query string, without the leading `?`.
    pub raw_query: String,
    /// Raw request body, if one was sent.
    pub body: Option<String>,
}

impl ServerRequest {
    /// A request with the given method and path and nothing else.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            raw_query: String::new(),
            body: None,
        }
    }

    /// Set the raw query string.
    #[must_use]
    pub fn with_query(mut self, raw_query: impl Into<String>) -> Self {
        self.raw_query = raw_query.into();
        self
    }

    /// Set the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header (name stored lowercase).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Framework-supplied route params: delivered either up front or lazily.
///
/// Some frameworks hand params over synchronously, others only on demand;
/// both flow through the single [`PathParams::resolve`] point before
/// validation.
pub enum PathParams {
    /// Params available immediately.
    Ready(HashMap<String, String>),
    /// Params produced on demand.
    Deferred(Box<dyn FnOnce() -> HashMap<String, String> + Send>),
}

impl PathParams {
    /// Resolve the params, invoking the deferred producer if necessary.
    #[must_use]
    pub fn resolve(self) -> HashMap<String, String> {
        match self {
            PathParams::Ready(map) => map,
            PathParams::Deferred(produce) => produce(),
        }
    }
}

impl Default for PathParams {
    fn default() -> Self {
        PathParams::Ready(HashMap::new())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PathParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        PathParams::Ready(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Per-invocation context the framework passes alongside the request.
#[derive(Default)]
pub struct RouteContext {
    /// Route params extracted by the framework's own matcher.
    pub params: PathParams,
}

impl RouteContext {
    /// A context carrying the given params.
    #[must_use]
    pub fn with_params(params: PathParams) -> Self {
        Self { params }
    }
}

/// Fully-validated arguments handed to the business handler. Each field is
/// populated only when the route definition declares the matching schema.
#[derive(Debug, Clone, Default)]
pub struct HandlerArgs {
    /// Validated flattened query object.
    pub query: Option<Value>,
    /// Validated JSON body.
    pub body: Option<Value>,
    /// Validated route-params object.
    pub params: Option<Value>,
}

impl HandlerArgs {
    /// Deserialize the validated query into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the value does not fit `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<Option<T>, DecodeError> {
        self.query.as_ref().map(|v| typed::decode(v)).transpose()
    }

    /// Deserialize the validated body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the value does not fit `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<Option<T>, DecodeError> {
        self.body.as_ref().map(|v| typed::decode(v)).transpose()
    }

    /// Deserialize the validated params into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the value does not fit `T`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<Option<T>, DecodeError> {
        self.params.as_ref().map(|v| typed::decode(v)).transpose()
    }
}

/// Response data handed back to the framework: status, headers, JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct ServerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON.
    pub body: Value,
}

impl ServerResponse {
    /// A response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with a `content-type: application/json` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a header by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            entry.1 = value;
        } else {
            self.headers.push((Arc::from(name), value));
        }
    }
}

/// Extra metadata for a [`Responder`]-constructed response.
#[derive(Debug, Clone, Default)]
pub struct ResponseInit {
    /// Status code; defaults to 200 when unset.
    pub status: Option<u16>,
    /// Additional headers.
    pub headers: Vec<(String, String)>,
}

impl ResponseInit {
    /// An init carrying only a status code.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response-construction helper handed to the business handler.
///
/// Both methods simply build a JSON response with the given init metadata;
/// no schema validation happens at this boundary — the contract's typing is
/// the only enforcement here.
pub struct Responder;

impl Responder {
    /// Build a success-shaped JSON response (status defaults to 200).
    #[must_use]
    pub fn success(&self, body: Value, init: ResponseInit) -> ServerResponse {
        build_response(body, init)
    }

    /// Build an error-shaped JSON response (status defaults to 200; pass an
    /// explicit status via `init`).
    #[must_use]
    pub fn error(&self, body: Value, init: ResponseInit) -> ServerResponse {
        build_response(body, init)
    }
}

fn build_response(body: Value, init: ResponseInit) -> ServerResponse {
    let mut response = ServerResponse::json(init.status.unwrap_or(200), body);
    for (name, value) in init.headers {
        response.set_header(&name, value);
    }
    response
}

/// Flatten a raw query string into a JSON object: a key seen once maps to a
/// scalar string, a key seen more than once maps to an ordered array of its
/// values (first seen first).
#[must_use]
pub fn flatten_query(raw_query: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        let key = key.into_owned();
        let value = Value::String(value.into_owned());
        match out.get_mut(&key) {
            None => {
                out.insert(key, value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    out
}

/// A wrapped business handler: the framework-compatible entry point the
/// server mounts for one route definition.
pub struct RouteHandler<F> {
    definition: RouteDefinition,
    handler: F,
}

/// Wrap `handler` in the validation pipeline declared by `definition`.
///
/// The returned [`RouteHandler::handle`] extracts and validates query, body,
/// and route params in that fixed order, short-circuits to a 400 response on
/// the first failure, and otherwise invokes `handler` with the validated
/// arguments and a [`Responder`]. The handler's response is returned
/// unmodified.
pub fn route<F>(definition: RouteDefinition, handler: F) -> RouteHandler<F>
where
    F: Fn(&ServerRequest, &Responder, HandlerArgs) -> ServerResponse,
{
    RouteHandler {
        definition,
        handler,
    }
}

impl<F> RouteHandler<F>
where
    F: Fn(&ServerRequest, &Responder, HandlerArgs) -> ServerResponse,
{
    /// The route definition this handler validates against.
    #[must_use]
    pub fn definition(&self) -> &RouteDefinition {
        &self.definition
    }

    /// Process one request: validate declared stages, then dispatch.
    #[must_use]
    pub fn handle(&self, request: ServerRequest, context: RouteContext) -> ServerResponse {
        let mut args = HandlerArgs::default();

        if let Some(schema) = &self.definition.query {
            let flattened = Value::Object(flatten_query(&request.raw_query));
            match validate_stage(schema, &flattened, "query", &request) {
                Ok(value) => args.query = Some(value),
                Err(violations) => {
                    return stage_failure("Invalid query params", &violations);
                }
            }
        }

        if let Some(schema) = &self.definition.body {
            let decoded = match request.body.as_deref().map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => value,
                _ => {
                    warn!(method = %request.method, path = %request.path, "request body is not valid JSON");
                    return ServerResponse::json(400, json!({"error": "Invalid JSON body"}));
                }
            };
            match validate_stage(schema, &decoded, "body", &request) {
                Ok(value) => args.body = Some(value),
                Err(violations) => {
                    return stage_failure("Invalid body", &violations);
                }
            }
        }

        if let Some(schema) = &self.definition.params {
            let raw = context.params.resolve();
            let object: Map<String, Value> = raw
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            match validate_stage(schema, &Value::Object(object), "params", &request) {
                Ok(value) => args.params = Some(value),
                Err(violations) => {
                    return stage_failure("Invalid route params", &violations);
                }
            }
        }

        debug!(method = %request.method, path = %request.path, "request validated, dispatching handler");
        (self.handler)(&request, &Responder, args)
    }
}

fn validate_stage(
    schema: &Schema,
    value: &Value,
    stage: &str,
    request: &ServerRequest,
) -> Result<Value, Violations> {
    schema.safe_parse(value).map_err(|violations| {
        warn!(
            method = %request.method,
            path = %request.path,
            stage = stage,
            violations = violations.len(),
            "request validation failed"
        );
        violations
    })
}

fn stage_failure(error: &str, violations: &Violations) -> ServerResponse {
    ServerResponse::json(400, json!({"error": error, "details": violations}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_query_single_key_is_scalar() {
        let flat = flatten_query("limit=10&offset=20");
        assert_eq!(flat.get("limit"), Some(&json!("10")));
        assert_eq!(flat.get("offset"), Some(&json!("20")));
    }

    #[test]
    fn flatten_query_repeated_key_is_ordered_array() {
        let flat = flatten_query("tag=a&tag=b&tag=c");
        assert_eq!(flat.get("tag"), Some(&json!(["a", "b", "c"])));
    }

    #[test]
    fn flatten_query_decodes_percent_encoding() {
        let flat = flatten_query("name=Jo%C3%A3o+Silva");
        assert_eq!(flat.get("name"), Some(&json!("João Silva")));
    }

    #[test]
    fn flatten_query_empty_string_is_empty_object() {
        assert!(flatten_query("").is_empty());
    }

    #[test]
    fn json_response_carries_content_type() {
        let response = ServerResponse::json(200, json!({"ok": true}));
        assert_eq!(response.get_header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut response = ServerResponse::json(200, json!({}));
        response.set_header("Content-Type", "text/plain");
        assert_eq!(response.get_header("content-type"), Some("text/plain"));
        assert_eq!(response.headers.len(), 1);
    }

    #[test]
    fn responder_applies_init_status_and_headers() {
        let response = Responder.success(
            json!({"id": "1"}),
            ResponseInit::status(201).with_header("location", "/things/1"),
        );
        assert_eq!(response.status, 201);
        assert_eq!(response.get_header("location"), Some("/things/1"));

        let response = Responder.error(json!({"message": "x"}), ResponseInit::default());
        assert_eq!(response.status, 200);
    }

    #[test]
    fn deferred_params_resolve_on_demand() {
        let params = PathParams::Deferred(Box::new(|| {
            let mut map = HashMap::new();
            map.insert("id".to_string(), "42".to_string());
            map
        }));
        assert_eq!(params.resolve().get("id").map(String::as_str), Some("42"));
    }
}
