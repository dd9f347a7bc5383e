//! # wirepact
//!
//! Contract-driven request/response validation for JSON-over-HTTP APIs: one
//! declarative description of a route's accepted inputs (path params, query
//! params, body) and possible outputs (success/error payloads) drives both
//! client-side request construction and server-side request validation, so
//! both sides of the wire validate byte-for-byte the same way.
//!
//! ## Architecture
//!
//! Three components, each depending only on the shared [`Schema`] capability:
//!
//! - **[`contract`](mod@contract)** — assembles a mapping from HTTP method to
//!   a route definition (schemas + path) into an immutable, introspectable
//!   [`Contract`]. Leaf component; pure.
//! - **[`client`]** — [`ApiClient::execute`] substitutes path parameters into
//!   the URL template, dispatches through the [`Transport`], and decodes the
//!   response against the declared success schema (strict) or error schema
//!   (best effort).
//! - **[`server`]** — [`route`] wraps a business handler with a fixed
//!   query → body → params validation pipeline that short-circuits to 400
//!   `{error, details}` responses and otherwise invokes the handler with
//!   fully-validated arguments and a [`Responder`].
//!
//! Supporting modules: [`schema`] (precompiled JSON Schema validators),
//! [`transport`] (the HTTP dispatch capability and its reqwest binding),
//! [`typed`] (serde extraction of validated payloads), [`error`] (the
//! failure taxonomy).
//!
//! ## Failure semantics
//!
//! - Server-side validation failures never escape the handler wrapper; they
//!   become 400 responses with machine-readable bodies.
//! - Client-side transport failures and success-schema mismatches always
//!   propagate to the caller.
//! - Client-side error-schema decode failures never propagate: the original
//!   transport error is preserved and re-raised.
//!
//! ## Server quick start
//!
//! ```rust
//! use serde_json::json;
//! use wirepact::{
//!     contract, route, Method, ResponseContract, ResponseInit, RouteContext,
//!     RouteDefinition, Schema, ServerRequest,
//! };
//!
//! let id_object = Schema::new(json!({
//!     "type": "object",
//!     "properties": {"id": {"type": "string"}},
//!     "required": ["id"]
//! }))?;
//!
//! let users = contract(
//!     "/api/users/[id]",
//!     [(
//!         Method::Get,
//!         RouteDefinition::new(ResponseContract::success(id_object.clone()))
//!             .with_params(id_object.clone()),
//!     )],
//! );
//!
//! let handler = route(
//!     users.get(Method::Get).unwrap().definition.clone(),
//!     |_request, respond, args| {
//!         respond.success(args.params.clone().unwrap(), ResponseInit::default())
//!     },
//! );
//!
//! let response = handler.handle(
//!     ServerRequest::new(Method::Get, "/api/users/42"),
//!     RouteContext::with_params([("id", "42")].into()),
//! );
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, json!({"id": "42"}));
//! # Ok::<(), wirepact::SchemaError>(())
//! ```
//!
//! ## Client quick start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use wirepact::{
//!     contract, ApiClient, Method, RequestOptions, ResponseContract,
//!     RouteDefinition, Schema, TransportConfig,
//! };
//!
//! let user = Schema::new(json!({
//!     "type": "object",
//!     "properties": {
//!         "id": {"type": "string"},
//!         "name": {"type": "string"},
//!         "email": {"type": "string"}
//!     },
//!     "required": ["id", "name", "email"]
//! }))?;
//!
//! let users = contract(
//!     "/api/users/[id]",
//!     [(Method::Get, RouteDefinition::new(ResponseContract::success(user)))],
//! );
//!
//! let client = ApiClient::new(TransportConfig::with_base_url("https://api.example.com"))?;
//! let response = client.execute(
//!     users.get(Method::Get).unwrap(),
//!     RequestOptions::new().with_param("id", "42"),
//! )?;
//! let name = response.data["name"].as_str();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod contract;
pub mod error;
pub mod schema;
pub mod server;
pub mod transport;
pub mod typed;

pub use client::{ApiClient, ApiResponse, CallConfig, RequestOptions};
pub use contract::{contract, Contract, ContractRoute, Method, ResponseContract, RouteDefinition};
pub use error::{ClientError, ParseError, SchemaError, TransportError, Violation, Violations};
pub use schema::Schema;
pub use server::{
    flatten_query, route, HandlerArgs, PathParams, Responder, ResponseInit, RouteContext,
    RouteHandler, ServerRequest, ServerResponse,
};
pub use transport::{
    ReqwestTransport, Transport, TransportConfig, TransportRequest, TransportResponse,
};
pub use typed::DecodeError;
