//! Crate-wide error taxonomy.
//!
//! Server-side validation failures never surface as Rust errors: the handler
//! wrapper converts them into 400 responses before they can cross its
//! boundary. Everything here is therefore either a contract-author mistake
//! ([`SchemaError`]), a client-side failure ([`TransportError`],
//! [`ClientError`]), or the structured violation payload shared by both
//! sides ([`Violation`], [`Violations`]).

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A schema document failed to compile.
///
/// Raised from [`Schema::new`](crate::schema::Schema::new) only; contracts
/// are built once at startup, so this is a build-time concern for the
/// contract author, never a per-request condition.
#[derive(Debug, Clone, Error)]
#[error("schema failed to compile: {message}")]
pub struct SchemaError {
    /// Compiler diagnostic from the validation engine.
    pub message: String,
}

/// One validation violation: where in the instance it occurred and why.
///
/// Serialized verbatim into the `details` field of 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer into the offending instance (empty string for the root).
    pub path: String,
    /// Human-readable description of the mismatch.
    pub message: String,
}

/// Ordered list of violations produced by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    /// Number of violations collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no violations were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the violations in instance order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.first() {
            Some(first) if first.path.is_empty() => {
                write!(f, "{} violation(s), first: {}", self.0.len(), first.message)
            }
            Some(first) => write!(
                f,
                "{} violation(s), first at {}: {}",
                self.0.len(),
                first.path,
                first.message
            ),
            None => write!(f, "0 violations"),
        }
    }
}

impl std::error::Error for Violations {}

/// Hard schema mismatch from [`Schema::parse`](crate::schema::Schema::parse).
#[derive(Debug, Clone, Error)]
#[error("value does not conform to schema: {violations}")]
pub struct ParseError {
    /// The violations that caused the parse to fail.
    pub violations: Violations,
}

/// Failure raised by a [`Transport`](crate::transport::Transport)
/// implementation.
///
/// `Status` carries the structured response of a completed-but-failed HTTP
/// exchange; the enum itself is the type guard that distinguishes transport
/// failures from arbitrary errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code of the failed exchange.
        status: u16,
        /// Response headers (lowercase names).
        headers: HashMap<String, String>,
        /// Decoded response payload; replaced in place by the client
        /// executor when the contract declares an error schema that matches.
        data: Value,
    },
    /// The request never completed (connect, DNS, timeout, ...).
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    /// The request could not be constructed (unparseable URL, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Status and payload of the failed exchange, when one completed.
    #[must_use]
    pub fn response(&self) -> Option<(u16, &Value)> {
        match self {
            TransportError::Status { status, data, .. } => Some((*status, data)),
            _ => None,
        }
    }

    /// HTTP status of the failed exchange, when one completed.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response().map(|(status, _)| status)
    }

    /// Response payload of the failed exchange, when one completed.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.response().map(|(_, data)| data)
    }
}

/// Failure returned by the client executor.
///
/// Transport failures and success-schema mismatches always propagate;
/// error-schema decode failures never do (the original transport error is
/// preserved and re-raised instead).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed; the payload may have been decoded against the
    /// contract's error schema (best effort).
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A 2xx response body failed the declared success schema. This is a
    /// broken client/server contract, not a recoverable condition.
    #[error("response violates contract: {0}")]
    ContractViolation(#[from] ParseError),
}

impl ClientError {
    /// Status and payload of the underlying transport failure, if any.
    #[must_use]
    pub fn response(&self) -> Option<(u16, &Value)> {
        match self {
            ClientError::Transport(err) => err.response(),
            ClientError::ContractViolation(_) => None,
        }
    }
}
