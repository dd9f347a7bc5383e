//! Typed extraction of validated payloads.
//!
//! Schema validation establishes that a value has the declared shape; this
//! module turns that value into a user struct via serde. It is the runtime
//! counterpart of deriving request/response types from the contract itself:
//! the schema and the struct describe the same shape, validation runs first,
//! deserialization second.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A validated payload did not fit the requested Rust type.
///
/// With schemas and types kept in sync this indicates a drift between the
/// two, not a bad request — the request was already validated.
#[derive(Debug, Error)]
#[error("failed to decode validated payload: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Deserialize a validated JSON value into `T`.
///
/// # Errors
///
/// Returns [`DecodeError`] when the value does not fit `T`.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    Ok(serde_json::from_value(value.clone())?)
}
