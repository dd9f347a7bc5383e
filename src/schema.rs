//! The Schema capability: an opaque validator for one semantic type.
//!
//! A [`Schema`] wraps a JSON Schema document together with its precompiled
//! validator. Compilation happens exactly once, at construction; contracts
//! are process-lifetime constants, so every request served afterwards reuses
//! the same `Arc`-shared validator with no per-request compilation cost.

use crate::error::{ParseError, SchemaError, Violation, Violations};
use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A compiled, shareable validator for one declared value shape.
///
/// Cloning is cheap: both the source document and the compiled validator
/// live behind `Arc`, which is what makes a `Contract` entry a literal
/// shallow copy of its route definition.
#[derive(Clone)]
pub struct Schema {
    document: Arc<Value>,
    validator: Arc<Validator>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Compile a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document itself is not a valid
    /// schema. Contracts are built at startup, so this surfaces to the
    /// contract author immediately rather than at request time.
    pub fn new(document: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(&document).map_err(|err| SchemaError {
            message: err.to_string(),
        })?;
        debug!(schema = %document, "schema compiled");
        Ok(Self {
            document: Arc::new(document),
            validator: Arc::new(validator),
        })
    }

    /// The source schema document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate `value`, producing either the typed value or the full
    /// ordered list of violations.
    ///
    /// Validation is idempotent: an already-valid value comes back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Violations`] listing every mismatch, in instance order.
    pub fn safe_parse(&self, value: &Value) -> Result<Value, Violations> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(value)
            .map(|err| Violation {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Ok(value.clone())
        } else {
            Err(Violations(violations))
        }
    }

    /// Validate `value`, failing hard on any mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] wrapping the collected violations.
    pub fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        self.safe_parse(value)
            .map_err(|violations| ParseError { violations })
    }

    /// Cheap validity check without violation collection.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}
