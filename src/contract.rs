//! Contract builder: a single declarative description of a route's accepted
//! inputs and possible outputs, shared verbatim by the client executor and
//! the server handler wrapper.
//!
//! A [`Contract`] maps HTTP methods to [`ContractRoute`] entries. Each entry
//! is a shallow copy of its [`RouteDefinition`] annotated with the owning
//! path and its method, built once at startup and treated as constant
//! configuration thereafter.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of HTTP methods a contract can declare.
///
/// Keys outside this enum are unrepresentable, so a contract definition can
/// never carry an unknown method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
}

impl Method {
    /// Canonical upper-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
            Method::Patch => http::Method::PATCH,
        }
    }
}

/// The declared outcome shapes of a route.
///
/// At least one of success/error must be present: the only constructors are
/// [`ResponseContract::success`], [`ResponseContract::error`], and
/// [`ResponseContract::full`], so an empty pair cannot be built.
#[derive(Debug, Clone)]
pub struct ResponseContract {
    success: Option<Schema>,
    error: Option<Schema>,
}

impl ResponseContract {
    /// Declare only the success shape.
    #[must_use]
    pub fn success(schema: Schema) -> Self {
        Self {
            success: Some(schema),
            error: None,
        }
    }

    /// Declare only the error shape.
    #[must_use]
    pub fn error(schema: Schema) -> Self {
        Self {
            success: None,
            error: Some(schema),
        }
    }

    /// Declare both shapes.
    #[must_use]
    pub fn full(success: Schema, error: Schema) -> Self {
        Self {
            success: Some(success),
            error: Some(error),
        }
    }

    /// The declared success schema, if any.
    #[must_use]
    pub fn success_schema(&self) -> Option<&Schema> {
        self.success.as_ref()
    }

    /// The declared error schema, if any.
    #[must_use]
    pub fn error_schema(&self) -> Option<&Schema> {
        self.error.as_ref()
    }
}

/// Declaration for one HTTP method on one path: the optional input schemas
/// and the required response contract.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Schema for the flattened query-string object.
    pub query: Option<Schema>,
    /// Schema for the JSON request body.
    pub body: Option<Schema>,
    /// Schema for the path-parameter object.
    pub params: Option<Schema>,
    /// Schema for request headers. Carried for introspection; the handler
    /// wrapper does not run a header validation stage.
    pub headers: Option<Schema>,
    /// Declared success/error outcome shapes.
    pub response: ResponseContract,
}

impl RouteDefinition {
    /// A definition with no input schemas and the given response contract.
    #[must_use]
    pub fn new(response: ResponseContract) -> Self {
        Self {
            query: None,
            body: None,
            params: None,
            headers: None,
            response,
        }
    }

    /// Attach a query schema.
    #[must_use]
    pub fn with_query(mut self, schema: Schema) -> Self {
        self.query = Some(schema);
        self
    }

    /// Attach a body schema.
    #[must_use]
    pub fn with_body(mut self, schema: Schema) -> Self {
        self.body = Some(schema);
        self
    }

    /// Attach a path-params schema.
    #[must_use]
    pub fn with_params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Attach a headers schema.
    #[must_use]
    pub fn with_headers(mut self, schema: Schema) -> Self {
        self.headers = Some(schema);
        self
    }
}

/// One entry of a [`Contract`]: a route definition carrying its own path and
/// method. This is the value type both the client executor and the server
/// handler wrapper consume.
#[derive(Debug, Clone)]
pub struct ContractRoute {
    /// The HTTP method this entry answers for.
    pub method: Method,
    /// The owning path template, e.g. `/users/[id]`.
    pub path: String,
    /// The schemas declared for this method.
    pub definition: RouteDefinition,
}

/// An immutable mapping from HTTP method to an annotated route definition.
#[derive(Debug, Clone)]
pub struct Contract {
    path: String,
    routes: BTreeMap<Method, ContractRoute>,
}

impl Contract {
    /// The path template every entry of this contract shares.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up the entry for `method`.
    #[must_use]
    pub fn get(&self, method: Method) -> Option<&ContractRoute> {
        self.routes.get(&method)
    }

    /// Iterate over the entries in method order.
    pub fn routes(&self) -> impl Iterator<Item = &ContractRoute> {
        self.routes.values()
    }

    /// Number of methods declared.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no methods are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Build a contract for `path` from a method → definition mapping.
///
/// Pure transformation: every pair in `definition` becomes a shallow copy of
/// its route definition plus the shared `path` and its `method`; schemas are
/// passed through untouched and not validated here. Building a contract
/// cannot fail. If the same method appears more than once, the last entry
/// wins (map-insert semantics).
pub fn contract<I>(path: &str, definition: I) -> Contract
where
    I: IntoIterator<Item = (Method, RouteDefinition)>,
{
    let mut routes = BTreeMap::new();
    for (method, def) in definition {
        routes.insert(
            method,
            ContractRoute {
                method,
                path: path.to_string(),
                definition: def,
            },
        );
    }
    Contract {
        path: path.to_string(),
        routes,
    }
}
