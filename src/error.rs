//! Error types.
//!
//! [`RouteError`] is the routing core's whole taxonomy. [`Error`] is what the
//! rest of the crate returns: route errors plus configuration failures.

use thiserror::Error;

use crate::method::Method;

/// Errors produced while registering or resolving a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No structural match, or a match with no handler for the verb.
    ///
    /// `allowed` is empty when no path matched at all. Otherwise it lists the
    /// verbs bound at the node the path resolved to.
    #[error("route not found: {method} {path}")]
    NotFound {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    /// A handler is already bound for this verb at this position.
    #[error("route already exists: {method} {path}")]
    AlreadyExists { method: Method, path: String },

    /// A segment with invalid parameter or wildcard syntax.
    #[error("malformed path {path}: {reason}")]
    MalformedPath { path: String, reason: String },
}

impl RouteError {
    /// `true` if the path matched but the verb had no handler.
    pub fn is_method_mismatch(&self) -> bool {
        matches!(self, Self::NotFound { allowed, .. } if !allowed.is_empty())
    }
}

/// The crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid environment value for {name}: {value}")]
    Env { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
