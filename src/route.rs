//! The result of a successful lookup.

use std::collections::HashMap;

use crate::method::Method;

/// A resolved route: what to run, what to wrap it with, and what the path
/// captured.
///
/// `middleware` is ordered root first. A dispatcher wraps the handler so the
/// first entry ends up outermost.
#[derive(Clone, Debug)]
pub struct Route<H, M> {
    method: Method,
    path: String,
    handler: H,
    middleware: Vec<M>,
    params: HashMap<String, String>,
}

impl<H, M> Route<H, M> {
    pub(crate) fn new(
        method: Method,
        path: String,
        handler: H,
        middleware: Vec<M>,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, handler, middleware, params }
    }

    pub fn method(&self) -> Method { self.method }

    /// The path exactly as it was looked up.
    pub fn path(&self) -> &str { &self.path }

    pub fn handler(&self) -> &H { &self.handler }
    pub fn middleware(&self) -> &[M] { &self.middleware }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// A single captured value. Values are always strings.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Splits the route into handler, middleware chain and captures.
    pub fn into_parts(self) -> (H, Vec<M>, HashMap<String, String>) {
        (self.handler, self.middleware, self.params)
    }
}
