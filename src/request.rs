//! Incoming HTTP request type.

use std::collections::HashMap;
use std::str::FromStr;

use bytes::Bytes;
use http::HeaderMap;

use crate::error::Error;
use crate::method::Method;

/// The request context handed to handlers and middleware.
///
/// Built by whatever feeds the router: [`Request::from_http`] for `http`
/// requests, or [`Request::new`] plus the `with_*` setters in tests.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// A bodyless request. Anything after a `?` in `target` becomes the query.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    /// Adapts an `http` request. Fails only for methods the router cannot
    /// route.
    pub fn from_http(req: http::Request<Bytes>) -> Result<Self, Error> {
        let (parts, body) = req.into_parts();
        let method = Method::try_from(&parts.method)?;
        Ok(Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params: HashMap::new(),
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Header lookup. Names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`. A wildcard `*path` is read the same way.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parses a path parameter. `None` if it was not captured.
    ///
    /// ```rust
    /// # use arbor::{Method, Request};
    /// # let req = Request::new(Method::Get, "/");
    /// let page: Option<Result<u32, _>> = req.param_as("page");
    /// ```
    pub fn param_as<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.param(key).map(str::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_query() {
        let req = Request::new(Method::Get, "/search?q=rust&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust&page=2"));
    }

    #[test]
    fn test_from_http() {
        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri("/users?x=1")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let req = Request::from_http(req).unwrap();
        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query(), Some("x=1"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body().as_ref(), b"{}");
    }

    #[test]
    fn test_from_http_rejects_extension_methods() {
        let req = http::Request::builder()
            .method("PURGE")
            .uri("/cache")
            .body(Bytes::new())
            .unwrap();
        assert!(matches!(Request::from_http(req), Err(Error::UnknownMethod(m)) if m == "PURGE"));
    }

    #[test]
    fn test_param_as() {
        let mut req = Request::new(Method::Get, "/users/42");
        req.params.insert("id".to_owned(), "42".to_owned());
        req.params.insert("name".to_owned(), "bob".to_owned());

        assert_eq!(req.param_as::<u64>("id"), Some(Ok(42)));
        assert!(matches!(req.param_as::<u64>("name"), Some(Err(_))));
        assert!(req.param_as::<u64>("missing").is_none());
    }
}
