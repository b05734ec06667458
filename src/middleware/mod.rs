//! Middleware layer.
//!
//! A [`Middleware`] is a transform from handler to handler. Middleware is
//! attached to positions in the tree (the root, a group, a single route) and
//! a request collects everything attached between the root and the node it
//! resolved to, root first. The root's middleware ends up outermost.
//!
//! Most middleware is easiest to write with [`from_fn`]:
//!
//! ```rust
//! use arbor::middleware::{self, Next};
//! use arbor::{Request, Response};
//! use http::StatusCode;
//!
//! let auth = middleware::from_fn(|req: Request, next: Next| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! });
//! ```
//!
//! Built in:
//! - [`trace()`]: per-request span with method and path, logs status and latency

mod trace;

pub use trace::trace;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A handler-to-handler transform. Cheap to clone.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>);

impl Middleware {
    /// Wraps a raw transform.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Applies this middleware around `inner`.
    pub fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        (self.0)(inner)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Wraps `handler` in `chain`, first entry outermost.
pub fn compose(handler: BoxedHandler, chain: &[Middleware]) -> BoxedHandler {
    chain.iter().rev().fold(handler, |inner, mw| mw.wrap(inner))
}

/// The rest of the chain, as seen from inside a [`from_fn`] middleware.
pub struct Next(BoxedHandler);

impl Next {
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }
}

/// Builds a middleware from an async function of the request and the rest of
/// the chain.
pub fn from_fn<F, Fut, R>(f: F) -> Middleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let f = Arc::new(f);
    Middleware::new(move |inner| {
        let handler: BoxedHandler = Arc::new(FromFn { f: Arc::clone(&f), inner });
        handler
    })
}

struct FromFn<F> {
    f: Arc<F>,
    inner: BoxedHandler,
}

impl<F, Fut, R> ErasedHandler for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.f)(req, Next(Arc::clone(&self.inner)));
        Box::pin(async move { fut.await.into_response() })
    }
}
