//! # arbor
//!
//! A request router built on a path-segment tree. You register handlers
//! against verbs and paths, arbor tells you which one a request belongs to,
//! which middleware wraps it, and what the path captured.
//!
//! ## The contract
//!
//! arbor resolves `(verb, path)` to a route. It does not listen on sockets,
//! parse bodies, or decide how bytes reach the wire; whatever serves HTTP
//! builds a [`Request`], calls [`Router::dispatch`], and sends the
//! [`Response`] back (see [`Request::from_http`] / [`Response::into_http`]).
//!
//! - **Segment tree**: one node per path segment. Lookup cost grows with
//!   path depth, not with the number of routes.
//! - **Three kinds of segment**: static text, `{name}` for one segment,
//!   `*name` (last segment only) for the rest of the path, slashes and all.
//!   At every level static wins over parameter, parameter over wildcard, and
//!   a branch that fails further down hands over to the next kind with its
//!   captures undone.
//! - **Middleware by position**: attach it to the root, a group, or a single
//!   route. A request gets everything between the root and its route, root
//!   outermost.
//! - **Build, then share**: registration takes `&mut Router`, lookups take
//!   `&Router`. Put the finished router in an `Arc` and it is frozen.
//!
//! ## Quick start
//!
//! ```rust
//! use arbor::{Method, Request, Response, Router, middleware};
//!
//! # fn main() -> Result<(), arbor::RouteError> {
//! let mut app = Router::new();
//! app.layer(middleware::trace());
//! app.get("/users/{id}", get_user)?
//!    .post("/users", create_user)?
//!    .get("/files/*path", get_file)?;
//!
//! let mut api = app.group("/api/v1")?;
//! api.get("/status", status)?;
//!
//! let route = app.find(Method::Get, "/files/docs/readme.md")?;
//! assert_eq!(route.param("path"), Some("docs/readme.md"));
//! # Ok(())
//! # }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(http::StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(http::StatusCode::CREATED)
//!         .json(r#"{"id":"99"}"#)
//! }
//!
//! async fn get_file(req: Request) -> String {
//!     format!("file {}", req.param("path").unwrap_or_default())
//! }
//!
//! async fn status(_req: Request) -> &'static str {
//!     "running"
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod route;
mod router;

pub mod middleware;
pub mod tree;

pub use config::Config;
pub use error::{Error, Result, RouteError};
pub use handler::{BoxedHandler, Handler};
pub use method::Method;
pub use middleware::Middleware;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use route::Route;
pub use router::{Group, ResolvedRoute, Router};
