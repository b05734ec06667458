//! The application router.
//!
//! One segment tree for every verb, with handlers bound per node. Build it
//! once with `&mut` access, then share it (`Arc<Router>`) and call
//! [`Router::dispatch`] or [`Router::find`] from as many tasks as you like:
//! lookups never mutate anything.

use http::header::ALLOW;
use http::{HeaderValue, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::tree::{NodeId, Tree};

/// A route resolved by a [`Router`].
pub type ResolvedRoute = Route<BoxedHandler, Middleware>;

macro_rules! verb_shortcuts {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` handler at `path`.")]
            pub fn $name(&mut self, path: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
                self.on(Method::$method, path, handler)
            }
        )*
    };
}

/// The application router.
///
/// Registration methods return `Result<&mut Self, _>` so they chain with `?`:
///
/// ```rust
/// # use arbor::{Request, Response, Router, RouteError};
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// # async fn delete_user(_: Request) -> Response { Response::text("") }
/// # async fn create_user(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), RouteError> {
/// let mut router = Router::new();
/// router
///     .get("/users/{id}", get_user)?
///     .delete("/users/{id}", delete_user)?
///     .post("/users", create_user)?;
/// # Ok(())
/// # }
/// ```
pub struct Router {
    tree: Tree<BoxedHandler, Middleware>,
    config: Config,
    fallback: Option<BoxedHandler>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { tree: Tree::new(), config, fallback: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying tree, for introspection.
    pub fn tree(&self) -> &Tree<BoxedHandler, Middleware> {
        &self.tree
    }

    /// Registers `handler` for `method` + `path`, with middleware local to
    /// this route.
    ///
    /// Paths use `{name}` for a single-segment parameter and a trailing
    /// `*name` for a wildcard that captures the rest of the path. Registering
    /// the same verb and path twice fails with [`RouteError::AlreadyExists`]
    /// and keeps the first handler.
    pub fn route<I>(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler,
        middleware: I,
    ) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.tree.insert(method, path, handler.into_boxed_handler(), middleware)?;
        Ok(self)
    }

    /// Registers `handler` for `method` + `path`.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.route(method, path, handler, [])
    }

    verb_shortcuts! {
        get     => Get,
        post    => Post,
        put     => Put,
        delete  => Delete,
        patch   => Patch,
        head    => Head,
        options => Options,
    }

    /// Attaches middleware to the root: it wraps every route, outermost.
    pub fn layer(&mut self, middleware: Middleware) -> &mut Self {
        self.tree.layer(self.tree.root(), [middleware]);
        self
    }

    /// Opens a group under `prefix`. Routes registered on the group resolve
    /// as `prefix + path`; middleware layered on the group wraps only them.
    /// Opening the same prefix again returns the same position.
    pub fn group(&mut self, prefix: &str) -> Result<Group<'_>, RouteError> {
        let node = self.tree.mount(self.tree.root(), prefix, [])?;
        Ok(Group { tree: &mut self.tree, node })
    }

    /// Replaces the default `404` response for unmatched requests.
    pub fn fallback(&mut self, handler: impl Handler) -> &mut Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Resolves `method` + `path` without running anything.
    pub fn find(&self, method: Method, path: &str) -> Result<ResolvedRoute, RouteError> {
        self.tree.find(method, path)
    }

    /// Runs one request through the router.
    ///
    /// On a match the handler is wrapped in its middleware chain and called
    /// with the captured parameters available through [`Request::param`]. On
    /// a miss the router answers itself: the fallback handler if one is set,
    /// otherwise a JSON `404` (or `405` when
    /// [`Config::method_not_allowed`] is on and only the verb was wrong).
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let route = match self.tree.find(req.method, &req.path) {
            Ok(route) => route,
            Err(err) => return self.miss(req, err).await,
        };

        debug!(method = %req.method, path = %req.path, params = ?route.params(), "dispatching");

        let (handler, chain, params) = route.into_parts();
        req.params = params;

        let mut handler = middleware::compose(handler, &chain);
        if self.config.log_requests {
            handler = middleware::trace().wrap(handler);
        }
        handler.call(req).await
    }

    async fn miss(&self, req: Request, err: RouteError) -> Response {
        debug!(%err, "unmatched request");
        let message = format!("{} {}", req.method, req.path);

        match err {
            RouteError::NotFound { allowed, .. }
                if self.config.method_not_allowed && !allowed.is_empty() =>
            {
                let mut res = Response::error(StatusCode::METHOD_NOT_ALLOWED, &message);
                let allow: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                if let Ok(value) = HeaderValue::from_str(&allow.join(", ")) {
                    res.headers_mut().insert(ALLOW, value);
                }
                res
            }
            _ => match &self.fallback {
                Some(handler) => handler.call(req).await,
                None => Response::error(StatusCode::NOT_FOUND, &message),
            },
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// A position in the tree with the same registration surface as [`Router`].
///
/// Obtained from [`Router::group`] or [`Group::group`].
pub struct Group<'a> {
    tree: &'a mut Tree<BoxedHandler, Middleware>,
    node: NodeId,
}

impl Group<'_> {
    /// The full prefix this group registers under.
    pub fn prefix(&self) -> String {
        self.tree.path_of(self.node)
    }

    pub fn route<I>(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler,
        middleware: I,
    ) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.tree.insert_at(self.node, method, path, handler.into_boxed_handler(), middleware)?;
        Ok(self)
    }

    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.route(method, path, handler, [])
    }

    verb_shortcuts! {
        get     => Get,
        post    => Post,
        put     => Put,
        delete  => Delete,
        patch   => Patch,
        head    => Head,
        options => Options,
    }

    /// Attaches middleware to this group's position.
    pub fn layer(&mut self, middleware: Middleware) -> &mut Self {
        self.tree.layer(self.node, [middleware]);
        self
    }

    /// Opens a nested group under this one.
    pub fn group(&mut self, prefix: &str) -> Result<Group<'_>, RouteError> {
        let node = self.tree.mount(self.node, prefix, [])?;
        Ok(Group { tree: &mut *self.tree, node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Next, from_fn};

    async fn hello(_req: Request) -> &'static str {
        "hello"
    }

    async fn echo_id(req: Request) -> String {
        format!("id={}", req.param("id").unwrap_or("none"))
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_router_is_shareable() {
        assert_send_sync::<Router>();
    }

    #[tokio::test]
    async fn test_dispatch_passes_params() {
        let mut router = Router::new();
        router.get("/users/{id}", echo_id).unwrap();

        let res = router.dispatch(Request::new(Method::Get, "/users/42?full=1")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body_str(), Some("id=42"));
    }

    #[tokio::test]
    async fn test_dispatch_not_found_is_json_404() {
        let router = Router::new();
        let res = router.dispatch(Request::new(Method::Get, "/missing")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "GET /missing");
    }

    #[tokio::test]
    async fn test_wrong_verb_is_404_by_default_and_405_when_configured() {
        let mut router = Router::new();
        router.get("/users", hello).unwrap().post("/users", hello).unwrap();
        let res = router.dispatch(Request::new(Method::Delete, "/users")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let mut router = Router::with_config(Config { method_not_allowed: true, ..Config::default() });
        router.get("/users", hello).unwrap().post("/users", hello).unwrap();
        let res = router.dispatch(Request::new(Method::Delete, "/users")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_allow_lists_verbs_bound_on_every_matching_branch() {
        let mut router = Router::with_config(Config { method_not_allowed: true, ..Config::default() });
        router.get("/docs/{section}", hello).unwrap().post("/docs/*page", hello).unwrap();

        assert!(router.find(Method::Get, "/docs/guide").is_ok());
        assert!(router.find(Method::Post, "/docs/guide").is_ok());

        let res = router.dispatch(Request::new(Method::Delete, "/docs/guide")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_static_match_does_not_fall_back_to_param() {
        let mut router = Router::with_config(Config { method_not_allowed: true, ..Config::default() });
        router.get("/users/admin", hello).unwrap().post("/users/{id}", hello).unwrap();

        assert!(router.find(Method::Post, "/users/admin").is_err());
        let res = router.dispatch(Request::new(Method::Delete, "/users/admin")).await;
        assert_eq!(res.headers()[ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_fallback_replaces_404() {
        let mut router = Router::new();
        router.fallback(|_req: Request| async { (StatusCode::IM_A_TEAPOT, "nope") });
        let res = router.dispatch(Request::new(Method::Get, "/anything")).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_group_composes_prefix_and_middleware() {
        let mut router = Router::new();
        {
            let mut api = router.group("/api/v1").unwrap();
            assert_eq!(api.prefix(), "/api/v1");
            api.layer(from_fn(|req: Request, next: Next| async move {
                let res = next.run(req).await;
                format!("api:{}", res.body_str().unwrap_or_default())
            }));
            api.get("/status", hello).unwrap();
        }
        router.get("/status", hello).unwrap();

        let res = router.dispatch(Request::new(Method::Get, "/api/v1/status")).await;
        assert_eq!(res.body_str(), Some("api:hello"));

        let res = router.dispatch(Request::new(Method::Get, "/status")).await;
        assert_eq!(res.body_str(), Some("hello"));
    }

    #[test]
    fn test_registration_errors_surface() {
        let mut router = Router::new();
        router.get("/users", hello).unwrap();
        assert!(matches!(router.get("/users", hello), Err(RouteError::AlreadyExists { .. })));
        assert!(matches!(router.get("/users/{}", hello), Err(RouteError::MalformedPath { .. })));
        assert!(matches!(router.group("/files/*p/x"), Err(RouteError::MalformedPath { .. })));
    }
}
