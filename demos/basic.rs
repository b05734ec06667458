//! Minimal arbor demo: a CRUD-ish route table, a group with its own
//! middleware, and a handful of requests pushed through the dispatcher.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! No socket is opened. Whatever serves HTTP in a real deployment would do
//! exactly what `main` does below: build a `Request`, dispatch, send the
//! `Response` back.

use arbor::middleware::{self, Next};
use arbor::{Config, Method, Request, Response, Router};
use http::StatusCode;

#[tokio::main]
async fn main() -> Result<(), arbor::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_toml_str("method_not_allowed = true")?.with_env_override()?;
    let mut app = Router::with_config(config);

    app.layer(middleware::trace());
    app.get("/users/{id}", get_user)?
        .post("/users", create_user)?
        .delete("/users/{id}", delete_user)?
        .get("/files/*path", get_file)?;

    let mut admin = app.group("/admin")?;
    admin.layer(middleware::from_fn(require_token));
    admin.get("/stats", stats)?;

    let requests = [
        Request::new(Method::Get, "/users/42"),
        Request::new(Method::Post, "/users").with_body(r#"{"name":"alice"}"#),
        Request::new(Method::Delete, "/users/42"),
        Request::new(Method::Get, "/files/docs/guide/intro.md"),
        Request::new(Method::Get, "/admin/stats"),
        Request::new(Method::Put, "/users/42"),
        Request::new(Method::Get, "/nowhere"),
    ];

    for req in requests {
        let line = format!("{} {}", req.method(), req.path());
        let res = app.dispatch(req).await;
        println!("{line:<34} -> {} {}", res.status_code(), res.body_str().unwrap_or_default());
    }

    Ok(())
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header(http::header::LOCATION, http::HeaderValue::from_static("/users/99"))
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /files/*path
async fn get_file(req: Request) -> String {
    format!("serving {}", req.param("path").unwrap_or_default())
}

// GET /admin/stats
async fn stats(_req: Request) -> &'static str {
    "all good"
}

async fn require_token(req: Request, next: Next) -> Response {
    if req.header("authorization").is_none() {
        return Response::error(StatusCode::UNAUTHORIZED, "missing token");
    }
    next.run(req).await
}
