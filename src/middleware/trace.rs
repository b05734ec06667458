//! Request logging.
//!
//! [`trace()`] is what [`Router`](crate::Router) layers on top of every
//! matched chain when `log_requests` is set in the config.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use super::{Middleware, Next, from_fn};
use crate::request::Request;

/// Opens a `request` span carrying method and path around the rest of the
/// chain, then logs the status and latency at `info`.
pub fn trace() -> Middleware {
    from_fn(|req: Request, next: Next| async move {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let start = Instant::now();

        let res = next.run(req).instrument(span.clone()).await;

        span.in_scope(|| {
            info!(status = res.status_code().as_u16(), elapsed = ?start.elapsed(), "request finished");
        });
        res
    })
}
