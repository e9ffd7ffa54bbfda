//! Request logging middleware.
//!
//! Logs one line per request with the route name as the label rather than
//! the raw path, so log aggregation and metrics stay low-cardinality even
//! for parameterized routes. Not wired by default; register it first so it
//! wraps the whole chain:
//!
//! ```no_run
//! use micro_router::reqlog::RequestLog;
//! use micro_router::Router;
//!
//! let router = Router::builder().middleware(RequestLog::new());
//! ```

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use tracing::{error, info};

use crate::context::route_from_context;
use crate::handler::HandlerError;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

#[derive(Debug, Default)]
pub struct RequestLog;

impl RequestLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for RequestLog {
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        // Empty for fallback handlers, which carry no route info.
        let route = route_from_context(req.context())
            .map(|info| info.name().to_owned())
            .unwrap_or_default();

        let result = next.run(req).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                info!(%method, path, route, status = response.status().as_u16(), ?elapsed, "request served");
            }
            Err(cause) => {
                error!(%method, path, route, cause = %cause, ?elapsed, "request failed");
            }
        }

        result
    }
}
