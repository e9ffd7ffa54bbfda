//! Around-style middleware composed into an ordered chain.
//!
//! A middleware wraps the rest of the chain: it runs before delegating to
//! [`Next::run`], and again after the inner layers return, free to inspect or
//! replace the response/error on the way out. Skipping the `run` call
//! short-circuits the chain. The first middleware registered on the router is
//! the outermost one.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::handler::{Handler, HandlerError};
use crate::request::Request;

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError>;
}

/// The remainder of the chain plus the terminal handler.
pub struct Next<'chain> {
    chain: &'chain [Arc<dyn Middleware>],
    endpoint: &'chain dyn Handler,
}

impl<'chain> Next<'chain> {
    pub(crate) fn new(chain: &'chain [Arc<dyn Middleware>], endpoint: &'chain dyn Handler) -> Self {
        Self { chain, endpoint }
    }

    /// Invokes the next link of the chain, or the terminal handler when none
    /// remain. The chain never retries or swallows an error on its own; both
    /// are decisions for an individual middleware.
    pub async fn run(self, req: Request) -> Result<Response<Bytes>, HandlerError> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(req, Next::new(rest, self.endpoint)).await,
            None => self.endpoint.call(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use http::{Method, StatusCode};
    use std::sync::Mutex;

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct Recording {
        name: &'static str,
        log: CallLog,
    }

    #[async_trait]
    impl Middleware for Recording {
        async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
            self.log.lock().unwrap().push(format!("{}-pre", self.name));
            let result = next.run(req).await;
            self.log.lock().unwrap().push(format!("{}-post", self.name));
            result
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn handle(&self, _req: Request, _next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
            let mut response = Response::new(Bytes::from_static(b"blocked"));
            *response.status_mut() = StatusCode::FORBIDDEN;
            Ok(response)
        }
    }

    struct ReplaceError;

    #[async_trait]
    impl Middleware for ReplaceError {
        async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
            match next.run(req).await {
                Ok(response) => Ok(response),
                Err(_) => Err("replaced".into()),
            }
        }
    }

    fn request() -> Request {
        Request::new(http::Request::builder().method(Method::GET).uri("/").body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn first_registered_runs_outermost() {
        let log: CallLog = Arc::default();
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recording { name: "m1", log: Arc::clone(&log) }),
            Arc::new(Recording { name: "m2", log: Arc::clone(&log) }),
        ];
        let log_for_handler = Arc::clone(&log);
        let handler = handler_fn(move |_req: Request| {
            let log = Arc::clone(&log_for_handler);
            async move {
                log.lock().unwrap().push("handler".to_owned());
                Err::<Response<Bytes>, HandlerError>("boom".into())
            }
        });

        let result = Next::new(&chain, &handler).run(request()).await;

        assert_eq!(result.unwrap_err().to_string(), "boom");
        let observed = log.lock().unwrap().clone();
        assert_eq!(observed, ["m1-pre", "m2-pre", "handler", "m2-post", "m1-post"]);
    }

    #[tokio::test]
    async fn middleware_may_short_circuit() {
        let log: CallLog = Arc::default();
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(ShortCircuit),
            Arc::new(Recording { name: "inner", log: Arc::clone(&log) }),
        ];
        let handler =
            handler_fn(|_req: Request| async { Ok::<_, HandlerError>(Response::new(Bytes::new())) });

        let response = Next::new(&chain, &handler).run(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn middleware_may_replace_the_inner_error() {
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(ReplaceError)];
        let handler =
            handler_fn(|_req: Request| async { Err::<Response<Bytes>, HandlerError>("original".into()) });

        let result = Next::new(&chain, &handler).run(request()).await;

        assert_eq!(result.unwrap_err().to_string(), "replaced");
    }
}
