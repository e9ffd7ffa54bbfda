//! The transport-facing entry point.
//!
//! The [`Dispatcher`] is what a connection layer calls once per inbound
//! request. It wraps the transport-level request into a [`Request`] and
//! delegates to the current [`Router`]; the routing table can be replaced
//! atomically while serving, and in-flight requests keep the table they
//! started with.

use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use http::Response;

use crate::request::Request;
use crate::router::Router;

pub struct Dispatcher {
    router: ArcSwap<Router>,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self { router: ArcSwap::from_pointee(router) }
    }

    /// Atomically replaces the routing table.
    pub fn swap(&self, router: Router) {
        self.router.store(Arc::new(router));
    }

    /// Serves one transport-level request. Always yields a response, with no
    /// reliance on handler cooperation.
    pub async fn dispatch(&self, request: http::Request<Bytes>) -> Response<Bytes> {
        self.dispatch_request(Request::new(request)).await
    }

    /// Serves an already-wrapped request, e.g. one carrying a caller-supplied
    /// context with a deadline or cancellation token.
    pub async fn dispatch_request(&self, request: Request) -> Response<Bytes> {
        let router = self.router.load_full();
        router.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, handler_fn};
    use http::{Method, StatusCode};

    fn single_route_router(body: &'static [u8]) -> Router {
        Router::builder()
            .get("/ping", handler_fn(move |_req: Request| async move {
                Ok::<_, HandlerError>(Response::new(Bytes::from_static(body)))
            }))
            .build()
            .unwrap()
    }

    fn transport_request(path: &str) -> http::Request<Bytes> {
        http::Request::builder().method(Method::GET).uri(path).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn dispatch_wraps_and_serves() {
        let dispatcher = Dispatcher::new(single_route_router(b"pong"));

        let response = dispatcher.dispatch(transport_request("/ping")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"pong");

        let response = dispatcher.dispatch(transport_request("/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn swap_replaces_the_routing_table() {
        let dispatcher = Dispatcher::new(single_route_router(b"v1"));
        assert_eq!(dispatcher.dispatch(transport_request("/ping")).await.body().as_ref(), b"v1");

        dispatcher.swap(single_route_router(b"v2"));
        assert_eq!(dispatcher.dispatch(transport_request("/ping")).await.body().as_ref(), b"v2");
    }

    #[tokio::test]
    async fn caller_supplied_context_reaches_the_handler() {
        let router = Router::builder()
            .get("/flag", handler_fn(|req: Request| async move {
                let flag = req.context().value::<u8>().copied().unwrap_or(0);
                Ok::<_, HandlerError>(Response::new(Bytes::from(vec![flag])))
            }))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(router);

        let request = Request::new(transport_request("/flag"));
        let ctx = request.context().with_value(7u8);
        let response = dispatcher.dispatch_request(request.with_context(ctx)).await;

        assert_eq!(response.body().as_ref(), [7]);
    }
}
