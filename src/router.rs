//! Route registration and the per-request orchestration around the tree.
//!
//! A [`Router`] is built once, up front: the builder collects route
//! definitions, middleware and fallback handlers, and `build()` validates
//! every template before anything is installed — a registration either fully
//! installs a reachable route or the whole build fails with a
//! [`SetupError`]. The built router is immutable and safe to share across
//! concurrent requests.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Response};
use tracing::error;

use crate::context::context_with_route;
use crate::error::SetupError;
use crate::handler::Handler;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response;
use crate::tree::{Resolution, RouteTarget, Tree};

pub struct Router {
    tree: Tree,
    middlewares: Vec<Arc<dyn Middleware>>,
    not_found: Option<Arc<dyn Handler>>,
    method_not_allowed: Option<Arc<dyn Handler>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Serves one request: resolves the route, attaches the
    /// [`RouteInfo`](crate::RouteInfo) to the request context, runs the
    /// middleware chain around the matched handler, and always produces a
    /// response.
    ///
    /// Unmatched paths and method mismatches run the corresponding fallback
    /// handler through the full chain when one is registered, and otherwise
    /// answer a bare 404/405 (the 405 carries an `Allow` header). An error
    /// that no middleware translated is logged and answered with an empty
    /// 500; application detail never leaks into that response.
    pub async fn dispatch(&self, req: Request) -> Response<Bytes> {
        let method = req.method().clone();
        let path = req.path().to_owned();

        match self.tree.resolve(&method, &path) {
            Resolution::Found { target, params } => {
                let ctx = context_with_route(req.context(), Arc::clone(&target.name), params.clone());
                let req = req.with_context(ctx).with_route(Arc::clone(&target.name)).with_params(params);
                self.run_chain(target.handler.as_ref(), req).await
            }
            Resolution::MethodNotAllowed { allow } => match &self.method_not_allowed {
                Some(handler) => self.run_chain(handler.as_ref(), req).await,
                None => response::method_not_allowed(&allow),
            },
            Resolution::NotFound => match &self.not_found {
                Some(handler) => self.run_chain(handler.as_ref(), req).await,
                None => response::not_found(),
            },
        }
    }

    async fn run_chain(&self, endpoint: &dyn Handler, req: Request) -> Response<Bytes> {
        let route = req.route().to_owned();
        match Next::new(&self.middlewares, endpoint).run(req).await {
            Ok(resp) => resp,
            Err(cause) => {
                error!(cause = %cause, route, "handler error reached the dispatcher, replying 500");
                response::internal_error()
            }
        }
    }
}

struct RouteDef {
    method: Method,
    template: String,
    name: Option<String>,
    handler: Arc<dyn Handler>,
}

pub struct RouterBuilder {
    routes: Vec<RouteDef>,
    middlewares: Vec<Arc<dyn Middleware>>,
    not_found: Option<Arc<dyn Handler>>,
    method_not_allowed: Option<Arc<dyn Handler>>,
}

macro_rules! method_route {
    ($fn_name:ident, $method:ident) => {
        #[doc = concat!("Registers a ", stringify!($method), " route, see [`RouterBuilder::route`].")]
        pub fn $fn_name<H: Handler + 'static>(self, template: impl Into<String>, handler: H) -> Self {
            self.route(Method::$method, template, handler)
        }
    };
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: vec![], middlewares: vec![], not_found: None, method_not_allowed: None }
    }

    /// Registers `handler` under `method` and `template`. The route name
    /// defaults to the template itself.
    pub fn route<H: Handler + 'static>(
        self,
        method: Method,
        template: impl Into<String>,
        handler: H,
    ) -> Self {
        self.push(method, template.into(), None, Arc::new(handler))
    }

    /// Like [`RouterBuilder::route`], with an explicit route name. The name
    /// is what [`RouteInfo::name`](crate::RouteInfo::name) reports, which
    /// keeps observability labels stable even when a template is reshaped.
    pub fn named_route<H: Handler + 'static>(
        self,
        name: impl Into<String>,
        method: Method,
        template: impl Into<String>,
        handler: H,
    ) -> Self {
        self.push(method, template.into(), Some(name.into()), Arc::new(handler))
    }

    fn push(mut self, method: Method, template: String, name: Option<String>, handler: Arc<dyn Handler>) -> Self {
        self.routes.push(RouteDef { method, template, name, handler });
        self
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(put, PUT);
    method_route!(delete, DELETE);
    method_route!(head, HEAD);
    method_route!(options, OPTIONS);
    method_route!(patch, PATCH);

    /// Appends a middleware. The first one registered is the outermost: it
    /// runs first on the way in and last on the way out.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Fallback handler for paths no template matches; runs through the full
    /// middleware chain, without route info on the context.
    pub fn not_found<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Fallback handler for paths that match a template under a different
    /// method only.
    pub fn method_not_allowed<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.method_not_allowed = Some(Arc::new(handler));
        self
    }

    /// Validates every template and installs the routes. Malformed templates,
    /// capture-name conflicts and duplicate (method, template) registrations
    /// fail the whole build; no partially-registered router is observable.
    pub fn build(self) -> Result<Router, SetupError> {
        let mut tree = Tree::default();
        for def in self.routes {
            let name: Arc<str> = match &def.name {
                Some(name) => Arc::from(name.as_str()),
                None => Arc::from(def.template.as_str()),
            };
            tree.insert(def.method, &def.template, RouteTarget { name, handler: def.handler })?;
        }
        Ok(Router {
            tree,
            middlewares: self.middlewares,
            not_found: self.not_found,
            method_not_allowed: self.method_not_allowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::route_from_context;
    use crate::handler::{HandlerError, handler_fn};
    use crate::response::json;
    use async_trait::async_trait;
    use http::StatusCode;
    use http::header::ALLOW;
    use serde_json::json;

    fn request(method: Method, path: &str) -> Request {
        Request::new(http::Request::builder().method(method).uri(path).body(Bytes::new()).unwrap())
    }

    async fn show_user(req: Request) -> Result<Response<Bytes>, HandlerError> {
        let id = req.params().uint64("id")?;
        json(StatusCode::OK, &json!({ "id": id, "route": req.route() }))
    }

    fn router() -> Router {
        Router::builder()
            .get("/users/:id", handler_fn(show_user))
            .get("/ping", handler_fn(|_req: Request| async {
                Ok::<_, HandlerError>(Response::new(Bytes::from_static(b"pong")))
            }))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn dispatch_matches_and_fills_params() {
        let response = router().dispatch(request(Method::GET, "/users/42")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["id"], 42);
        assert_eq!(body["route"], "/users/:id");
    }

    #[tokio::test]
    async fn unmatched_path_answers_404_without_handler_cooperation() {
        let response = router().dispatch(request(Method::GET, "/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn method_mismatch_answers_405_with_allow() {
        let response = router().dispatch(request(Method::POST, "/ping")).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET");
    }

    #[tokio::test]
    async fn untranslated_handler_error_becomes_a_bare_500() {
        let router = Router::builder()
            .get("/boom", handler_fn(|_req: Request| async {
                Err::<Response<Bytes>, HandlerError>("database on fire".into())
            }))
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::GET, "/boom")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn handlers_observe_route_info_through_the_context() {
        let router = Router::builder()
            .named_route("user-show", Method::GET, "/users/:id", handler_fn(|req: Request| async move {
                let info = route_from_context(req.context()).ok_or("route info missing")?;
                assert_eq!(info.name(), "user-show");
                assert_eq!(info.params(), *req.params());
                Ok(Response::new(Bytes::new()))
            }))
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::GET, "/users/7")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn fallback_handlers_run_through_the_chain() {
        struct Tagging;

        #[async_trait]
        impl Middleware for Tagging {
            async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
                let mut response = next.run(req).await?;
                response.headers_mut().insert("x-chain", "seen".parse().unwrap());
                Ok(response)
            }
        }

        let router = Router::builder()
            .middleware(Tagging)
            .get("/ping", handler_fn(|_req: Request| async {
                Ok::<_, HandlerError>(Response::new(Bytes::new()))
            }))
            .not_found(handler_fn(|_req: Request| async {
                let mut response = Response::new(Bytes::from_static(b"custom miss"));
                *response.status_mut() = StatusCode::NOT_FOUND;
                Ok(response)
            }))
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::GET, "/missing")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_ref(), b"custom miss");
        assert_eq!(response.headers().get("x-chain").unwrap(), "seen");
    }

    #[tokio::test]
    async fn error_translating_middleware_maps_sentinels() {
        use thiserror::Error;

        #[derive(Debug, Error)]
        enum AppError {
            #[error("item quota exhausted")]
            QuotaExhausted,
        }

        struct ErrorTranslator;

        #[async_trait]
        impl Middleware for ErrorTranslator {
            async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
                match next.run(req).await {
                    Ok(response) => Ok(response),
                    Err(err) => match err.downcast_ref::<AppError>() {
                        Some(AppError::QuotaExhausted) => json(
                            StatusCode::TOO_MANY_REQUESTS,
                            &json!({ "message": "quota exhausted", "hint": "try again tomorrow" }),
                        ),
                        None => json(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            &json!({ "message": err.to_string(), "hint": "see server logs" }),
                        ),
                    },
                }
            }
        }

        let router = Router::builder()
            .middleware(ErrorTranslator)
            .get("/quota", handler_fn(|_req: Request| async {
                Err::<Response<Bytes>, HandlerError>(AppError::QuotaExhausted.into())
            }))
            .get("/other", handler_fn(|_req: Request| async {
                Err::<Response<Bytes>, HandlerError>("wires crossed".into())
            }))
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::GET, "/quota")).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "quota exhausted");

        let response = router.dispatch(request(Method::GET, "/other")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "wires crossed");
    }

    #[test]
    fn build_rejects_duplicates_wholesale() {
        let result = Router::builder()
            .get("/items", handler_fn(|_req: Request| async {
                Ok::<_, HandlerError>(Response::new(Bytes::new()))
            }))
            .get("/items", handler_fn(|_req: Request| async {
                Ok::<_, HandlerError>(Response::new(Bytes::new()))
            }))
            .build();

        assert!(matches!(result.unwrap_err(), SetupError::DuplicateRoute { .. }));
    }
}
