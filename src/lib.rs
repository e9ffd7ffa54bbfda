//! A tree-based asynchronous HTTP request router.
//!
//! This crate is the routing core of a web stack: it matches an incoming
//! request's method and path against registered templates (literal segments,
//! `:name` captures, trailing `*name` wildcards), extracts path parameters,
//! and drives the matched handler through a composable middleware chain.
//! Connection handling is a collaborator, not part of this crate: a transport
//! layer hands `http::Request<Bytes>` values to the [`Dispatcher`] and sends
//! back whatever response it returns.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Response, StatusCode};
//! use micro_router::{Dispatcher, HandlerError, Request, Router, handler_fn, json};
//!
//! async fn show_user(req: Request) -> Result<Response<Bytes>, HandlerError> {
//!     let id = req.params().uint64("id")?;
//!     json(StatusCode::OK, &serde_json::json!({ "id": id }))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .get("/users/:id", handler_fn(show_user))
//!         .build()
//!         .expect("route templates are valid");
//!
//!     let dispatcher = Dispatcher::new(router);
//!
//!     let request = http::Request::builder()
//!         .method(http::Method::GET)
//!         .uri("/users/42")
//!         .body(Bytes::new())
//!         .unwrap();
//!     let response = dispatcher.dispatch(request).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```
//!
//! Matching precedence at each tree level is literal > capture > wildcard,
//! with depth-first backtracking when a more specific branch dead-ends. An
//! unmatched path answers 404; a path registered under another method answers
//! 405 with an `Allow` header — both without any handler cooperation.

mod context;
mod dispatch;
mod error;
mod handler;
mod middleware;
mod params;
mod request;
mod response;
mod router;
mod tree;

pub mod reqlog;

pub use context::{Context, RouteInfo, route_from_context};
pub use dispatch::Dispatcher;
pub use error::SetupError;
pub use handler::{FnHandler, Handler, HandlerError, handler_fn};
pub use middleware::{Middleware, Next};
pub use params::{Param, Params};
pub use request::Request;
pub use response::json;
pub use router::{Router, RouterBuilder};
