//! The request wrapper passed through the middleware chain.
//!
//! [`Request`] decorates the transport-level request with a replaceable
//! [`Context`], the matched route name, and the captured [`Params`]. It is
//! passed by value: the `with_*` methods consume the receiver and return a
//! modified copy, so a middleware that rebinds the context or the params must
//! explicitly hand the new value to [`Next::run`].
//!
//! [`Next::run`]: crate::Next::run

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

use crate::context::Context;
use crate::params::Params;

#[derive(Debug, Clone)]
pub struct Request {
    inner: Arc<http::Request<Bytes>>,
    ctx: Context,
    route: Arc<str>,
    params: Params,
}

impl Request {
    /// Wraps a transport-level request. The context starts fresh; route and
    /// params stay empty until resolution fills them in.
    pub fn new(request: http::Request<Bytes>) -> Self {
        Self { inner: Arc::new(request), ctx: Context::new(), route: Arc::from(""), params: Params::new() }
    }

    /// Always non-nil, usable for cancellation/deadline propagation and for
    /// [`route_from_context`](crate::route_from_context) lookups.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn with_route(mut self, route: Arc<str>) -> Self {
        self.route = route;
        self
    }

    /// Name of the matched route; empty until resolution.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value of the first parameter named `name`, or `""` when absent.
    pub fn param(&self, name: &str) -> &str {
        self.params.text(name)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// The wrapped transport-level request.
    pub fn inner(&self) -> &http::Request<Bytes> {
        &self.inner
    }
}
