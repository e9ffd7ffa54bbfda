//! Request-scoped context and the route metadata attached to it.
//!
//! A [`Context`] is a cheap-to-clone value carrying a cancellation token, an
//! optional deadline, and a typed value store. Rebinding (`with_value`,
//! `with_deadline`) returns a new value; the caller decides whether to
//! propagate it downstream, usually through [`Request::with_context`].
//!
//! [`Request::with_context`]: crate::Request::with_context

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use http::Extensions;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::params::Params;

#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    values: Arc<Extensions>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with `value` stored in it, keyed by its
    /// type. The value store is copy-on-write; this context is unchanged.
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut values = Extensions::clone(&self.values);
        values.insert(value);
        Self { cancel: self.cancel.clone(), deadline: self.deadline, values: Arc::new(values) }
    }

    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// Returns a copy with the deadline set. A nested deadline can only
    /// tighten the existing one.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) => Some(existing.min(deadline)),
            None => Some(deadline),
        };
        Self { cancel: self.cancel.clone(), deadline, values: Arc::clone(&self.values) }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Deadlines are cooperative: handlers and middleware are expected to
    /// check this at their own blocking points.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

/// The matched route's name plus the parameters captured at resolution time.
///
/// Created once per request when resolution succeeds and attached to the
/// request context, so any downstream code holding the context can label the
/// request by route instead of raw path. The name is fixed; the params may be
/// rewritten by downstream consumers, e.g. to normalize a captured id.
#[derive(Debug)]
pub struct RouteInfo {
    name: Arc<str>,
    params: RwLock<Params>,
}

impl RouteInfo {
    pub(crate) fn new(name: Arc<str>, params: Params) -> Self {
        Self { name, params: RwLock::new(params) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the captured parameters.
    pub fn params(&self) -> Params {
        match self.params.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn param(&self, name: &str) -> String {
        let guard = match self.params.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.text(name).to_owned()
    }

    /// Replaces the captured parameters; visible to every holder of this
    /// route info.
    pub fn set_params(&self, params: Params) {
        match self.params.write() {
            Ok(mut guard) => *guard = params,
            Err(poisoned) => *poisoned.into_inner() = params,
        }
    }
}

// The value store keys by type; keeping this type private makes the slot
// unforgeable by external code.
#[derive(Debug, Clone)]
struct CurrentRoute(Arc<RouteInfo>);

/// Returns the [`RouteInfo`] attached to `ctx` by route resolution, if any.
pub fn route_from_context(ctx: &Context) -> Option<Arc<RouteInfo>> {
    ctx.value::<CurrentRoute>().map(|current| Arc::clone(&current.0))
}

pub(crate) fn context_with_route(ctx: &Context, name: Arc<str>, params: Params) -> Context {
    ctx.with_value(CurrentRoute(Arc::new(RouteInfo::new(name, params))))
}
