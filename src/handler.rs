use std::error::Error;
use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::request::Request;

/// The error type handlers and middleware return. Opaque to the chain: each
/// layer sees exactly the error returned by the layer it wrapped and may
/// replace it or pass it through.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// A terminal request handler.
///
/// Returning the response (instead of writing into a shared sink) makes
/// "respond exactly once" a property of the type; a handler that fails
/// returns an error for the chain to translate.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request) -> Result<Response<Bytes>, HandlerError>;
}

/// Holder adapting a plain async function into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, HandlerError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, HandlerError>> + Send,
{
    async fn call(&self, req: Request) -> Result<Response<Bytes>, HandlerError> {
        (self.f)(req).await
    }
}
