//! Error-translating middleware: the application supplies the mapping from
//! sentinel errors to HTTP statuses with a `{message, hint}` JSON body;
//! unknown errors map to 500 with the error's text. The request log sits
//! outermost so it observes what the translator produced.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use micro_router::reqlog::RequestLog;
use micro_router::{Dispatcher, HandlerError, Middleware, Next, Request, Router, handler_fn, json};
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("error1")]
    First,
    #[error("error2")]
    Second,
}

async fn index(_req: Request) -> Result<Response<Bytes>, HandlerError> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().subsec_nanos();
    if nanos.is_multiple_of(2) {
        Err(AppError::First.into())
    } else {
        Err(AppError::Second.into())
    }
}

struct ErrorTranslator;

#[async_trait]
impl Middleware for ErrorTranslator {
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response<Bytes>, HandlerError> {
        match next.run(req).await {
            Ok(response) => Ok(response),
            Err(err) => match err.downcast_ref::<AppError>() {
                Some(AppError::First) => json(
                    StatusCode::BAD_REQUEST,
                    &serde_json::json!({
                        "message": "bad request",
                        "hint": "rerun to see how the error message changes",
                    }),
                ),
                _ => json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({
                        "message": err.to_string(),
                        "hint": "rerun to see how the error message changes",
                    }),
                ),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let router = Router::builder()
        .middleware(RequestLog::new())
        .middleware(ErrorTranslator)
        .get("/", handler_fn(index))
        .build()
        .expect("route templates are valid");
    let dispatcher = Dispatcher::new(router);

    let request =
        http::Request::builder().method(Method::GET).uri("/").body(Bytes::new()).unwrap();
    let response = dispatcher.dispatch(request).await;

    println!("status: {}", response.status());
    println!("body:   {}", String::from_utf8_lossy(response.body()));
}
