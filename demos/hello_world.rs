//! Minimal registration and dispatch walkthrough. The connection layer is a
//! collaborator of this crate, so the demo feeds synthetic requests instead
//! of listening on a socket.

use bytes::Bytes;
use http::{Method, Response, StatusCode};
use micro_router::{Dispatcher, HandlerError, Request, Router, handler_fn, json};

async fn index(_req: Request) -> Result<Response<Bytes>, HandlerError> {
    Ok(Response::new(Bytes::from_static(b"try GET /hello/world\n")))
}

async fn hello(req: Request) -> Result<Response<Bytes>, HandlerError> {
    json(StatusCode::OK, &serde_json::json!({ "hello": req.param("name") }))
}

#[tokio::main]
async fn main() {
    let router = Router::builder()
        .get("/", handler_fn(index))
        .get("/hello/:name", handler_fn(hello))
        .build()
        .expect("route templates are valid");
    let dispatcher = Dispatcher::new(router);

    for path in ["/", "/hello/world", "/hello/world/extra"] {
        let request =
            http::Request::builder().method(Method::GET).uri(path).body(Bytes::new()).unwrap();
        let response = dispatcher.dispatch(request).await;
        println!(
            "GET {path} -> {} {}",
            response.status(),
            String::from_utf8_lossy(response.body())
        );
    }
}
