//! Response-building helpers for handlers and middleware, plus the bare
//! status responses the dispatcher falls back to.

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Response, StatusCode};
use serde::Serialize;

use crate::handler::HandlerError;

/// Serializes `value` into a JSON response with the given status.
///
/// A convenience for application handlers and error-translating middleware;
/// pairs well with `serde_json::json!` for ad-hoc bodies.
pub fn json<T>(status: StatusCode, value: &T) -> Result<Response<Bytes>, HandlerError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;
    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

pub(crate) fn status(status: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status;
    response
}

pub(crate) fn not_found() -> Response<Bytes> {
    status(StatusCode::NOT_FOUND)
}

pub(crate) fn internal_error() -> Response<Bytes> {
    status(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn method_not_allowed(allow: &[Method]) -> Response<Bytes> {
    let mut response = status(StatusCode::METHOD_NOT_ALLOWED);
    let joined = allow.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_sets_status_and_content_type() {
        let response = json(StatusCode::CREATED, &json!({ "ok": true })).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
    }

    #[test]
    fn method_not_allowed_lists_methods() {
        let response = method_not_allowed(&[Method::GET, Method::PUT]);

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, PUT");
    }
}
