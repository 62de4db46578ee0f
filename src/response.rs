//! Response builders shared by the request handler.

use crate::config::HttpConfig;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// 200 with a JSON body (a record, `true`, or `false`).
pub fn build_json_response(json: String, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Server", &http_config.server_name)
        .body(Full::new(Bytes::from(json)))
        .expect("Failed to build response")
}

/// 200 with a plain-text body. Only the health probe uses this.
pub fn build_text_response(body: &'static str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .header("Server", &http_config.server_name)
        .body(Full::new(Bytes::from(body)))
        .expect("Failed to build response")
}

/// 400 whose body is exactly the failure message, not JSON-wrapped.
pub fn build_bad_request_response(
    message: &'static str,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "text/plain")
        .header("Server", &http_config.server_name)
        .body(Full::new(Bytes::from(message)))
        .expect("Failed to build 400 response")
}

pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Request Entity Too Large")))
        .expect("Failed to build 413 response")
}
