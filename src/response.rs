//! HTTP response builders.
//!
//! Free functions producing the fixed responses the dispatcher writes, plus
//! helpers for the bodies handlers usually build. Builder failures cannot
//! occur with these inputs; each falls back to an empty response rather than
//! panicking.

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;

/// The response type every handler and middleware produces.
pub type HandlerResponse = Response<Full<Bytes>>;

/// 404 for unmatched routes.
pub fn build_404_response() -> HandlerResponse {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 404 for missing or unreadable static assets.
pub fn build_static_404_response() -> HandlerResponse {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("File not found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 500 for any failure inside middleware or a handler.
pub fn build_500_response() -> HandlerResponse {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Internal Server Error")))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 200 with an HTML body.
pub fn build_html_response(content: String) -> HandlerResponse {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 200 with a plain-text body.
pub fn build_text_response(content: impl Into<String>) -> HandlerResponse {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(content.into())))
        .unwrap_or_else(|e| {
            log_build_error("text", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 200 with a JSON body serialized from `body`.
///
/// Serialization failure degrades to a JSON 500 body, mirroring the
/// dispatcher's catch-all.
pub fn build_json_response<T: Serialize>(body: &T) -> HandlerResponse {
    let json = match serde_json::to_string(body) {
        Ok(json) => json,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(500)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(r#"{"error":"Internal Server Error"}"#)))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())));
        }
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 200 with verbatim file bytes and the detected content type.
pub fn build_static_file_response(data: Vec<u8>, content_type: &'static str) -> HandlerResponse {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(Bytes::from(data)))
        .unwrap_or_else(|e| {
            log_build_error("static file", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn log_build_error(kind: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {kind} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn body_string(response: HandlerResponse) -> String {
        let bytes = collect_body(response);
        String::from_utf8(bytes).unwrap()
    }

    fn collect_body(response: HandlerResponse) -> Vec<u8> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            response
                .into_body()
                .collect()
                .await
                .unwrap()
                .to_bytes()
                .to_vec()
        })
    }

    #[test]
    fn test_404_bodies() {
        let route = build_404_response();
        assert_eq!(route.status(), 404);
        assert_eq!(body_string(route), "Not Found");

        let file = build_static_404_response();
        assert_eq!(file.status(), 404);
        assert_eq!(body_string(file), "File not found");
    }

    #[test]
    fn test_500_body() {
        let response = build_500_response();
        assert_eq!(response.status(), 500);
        assert_eq!(body_string(response), "Internal Server Error");
    }

    #[test]
    fn test_json_response() {
        let response = build_json_response(&serde_json::json!({"id": 7}));
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response), r#"{"id":7}"#);
    }

    #[test]
    fn test_static_file_response_keeps_bytes() {
        let data = vec![0_u8, 159, 146, 150];
        let response = build_static_file_response(data.clone(), "image/png");
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "image/png"
        );
        assert_eq!(collect_body(response), data);
    }
}
