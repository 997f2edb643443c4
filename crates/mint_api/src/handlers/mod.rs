pub mod account;
pub mod documents;
pub mod withdrawals;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

pub async fn health_check() -> &'static str {
    "OK"
}

/// Raw bytes with a content type and, when given, a download file name.
pub(crate) fn file_response(bytes: Vec<u8>, content_type: &str, attachment: Option<&str>) -> Response {
    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(name) = attachment {
        let disposition = format!("attachment; filename=\"{}\"", name.replace(|c: char| !c.is_ascii(), "_"));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }
    response
}
