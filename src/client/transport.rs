//! HTTP seam
//!
//! The client never opens connections itself; it hands request bodies to a
//! [`Transport`] and interprets what comes back.

use bytes::Bytes;
use tracing::debug;

use crate::protocol::{Error, Result};

/// Content type of request and response bodies.
pub const CONTENT_TYPE_MEMBUFFERS: &str = "application/membuffers";

/// Raw answer of an HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: Bytes,
}

/// Blocking HTTP POST.
pub trait Transport {
    /// Post `body` to `url` with the given content type.
    ///
    /// Connection failures are reported as [`Error::Transport`]; any answer
    /// the server gives, whatever its status, is an `Ok`.
    fn post(&self, url: &str, content_type: &str, body: Bytes) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &str, content_type: &str, body: Bytes) -> Result<HttpResponse> {
        (**self).post(url, content_type, body)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post(&self, url: &str, content_type: &str, body: Bytes) -> Result<HttpResponse> {
        (**self).post(url, content_type, body)
    }
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extract the membuffers body of a response, turning anything else into an
/// [`Error::Http`].
pub(crate) fn membuffers_body(response: HttpResponse) -> Result<Bytes> {
    let media = response.content_type.as_deref().map(media_type);
    match media.as_deref() {
        Some(CONTENT_TYPE_MEMBUFFERS) => {
            if response.body.is_empty() {
                return Err(Error::Http(format!(
                    "empty response body, http status {}",
                    response.status
                )));
            }
            Ok(response.body)
        }
        Some("text/plain" | "application/json" | "text/html") => {
            let text = String::from_utf8_lossy(&response.body).into_owned();
            debug!(status = response.status, "node answered with an error body");
            Err(Error::Http(text))
        }
        Some(other) => Err(Error::Http(format!(
            "unexpected content type {other}, http status {}",
            response.status
        ))),
        None => Err(Error::Http(format!(
            "missing content type, http status {}",
            response.status
        ))),
    }
}
