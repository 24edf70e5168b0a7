//! Header handling for the forwarded request and the relayed response.
//!
//! The forwarded request keeps the client's headers byte-for-byte with
//! one exception: `Host` is stripped so the transport can set its own
//! for the backend. The relayed response strips the headers that are
//! hop-by-hop or computed by the transport; the outbound side
//! regenerates framing from the actual stream.

use std::sync::LazyLock;

use axum::http::{header, HeaderMap, HeaderName};

/// Response headers that must not be forwarded raw across the proxy
/// boundary. `HeaderMap` keys are lowercase, so matching is
/// case-insensitive by construction.
static EXCLUDED_RESPONSE_HEADERS: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    vec![
        header::CONTENT_ENCODING,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
        header::CONNECTION,
    ]
});

/// Clone the client's headers for the forwarded request, stripping `Host`.
#[must_use]
pub fn build_forwarded_headers(original: &HeaderMap) -> HeaderMap {
    let mut headers = original.clone();
    headers.remove(header::HOST);
    headers
}

/// Drop transport-owned headers from a backend response before relaying.
pub fn strip_response_headers(headers: &mut HeaderMap) {
    for name in EXCLUDED_RESPONSE_HEADERS.iter() {
        headers.remove(name);
    }
}
