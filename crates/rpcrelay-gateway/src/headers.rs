//! Proxy header handling.
//!
//! Hop-by-hop and framing headers must not cross the proxy in either
//! direction; the HTTP layers on both sides manage their own framing.

use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue};

const HOP_BY_HOP: [&str; 5] = [
    "host",
    "content-length",
    "connection",
    "content-encoding",
    "transfer-encoding",
];

/// Whether a header is stripped when crossing the proxy.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.iter().any(|hop| name.as_str() == *hop)
}

/// Returns a copy of `headers` with hop-by-hop headers removed.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut stripped = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            stripped.append(name.clone(), value.clone());
        }
    }
    stripped
}

/// Builds the upstream request headers: caller headers (minus
/// hop-by-hop) in their original order, overlaid by endpoint-configured
/// headers, which win on key collision.
///
/// Endpoint header entries that are not valid HTTP names or values are
/// skipped with a warning; they come from configuration and must not
/// take down the request path.
pub fn merge_headers(caller: &HeaderMap, endpoint: &HashMap<String, String>) -> HeaderMap {
    let mut merged = strip_hop_by_hop(caller);
    for (name, value) in endpoint {
        let parsed = HeaderName::try_from(name.as_str())
            .ok()
            .zip(HeaderValue::from_str(value).ok());
        match parsed {
            Some((name, value)) => {
                merged.insert(name, value);
            }
            None => {
                tracing::warn!(header = %name, "skipping invalid endpoint header");
            }
        }
    }
    merged
}
