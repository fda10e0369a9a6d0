//! Incoming payload classification.
//!
//! A request body is classified once, up front, into a tagged sum:
//! a single request object, a batch array, or a malformed document.
//! Everything downstream (method extraction, error shaping) works on
//! that classification; the raw bytes are forwarded verbatim.

use serde_json::Value;

use super::jsonrpc::{error_envelope, JsonRpcError};

/// An incoming JSON-RPC payload, classified but not validated.
///
/// The gateway forwards bodies byte-for-byte, so classification is
/// deliberately permissive: any non-array JSON value is `Single`, any
/// array is `Batch` (entries need not be objects), and only documents
/// that fail to parse at all are `Malformed`. An empty body parses as
/// JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcPayload {
    Single(Value),
    Batch(Vec<Value>),
    Malformed,
}

impl RpcPayload {
    /// Classify raw body bytes.
    pub fn parse(body: &[u8]) -> Self {
        if body.is_empty() {
            return RpcPayload::Single(Value::Null);
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Array(entries)) => RpcPayload::Batch(entries),
            Ok(value) => RpcPayload::Single(value),
            Err(_) => RpcPayload::Malformed,
        }
    }

    /// Extract the method names carried by the payload.
    ///
    /// For a single object this is the string `method` field, if any.
    /// For a batch, each entry contributes its string `method`; entries
    /// without one (or with a non-string one) are skipped rather than
    /// aborting the batch. Malformed payloads carry no methods.
    pub fn methods(&self) -> Vec<String> {
        match self {
            RpcPayload::Single(value) => method_of(value).into_iter().collect(),
            RpcPayload::Batch(entries) => entries.iter().filter_map(method_of).collect(),
            RpcPayload::Malformed => Vec::new(),
        }
    }

    /// Shape a JSON-RPC error response body for this payload.
    ///
    /// Batches produce an array with one error object per entry, each
    /// carrying that entry's `id` (or null). Single and malformed
    /// payloads produce one object with the request's `id` or null.
    pub fn error_body(&self, error: &JsonRpcError) -> Value {
        match self {
            RpcPayload::Single(value) => error_envelope(id_of(value), error),
            RpcPayload::Batch(entries) => Value::Array(
                entries
                    .iter()
                    .map(|entry| error_envelope(id_of(entry), error))
                    .collect(),
            ),
            RpcPayload::Malformed => error_envelope(Value::Null, error),
        }
    }
}

fn method_of(value: &Value) -> Option<String> {
    value
        .get("method")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn id_of(value: &Value) -> Value {
    value.get("id").cloned().unwrap_or(Value::Null)
}
