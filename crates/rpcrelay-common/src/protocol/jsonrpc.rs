//! JSON-RPC 2.0 error objects.
//!
//! Standard error codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found / not allowed
//! - `-32603`: Internal error
//!
//! The gateway replies with HTTP 200 and one of these envelopes for every
//! failure that happens before a request reaches an upstream endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Invalid JSON was received by the server
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid Request object
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 error object.
///
/// Per the JSON-RPC 2.0 spec, an error object must have:
/// - `code`: Integer error code
/// - `message`: Short description of the error
/// - `data`: Additional data (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a parse error (-32700) for bodies that are not valid JSON.
    pub fn parse_error() -> Self {
        Self {
            code: PARSE_ERROR,
            message: "Parse error: Invalid JSON.".into(),
            data: None,
        }
    }

    /// Create an invalid request error (-32600).
    ///
    /// Used when no entry of the payload carries a string `method`.
    pub fn invalid_request() -> Self {
        Self {
            code: INVALID_REQUEST,
            message: "Invalid Request.".into(),
            data: None,
        }
    }

    /// Create a method not found error (-32601).
    ///
    /// Used when no route matches the extracted methods.
    pub fn method_not_found() -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: "Method not found.".into(),
            data: None,
        }
    }

    /// Create a method not allowed error (-32601) naming the first
    /// method rejected by the global allowlist.
    pub fn method_not_allowed(method: &str) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: format!("Method not allowed: {method}"),
            data: None,
        }
    }

    /// Create an internal error (-32603).
    pub fn internal_error(msg: &str) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: msg.into(),
            data: None,
        }
    }
}

/// Builds a single JSON-RPC error envelope carrying the given `id`.
pub fn error_envelope(id: Value, error: &JsonRpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error,
    })
}
