//! JSON-RPC protocol layer.
//!
//! The gateway treats request bodies as opaque bytes on the forwarding
//! path; this module provides the minimum protocol awareness it needs:
//!
//! - **[`RpcPayload`]**: classification of an incoming body into a single
//!   request, a batch, or a malformed document, with method extraction
//! - **[`JsonRpcError`]**: the JSON-RPC 2.0 error object and the standard
//!   error codes the gateway synthesizes

pub mod jsonrpc;
pub mod payload;

pub use jsonrpc::{JsonRpcError, INTERNAL_ERROR, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
pub use payload::RpcPayload;
