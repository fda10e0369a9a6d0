//! rpcrelay Common Types
//!
//! Shared protocol definitions for the rpcrelay JSON-RPC gateway.
//!
//! # Overview
//!
//! rpcrelay is a chain-agnostic reverse proxy for JSON-RPC 2.0 over HTTP.
//! This crate contains the pieces shared between the gateway library and
//! the binary:
//!
//! - **Protocol Layer**: JSON-RPC error objects, payload classification
//!   (single / batch / malformed), and error-envelope shaping
//! - **Error Layer**: the [`RelayError`] type used across the workspace
//!
//! The proxy never re-serializes request bodies; the protocol layer only
//! classifies payloads and shapes error responses for requests that never
//! reach an upstream.
//!
//! # Example
//!
//! ```
//! use rpcrelay_common::protocol::{JsonRpcError, RpcPayload};
//!
//! let payload = RpcPayload::parse(br#"{"jsonrpc":"2.0","id":1,"method":"getSlot"}"#);
//! assert_eq!(payload.methods(), vec!["getSlot".to_string()]);
//!
//! let body = payload.error_body(&JsonRpcError::method_not_found());
//! assert_eq!(body["error"]["code"], -32601);
//! ```

pub mod error;
pub mod protocol;

pub use error::{RelayError, Result};
pub use protocol::{JsonRpcError, RpcPayload};
