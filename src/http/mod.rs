//! HTTP transport for the JSON-RPC endpoint
//!
//! Provides the single RPC route, the not-found fallback and the request timeout layer.

pub mod handlers;
pub mod timeout;
