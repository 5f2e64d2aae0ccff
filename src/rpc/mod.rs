//! JSON-RPC 2.0 protocol layer
//!
//! Envelopes, the method table, the server codec and the transport adapter that
//! lets the codec run over an HTTP request/response pair.

pub mod codec;
pub mod dispatcher;
pub mod envelope;
pub mod server;
pub mod transport;
