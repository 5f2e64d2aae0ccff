//! Services exposed over JSON-RPC
//!
//! Each service declares its wire methods explicitly when registered with the dispatcher.

pub mod greeter;

use crate::rpc::dispatcher::{DispatchError, Dispatcher};

/// Method table served on the RPC endpoint.
pub fn default_dispatcher() -> Result<Dispatcher, DispatchError> {
    greeter::register(Dispatcher::builder()).build()
}
