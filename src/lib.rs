use std::{sync::Arc, time::Duration};

use axum::{middleware, routing::any, Router};

pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod rpc;

use rpc::dispatcher::Dispatcher;

/// The only path that reaches the JSON-RPC codec.
pub const RPC_PATH: &str = "/api/json/v2";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, request_timeout: Option<Duration>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            request_timeout,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(RPC_PATH, any(http::handlers::rpc_endpoint))
        .fallback(http::handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            http::timeout::enforce_request_timeout,
        ))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
