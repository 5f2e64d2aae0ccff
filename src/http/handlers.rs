//! Axum handlers for the web server
//!
//! Every HTTP method on the RPC path reaches the codec; anything else is a 404.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::io::AsyncRead;

use crate::errors::AppError;
use crate::rpc::{
    codec::{Served, ServerCodec},
    transport::HttpConn,
};
use crate::AppState;

pub async fn rpc_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    serve_rpc(&state, &body[..]).await
}

/// Runs one codec cycle from `input` into a buffered response body.
///
/// The body is buffered, so a codec failure can still choose the status line.
pub async fn serve_rpc<R>(state: &AppState, input: R) -> Response
where
    R: AsyncRead + Unpin,
{
    let codec = ServerCodec::new(state.dispatcher.clone());
    let mut conn = HttpConn::new(input, Vec::<u8>::new());

    match codec.serve_request(&mut conn).await {
        Ok(Served::Response) => {
            let (_, output) = conn.into_parts();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                output,
            )
                .into_response()
        }
        Ok(Served::NoContent) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::internal(err.to_string()).into_response(),
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
