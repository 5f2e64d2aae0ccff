use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{errors::AppError, AppState};

pub async fn enforce_request_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(limit) = state.request_timeout else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path().to_string();
    tokio::time::timeout(limit, next.run(request))
        .await
        .map_err(|_| {
            warn!(path = %path, timeout_ms = limit.as_millis(), "request timed out");
            AppError::Timeout
        })
}
