//! Minimal JSON-RPC over HTTP client
//!
//! One POST per call with `Connection: close`, matching how the mock server is
//! meant to be exercised from the command line and from tests.

use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::rpc::envelope::{Response, JSONRPC_VERSION};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered with HTTP {0}")]
    Status(StatusCode),
    #[error("response is not a JSON-RPC envelope: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response id {received} does not match request id {expected}")]
    IdMismatch { expected: Value, received: Value },
    #[error("server sent no response envelope")]
    NoResponse,
    #[error("rpc error {code}: {message}")]
    Rpc { code: i32, message: String },
}

#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn request_body(method: &str, params: &Value, id: &Value) -> Value {
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "method": method,
            "params": params,
            "id": id,
        })
    }

    /// Sends one request and returns the decoded envelope, error envelopes included.
    pub async fn call_raw(
        &self,
        method: &str,
        params: Value,
        id: Value,
    ) -> Result<Response, ClientError> {
        let body = Self::request_body(method, &params, &id);
        let response = self
            .http
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json; charset=UTF-8")
            .header(header::CONNECTION, "close")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(ClientError::NoResponse);
        }
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let bytes = response.bytes().await?;
        let envelope: Response = serde_json::from_slice(&bytes)?;
        correlate(id, envelope)
    }

    pub async fn call<P, R>(&self, method: &str, params: P, id: Value) -> Result<R, ClientError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let envelope = self.call_raw(method, params, id).await?;

        if let Some(error) = envelope.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(serde_json::from_value(
            envelope.result.unwrap_or(Value::Null),
        )?)
    }
}

/// Matches a reply to its request. Errors the server could not tie to a request
/// (parse errors, invalid requests) carry `id: null` and are passed through.
fn correlate(expected: Value, envelope: Response) -> Result<Response, ClientError> {
    if envelope.id == expected || (envelope.id.is_null() && envelope.is_error()) {
        return Ok(envelope);
    }

    Err(ClientError::IdMismatch {
        expected,
        received: envelope.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::envelope::{ErrorObject, INVALID_REQUEST};

    #[test]
    fn matching_id_is_accepted() {
        let envelope = Response::success(json!(7), json!("Hello"));

        let correlated = correlate(json!(7), envelope.clone()).expect("correlated");
        assert_eq!(correlated, envelope);
    }

    #[test]
    fn null_id_error_keeps_server_error() {
        let envelope = Response::failure(Value::Null, ErrorObject::invalid_request());

        let correlated = correlate(json!(7), envelope).expect("uncorrelated error passes");
        assert_eq!(correlated.error.map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[test]
    fn foreign_id_is_a_mismatch() {
        let err = correlate(json!(7), Response::success(json!(8), json!("Hello")))
            .expect_err("mismatch");
        assert!(matches!(err, ClientError::IdMismatch { .. }));

        let err = correlate(json!(7), Response::success(Value::Null, json!("Hello")))
            .expect_err("null id on success is still a mismatch");
        assert!(matches!(err, ClientError::IdMismatch { .. }));
    }

    #[test]
    fn request_body_carries_all_members() {
        let body = RpcClient::request_body("Test.SayHello", &json!([{"Name": "x"}]), &json!(0));

        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "Test.SayHello",
                "params": [{"Name": "x"}],
                "id": 0
            })
        );
    }

    #[test]
    fn rpc_error_display_includes_code() {
        let err = ClientError::Rpc {
            code: -32601,
            message: "Method not found".to_string(),
        };
        assert_eq!(err.to_string(), "rpc error -32601: Method not found");
    }
}
