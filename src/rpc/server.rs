//! Request decoding and dispatch for single and batched JSON-RPC payloads

use serde_json::Value;
use tracing::{debug, info};

use crate::rpc::{
    dispatcher::Dispatcher,
    envelope::{is_valid_id, ErrorObject, Params, Request, Response, JSONRPC_VERSION},
};

/// What a decoded payload produced: nothing (notifications only), one envelope, or a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Empty,
    Single(Response),
    Batch(Vec<Response>),
}

impl Reply {
    pub fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
        match self {
            Self::Empty => None,
            Self::Single(response) => Some(serde_json::to_vec(response)),
            Self::Batch(responses) => Some(serde_json::to_vec(responses)),
        }
    }
}

pub async fn handle_body(dispatcher: &Dispatcher, body: &[u8]) -> Reply {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "rejecting unparsable payload");
            return Reply::Single(Response::failure(Value::Null, ErrorObject::parse_error()));
        }
    };

    handle_payload(dispatcher, payload).await
}

pub async fn handle_payload(dispatcher: &Dispatcher, payload: Value) -> Reply {
    let Value::Array(batch) = payload else {
        return match handle_json_rpc_value(dispatcher, payload).await {
            Some(response) => Reply::Single(response),
            None => Reply::Empty,
        };
    };

    if batch.is_empty() {
        return Reply::Single(Response::failure(
            Value::Null,
            ErrorObject::invalid_request(),
        ));
    }

    let mut responses = Vec::with_capacity(batch.len());
    for item in batch {
        if let Some(response) = handle_json_rpc_value(dispatcher, item).await {
            responses.push(response);
        }
    }

    if responses.is_empty() {
        Reply::Empty
    } else {
        Reply::Batch(responses)
    }
}

/// Handles one envelope. Returns `None` for notifications.
pub async fn handle_json_rpc_value(dispatcher: &Dispatcher, payload: Value) -> Option<Response> {
    if !payload.is_object() {
        return Some(Response::failure(Value::Null, ErrorObject::invalid_request()));
    }

    // Echo the id on malformed requests whenever it is usable.
    let fallback_id = payload
        .get("id")
        .filter(|id| is_valid_id(id))
        .cloned()
        .unwrap_or(Value::Null);

    let request: Request = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "rejecting malformed request envelope");
            return Some(Response::failure(fallback_id, ErrorObject::invalid_request()));
        }
    };

    if let Some(id) = &request.id {
        if !is_valid_id(id) {
            return Some(Response::failure(Value::Null, ErrorObject::invalid_request()));
        }
    }

    // Only a valid request without an id is a notification; anything else gets an answer.
    let structured_params = matches!(
        request.params,
        None | Some(Value::Null | Value::Array(_) | Value::Object(_))
    );
    if request.jsonrpc != JSONRPC_VERSION || request.method.trim().is_empty() || !structured_params
    {
        return Some(Response::failure(
            request.id.unwrap_or(Value::Null),
            ErrorObject::invalid_request(),
        ));
    }

    let Request {
        method, params, id, ..
    } = request;
    let outcome = dispatcher.call(&method, Params::new(params)).await;

    let audit_id = id
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "none".to_string());
    info!(
        method = %method,
        id = %audit_id,
        outcome = if outcome.is_ok() { "success" } else { "failure" },
        "rpc call audited"
    );

    let id = id?;
    Some(match outcome {
        Ok(result) => Response::success(id, result),
        Err(error) => Response::failure(id, error),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rpc::{
        dispatcher::typed_method,
        envelope::{INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR},
    };

    fn echo_dispatcher() -> Dispatcher {
        Dispatcher::builder()
            .service("Echo", "Value", typed_method(|value: Value| Ok(value)))
            .build()
            .expect("dispatcher")
    }

    fn single(reply: Reply) -> Response {
        match reply {
            Reply::Single(response) => response,
            other => panic!("expected single reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_body_is_parse_error_with_null_id() {
        let response = single(handle_body(&echo_dispatcher(), b"{\"jsonrpc\":").await);

        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.map(|e| e.code), Some(PARSE_ERROR));
    }

    #[tokio::test]
    async fn wrong_version_is_invalid_request_with_echoed_id() {
        let response = single(
            handle_payload(
                &echo_dispatcher(),
                json!({"jsonrpc": "1.0", "method": "Echo.Value", "id": 7}),
            )
            .await,
        );

        assert_eq!(response.id, json!(7));
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn missing_method_is_invalid_request() {
        let response = single(
            handle_payload(&echo_dispatcher(), json!({"jsonrpc": "2.0", "id": "a"})).await,
        );

        assert_eq!(response.id, json!("a"));
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn object_id_is_invalid_request_with_null_id() {
        let response = single(
            handle_payload(
                &echo_dispatcher(),
                json!({"jsonrpc": "2.0", "method": "Echo.Value", "id": {"x": 1}}),
            )
            .await,
        );

        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn notification_produces_no_reply() {
        let reply = handle_payload(
            &echo_dispatcher(),
            json!({"jsonrpc": "2.0", "method": "Echo.Value", "params": {"a": 1}}),
        )
        .await;

        assert_eq!(reply, Reply::Empty);
    }

    #[tokio::test]
    async fn unknown_method_keeps_id() {
        let response = single(
            handle_payload(
                &echo_dispatcher(),
                json!({"jsonrpc": "2.0", "method": "Echo.Nope", "id": null}),
            )
            .await,
        );

        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.map(|e| e.code), Some(METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn batch_answers_requests_in_order_and_skips_notifications() {
        let reply = handle_payload(
            &echo_dispatcher(),
            json!([
                {"jsonrpc": "2.0", "method": "Echo.Value", "params": {"n": 1}, "id": 1},
                {"jsonrpc": "2.0", "method": "Echo.Value", "params": {"n": 2}},
                {"jsonrpc": "2.0", "method": "Echo.Value", "params": {"n": 3}, "id": "three"},
                42
            ]),
        )
        .await;

        let Reply::Batch(responses) = reply else {
            panic!("expected batch reply");
        };
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].id, json!(1));
        assert_eq!(responses[0].result, Some(json!({"n": 1})));
        assert_eq!(responses[1].id, json!("three"));
        assert_eq!(responses[2].error.as_ref().map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn empty_batch_is_single_invalid_request() {
        let response = single(handle_payload(&echo_dispatcher(), json!([])).await);

        assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn batch_of_notifications_is_empty() {
        let reply = handle_payload(
            &echo_dispatcher(),
            json!([{"jsonrpc": "2.0", "method": "Echo.Value"}]),
        )
        .await;

        assert_eq!(reply, Reply::Empty);
    }

    #[tokio::test]
    async fn invalid_request_without_id_is_answered_with_null_id() {
        for payload in [
            json!({"jsonrpc": "1.0", "method": "Echo.Value"}),
            json!({"jsonrpc": "2.0", "method": ""}),
            json!({"jsonrpc": "2.0", "method": "  "}),
        ] {
            let response = single(handle_payload(&echo_dispatcher(), payload).await);

            assert_eq!(response.id, Value::Null);
            assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
        }
    }

    #[tokio::test]
    async fn invalid_request_without_id_stays_in_batch() {
        let reply = handle_payload(
            &echo_dispatcher(),
            json!([
                {"jsonrpc": "1.0", "method": "Echo.Value"},
                {"jsonrpc": "2.0", "method": "Echo.Value"}
            ]),
        )
        .await;

        let Reply::Batch(responses) = reply else {
            panic!("expected batch reply");
        };
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Value::Null);
        assert_eq!(responses[0].error.as_ref().map(|e| e.code), Some(INVALID_REQUEST));
    }

    #[tokio::test]
    async fn scalar_params_are_invalid_request() {
        for params in [json!("bar"), json!(3), json!(true)] {
            let response = single(
                handle_payload(
                    &echo_dispatcher(),
                    json!({"jsonrpc": "2.0", "method": "Echo.Value", "params": params, "id": 1}),
                )
                .await,
            );

            assert_eq!(response.id, json!(1));
            assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));
        }
    }

    #[tokio::test]
    async fn structured_and_null_params_are_dispatched() {
        for params in [json!([1]), json!({"a": 1}), Value::Null] {
            let response = single(
                handle_payload(
                    &echo_dispatcher(),
                    json!({"jsonrpc": "2.0", "method": "Echo.Value", "params": params, "id": 2}),
                )
                .await,
            );

            assert!(response.error.is_none(), "params {params} rejected");
        }
    }
}
