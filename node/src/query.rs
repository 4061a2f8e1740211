//! The query forwarder (C7). Purely read-side: parses the
//! opaque payload as `{method, params}` JSON, forwards it through an
//! injected `RpcClient`, and re-serializes the result. The RPC client is
//! a narrow trait, not an `reqwest`/HTTP-specific type, so the facade
//! never needs to know about HTTP/IPC transport details.

use async_trait::async_trait;
use bridge_common::error::QueryError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("rpc call failed: {0}")]
pub struct RpcClientError(pub String);

/// Narrow interface to the external read-only RPC server. Implementations
/// dial whatever transport the JSON-RPC server actually uses; this crate
/// never sees it.
#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcClientError>;
}

#[derive(Deserialize)]
struct QueryPayload {
    method: String,
    #[serde(default)]
    params: Vec<Value>,
}

/// `query(bytes) -> bytes | error`. Never mutates any
/// state; any failure surfaces as a `QueryError` carrying the upstream
/// message.
pub async fn query(bytes: &[u8], rpc: &dyn RpcClient) -> Result<Vec<u8>, QueryError> {
    let payload: QueryPayload = serde_json::from_slice(bytes)
        .map_err(|err| QueryError(format!("invalid query payload: {err}")))?;

    let result = rpc
        .call(&payload.method, &payload.params)
        .await
        .map_err(|err| QueryError(err.0))?;

    serde_json::to_vec(&result)
        .map_err(|err| QueryError(format!("failed to serialize query result: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoRpc;

    #[async_trait]
    impl RpcClient for EchoRpc {
        async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcClientError> {
            Ok(json!({ "method": method, "params": params }))
        }
    }

    struct FailingRpc;

    #[async_trait]
    impl RpcClient for FailingRpc {
        async fn call(&self, _method: &str, _params: &[Value]) -> Result<Value, RpcClientError> {
            Err(RpcClientError("upstream unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn forwards_method_and_params() {
        let payload = json!({"method": "get_balance", "params": ["0xabc"]});
        let bytes = serde_json::to_vec(&payload).unwrap();
        let response = query(&bytes, &EchoRpc).await.unwrap();
        let decoded: Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(decoded["method"], "get_balance");
        assert_eq!(decoded["params"][0], "0xabc");
    }

    #[tokio::test]
    async fn defaults_missing_params_to_empty_array() {
        let payload = json!({"method": "get_height"});
        let bytes = serde_json::to_vec(&payload).unwrap();
        let response = query(&bytes, &EchoRpc).await.unwrap();
        let decoded: Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(decoded["params"], json!([]));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_query_error() {
        let err = query(b"not json", &EchoRpc).await.unwrap_err();
        assert!(err.0.contains("invalid query payload"));
    }

    #[tokio::test]
    async fn upstream_failure_propagates_as_query_error() {
        let payload = json!({"method": "x", "params": []});
        let bytes = serde_json::to_vec(&payload).unwrap();
        let err = query(&bytes, &FailingRpc).await.unwrap_err();
        assert_eq!(err.0, "upstream unavailable");
    }
}
