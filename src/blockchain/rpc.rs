//! JSON-RPC 2.0 transport used by every chain adapter.
//!
//! One POST per call, no retries. Protocol failures (`error` object in the
//! body) are kept apart from transport failures so callers can tell them
//! apart.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::blockchain::models::{ChainError, RpcErrorObject, RpcRequest};
use crate::utils::{redact_endpoint, truncate_for_log};

/// Transport seam. Adapters hold an `Arc<dyn RpcClient>` so tests can swap in
/// a recording double.
#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn post(&self, method: &str, params: Vec<Value>, endpoint: &str)
        -> Result<Value, ChainError>;
}

/// `reqwest`-backed transport. The inner client pools connections and is
/// shared by all adapters of a process.
#[derive(Clone)]
pub struct HttpRpcClient {
    client: Client,
}

impl HttpRpcClient {
    pub fn new(timeout: Duration) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn post(
        &self,
        method: &str,
        params: Vec<Value>,
        endpoint: &str,
    ) -> Result<Value, ChainError> {
        let started = Instant::now();
        let logged_params =
            truncate_for_log(&serde_json::to_string(&params).unwrap_or_default(), 256);
        debug!(
            method,
            endpoint = %redact_endpoint(endpoint),
            params = %logged_params,
            "sending JSON-RPC request"
        );

        let response = self
            .client
            .post(endpoint)
            .json(&RpcRequest::new(method, &params))
            .send()
            .await
            .map_err(|e| ChainError::from(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChainError::from(e.without_url()))?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(method, status = status.as_u16(), elapsed_ms, "JSON-RPC response received");

        let decoded: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(_) if !status.is_success() => {
                warn!(method, status = status.as_u16(), "upstream returned non-JSON error body");
                return Err(ChainError::Transport(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    truncate_for_log(&body, 256)
                )));
            }
            Err(e) => return Err(ChainError::Decode(format!("invalid JSON response: {}", e))),
        };

        unwrap_envelope(decoded, status.as_u16())
    }
}

/// Pull `result` out of a decoded JSON-RPC response, or turn its `error`
/// object into [`ChainError::Rpc`].
pub fn unwrap_envelope(decoded: Value, status: u16) -> Result<Value, ChainError> {
    let Value::Object(mut map) = decoded else {
        return Err(ChainError::Decode(format!(
            "expected a JSON-RPC object, got: {}",
            truncate_for_log(&decoded.to_string(), 256)
        )));
    };

    // Some nodes send `"error": null` alongside a valid result.
    if let Some(error) = map.remove("error").filter(|e| !e.is_null()) {
        let error_obj = match error {
            Value::Object(obj) => serde_json::from_value::<RpcErrorObject>(Value::Object(obj))
                .unwrap_or(RpcErrorObject {
                    code: -1,
                    message: "Unknown RPC error".to_string(),
                }),
            Value::String(message) => RpcErrorObject { code: -1, message },
            _ => RpcErrorObject {
                code: -1,
                message: "Unknown RPC error".to_string(),
            },
        };
        return Err(error_obj.into());
    }

    match map.remove("result") {
        Some(result) => Ok(result),
        None if !(200..300).contains(&status) => {
            Err(ChainError::Transport(format!("HTTP {} without JSON-RPC result", status)))
        }
        None => Err(ChainError::Decode(
            "JSON-RPC response has neither 'result' nor 'error'".to_string(),
        )),
    }
}


#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Records every call and answers from a per-method table. Methods with
    /// no canned answer echo `{method, params}` back.
    #[derive(Default)]
    pub(crate) struct MockRpcClient {
        pub calls: Mutex<Vec<(String, Vec<Value>, String)>>,
        responses: Mutex<HashMap<String, Result<Value, ChainError>>>,
    }

    impl MockRpcClient {
        pub fn respond(&self, method: &str, response: Result<Value, ChainError>) {
            self.responses
                .lock()
                .unwrap()
                .insert(method.to_string(), response);
        }

        pub fn last_call(&self) -> Option<(String, Vec<Value>, String)> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl RpcClient for MockRpcClient {
        async fn post(
            &self,
            method: &str,
            params: Vec<Value>,
            endpoint: &str,
        ) -> Result<Value, ChainError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params.clone(), endpoint.to_string()));
            match self.responses.lock().unwrap().get(method) {
                Some(canned) => canned.clone(),
                None => Ok(serde_json::json!({ "method": method, "params": params })),
            }
        }
    }
}
