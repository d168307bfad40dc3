//! RPC transport layer

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::ClientError;

/// Object-safe transport trait for JSON-RPC communication
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one RPC request and return the raw `result` value
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: Transport> Transport for std::sync::Arc<T> {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        (**self).request_json(method, params).await
    }
}

/// Deserialize an RPC `result` value into a typed response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Serialization(e.to_string()))
}

/// One scripted mock reply
#[derive(Debug, Clone)]
enum MockReply {
    Value(Value),
    TransportError(String),
}

/// Scripted transport for tests.
///
/// Replies are resolved in order: a per-method FIFO queue first (so a test
/// can script "no receipt, no receipt, receipt"), then a sticky per-method
/// response, then a small set of chain-info defaults. Unknown methods return
/// a method-not-found RPC error. Every request is recorded so tests can
/// assert how often a method was invoked.
pub struct MockTransport {
    queued: Mutex<HashMap<String, VecDeque<MockReply>>>,
    sticky: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    /// Create a mock transport with chain-info defaults
    pub fn new() -> Self {
        let mut sticky = HashMap::new();
        sticky.insert("eth_chainId".to_string(), Value::String("0x1".into()));
        sticky.insert("eth_blockNumber".to_string(), Value::String("0x100".into()));
        sticky.insert(
            "eth_gasPrice".to_string(),
            Value::String("0x3b9aca00".into()),
        );

        Self {
            queued: Mutex::new(HashMap::new()),
            sticky: Mutex::new(sticky),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the sticky response for a method
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_response(&self, method: &str, response: Value) {
        self.sticky
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(method.to_string(), response);
    }

    /// Queue a one-shot response for a method, consumed in FIFO order
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_response(&self, method: &str, response: Value) {
        self.queued
            .lock()
            .expect("MockTransport mutex poisoned")
            .entry(method.to_string())
            .or_default()
            .push_back(MockReply::Value(response));
    }

    /// Queue a one-shot transport failure for a method
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_transport_error(&self, method: &str, message: &str) {
        self.queued
            .lock()
            .expect("MockTransport mutex poisoned")
            .entry(method.to_string())
            .or_default()
            .push_back(MockReply::TransportError(message.to_string()));
    }

    /// Number of requests issued for `method`
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("MockTransport mutex poisoned")
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Parameters of the `n`-th request issued for `method`
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_params(&self, method: &str, n: usize) -> Option<Vec<Value>> {
        self.calls
            .lock()
            .expect("MockTransport mutex poisoned")
            .iter()
            .filter(|(m, _)| m == method)
            .nth(n)
            .map(|(_, p)| p.clone())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        self.calls
            .lock()
            .map_err(|_| ClientError::Transport("MockTransport mutex poisoned".into()))?
            .push((method.to_string(), params));

        let queued = self
            .queued
            .lock()
            .map_err(|_| ClientError::Transport("MockTransport mutex poisoned".into()))?
            .get_mut(method)
            .and_then(|q| q.pop_front());

        if let Some(reply) = queued {
            return match reply {
                MockReply::Value(v) => Ok(v),
                MockReply::TransportError(msg) => Err(ClientError::Transport(msg)),
            };
        }

        let sticky = self
            .sticky
            .lock()
            .map_err(|_| ClientError::Transport("MockTransport mutex poisoned".into()))?
            .get(method)
            .cloned();

        if let Some(response) = sticky {
            return Ok(response);
        }

        Err(ClientError::Rpc {
            code: -32601,
            message: format!("method not found: {}", method),
        })
    }
}

/// HTTP transport speaking JSON-RPC 2.0
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a transport for the given node endpoint
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or(ClientError::Rpc {
            code: -32603,
            message: "no result in response".to_string(),
        })
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_chain_info() {
        let transport = MockTransport::new();
        let result = transport.request_json("eth_chainId", vec![]).await.unwrap();
        assert_eq!(result, Value::String("0x1".into()));
    }

    #[tokio::test]
    async fn queued_responses_drain_in_order() {
        let transport = MockTransport::new();
        transport.push_response("eth_getTransactionReceipt", Value::Null);
        transport.push_response(
            "eth_getTransactionReceipt",
            serde_json::json!({"status": "0x1"}),
        );

        let first = transport
            .request_json("eth_getTransactionReceipt", vec![])
            .await
            .unwrap();
        assert_eq!(first, Value::Null);

        let second = transport
            .request_json("eth_getTransactionReceipt", vec![])
            .await
            .unwrap();
        assert_eq!(second["status"], "0x1");
    }

    #[tokio::test]
    async fn queue_takes_precedence_over_sticky() {
        let transport = MockTransport::new();
        transport.set_response("eth_gasPrice", Value::String("0x1".into()));
        transport.push_response("eth_gasPrice", Value::String("0x2".into()));

        let first = transport.request_json("eth_gasPrice", vec![]).await.unwrap();
        assert_eq!(first, Value::String("0x2".into()));

        // Queue drained, sticky remains
        let second = transport.request_json("eth_gasPrice", vec![]).await.unwrap();
        assert_eq!(second, Value::String("0x1".into()));
    }

    #[tokio::test]
    async fn scripted_transport_error() {
        let transport = MockTransport::new();
        transport.push_transport_error("eth_sendTransaction", "connection refused");

        let err = transport
            .request_json("eth_sendTransaction", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn unknown_method_is_rpc_error() {
        let transport = MockTransport::new();
        let err = transport.request_json("eth_unknown", vec![]).await.unwrap_err();
        assert!(matches!(err, ClientError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn records_calls() {
        let transport = MockTransport::new();
        transport
            .request_json("eth_chainId", vec![Value::Bool(true)])
            .await
            .unwrap();
        assert_eq!(transport.call_count("eth_chainId"), 1);
        assert_eq!(
            transport.call_params("eth_chainId", 0),
            Some(vec![Value::Bool(true)])
        );
        assert_eq!(transport.call_count("eth_blockNumber"), 0);
    }
}
