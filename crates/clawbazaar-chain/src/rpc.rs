//! JSON-RPC client for Base nodes.

use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ChainError, SignedTransaction};

/// How often receipt polling retries.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-request transport timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON-RPC 2.0 client over HTTP.
pub struct RpcClient {
    url: String,
    agent: ureq::Agent,
}

/// The subset of a transaction receipt the CLI cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: Option<String>,
    /// "0x1" success, "0x0" reverted.
    pub status: Option<String>,
}

impl TransactionReceipt {
    /// True when the receipt reports a reverted execution.
    pub fn reverted(&self) -> bool {
        self.status.as_deref() == Some("0x0")
    }
}

impl RpcClient {
    /// Creates a client for the given RPC endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            url: url.into(),
            agent,
        }
    }

    /// Performs one JSON-RPC call and unwraps the result field.
    fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!("RPC {} -> {}", method, self.url);

        let response: Value = self
            .agent
            .post(&self.url)
            .send_json(request)
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .into_json()
            .map_err(|e| ChainError::BadResponse(e.to_string()))?;

        if let Some(error) = response.get("error") {
            return Err(ChainError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::BadResponse("missing result field".to_string()))
    }

    /// `eth_chainId`.
    pub fn chain_id(&self) -> Result<u64, ChainError> {
        parse_quantity(&self.call("eth_chainId", json!([]))?)
    }

    /// `eth_gasPrice`.
    pub fn gas_price(&self) -> Result<U256, ChainError> {
        parse_u256(&self.call("eth_gasPrice", json!([]))?)
    }

    /// Pending nonce for an address via `eth_getTransactionCount`.
    pub fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        parse_quantity(&self.call(
            "eth_getTransactionCount",
            json!([format!("{address}"), "pending"]),
        )?)
    }

    /// Read-only contract call via `eth_call`; returns the raw hex result.
    pub fn eth_call(&self, to: Address, data: &[u8]) -> Result<String, ChainError> {
        let result = self.call(
            "eth_call",
            json!([{ "to": format!("{to}"), "data": format!("0x{}", hex::encode(data)) }, "latest"]),
        )?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::BadResponse("eth_call result is not a string".to_string()))
    }

    /// Submits a signed transaction and returns its hash.
    pub fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<String, ChainError> {
        let result = self.call("eth_sendRawTransaction", json!([tx.raw_hex()]))?;
        result.as_str().map(str::to_string).ok_or_else(|| {
            ChainError::BadResponse("eth_sendRawTransaction result is not a string".to_string())
        })
    }

    /// Fetches a receipt, or None while the transaction is unmined.
    pub fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let result = self.call("eth_getTransactionReceipt", json!([tx_hash]))?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| ChainError::BadResponse(format!("bad receipt: {}", e)))
    }

    /// Polls until the transaction is mined, fails on revert, or the
    /// deadline passes.
    pub fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: Duration,
    ) -> Result<TransactionReceipt, ChainError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash)? {
                if receipt.reverted() {
                    return Err(ChainError::Reverted(tx_hash.to_string()));
                }
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(ChainError::ConfirmationTimeout(tx_hash.to_string()));
            }
            std::thread::sleep(RECEIPT_POLL_INTERVAL);
        }
    }
}

/// Parses a JSON-RPC hex quantity into a u64.
fn parse_quantity(value: &Value) -> Result<u64, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::BadResponse(format!("expected hex quantity, got {}", value)))?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::BadResponse(format!("bad quantity {}: {}", s, e)))
}

/// Parses a JSON-RPC hex quantity into a U256.
fn parse_u256(value: &Value) -> Result<U256, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::BadResponse(format!("expected hex quantity, got {}", value)))?;
    U256::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::BadResponse(format!("bad quantity {}: {}", s, e)))
}
