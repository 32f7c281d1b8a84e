use crate::{ProviderError, WalletProvider};
use alloy_primitives::{Address, B256, Bytes, U64, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` on success, `0x0` when execution reverted.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|status| !status.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub from_block: U64,
    pub to_block: U64,
}

/// Typed wrappers over the `eth_*` methods the client needs.
#[async_trait(?Send)]
pub trait ProviderExt: WalletProvider {
    /// Accounts already authorized for this origin; never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        decode(self.request("eth_accounts", json!([])).await?)
    }

    /// Ask the wallet to authorize accounts; may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        decode(self.request("eth_requestAccounts", json!([])).await?)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let id: U64 = decode(self.request("eth_chainId", json!([])).await?)?;
        Ok(id.to::<u64>())
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let number: U64 = decode(self.request("eth_blockNumber", json!([])).await?)?;
        Ok(number.to::<u64>())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        decode(self.request("eth_call", json!([tx, "latest"])).await?)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        debug!(to = %tx.to, value = ?tx.value, "eth_sendTransaction");
        decode(self.request("eth_sendTransaction", json!([tx])).await?)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        decode(self.request("eth_getTransactionReceipt", json!([tx_hash])).await?)
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
        decode(self.request("eth_getLogs", json!([filter])).await?)
    }
}

#[async_trait(?Send)]
impl<P: WalletProvider + ?Sized> ProviderExt for P {}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|err| ProviderError::Malformed(err.to_string()))
}
