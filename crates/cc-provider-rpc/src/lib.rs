use alloy_primitives::{Address, U64};
use async_trait::async_trait;
use cc_wallet_provider::{
    EventHandler, Listeners, ProviderError, ProviderEvent, Subscription, WalletProvider,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tracing::{debug, warn};

pub const RPC_URL_ENV: &str = "CRYPTOCOURT_RPC_URL";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC provider for a node that manages its own accounts.
///
/// Reads `CRYPTOCOURT_RPC_URL` from environment at construction time
/// (default: `http://localhost:8545`). The node signs; a node has no
/// authorization prompt, so `eth_requestAccounts` is answered like
/// `eth_accounts`.
pub struct RpcProvider {
    endpoint: String,
    http: reqwest::Client,
    next_id: Cell<u64>,
    account: Option<Address>,
    listeners: Listeners<ProviderEvent>,
    last_seen: RefCell<Option<WalletState>>,
}

impl Default for RpcProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RpcProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var(RPC_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: Cell::new(1),
            account: None,
            listeners: Listeners::default(),
            last_seen: RefCell::new(None),
        }
    }

    /// Act as `account` instead of whatever the node lists first.
    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Nodes push nothing, so account and chain changes are found by
    /// polling. The first call only records the baseline.
    pub async fn poll_wallet_changes(&self) -> Result<(), ProviderError> {
        let accounts = self.request("eth_accounts", json!([])).await?;
        let accounts: Vec<Address> = decode(accounts)?;
        let chain_id: U64 = decode(self.request("eth_chainId", json!([])).await?)?;
        let current = WalletState {
            accounts,
            chain_id: chain_id.to::<u64>(),
        };

        let previous = self.last_seen.replace(Some(current.clone()));
        if let Some(previous) = previous {
            for event in wallet_changes(&previous, &current) {
                debug!(?event, "node wallet state changed");
                self.listeners.emit(&event);
            }
        }
        Ok(())
    }

    async fn post(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.replace(self.next_id.get() + 1);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "json-rpc request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(format!("{method}: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ProviderError::Transport(format!("{method}: {err}")))?;

        match parse_envelope(&text) {
            Err(ProviderError::Malformed(_)) if !status.is_success() => {
                warn!(method, %status, "json-rpc endpoint returned an HTTP error");
                Err(ProviderError::Transport(format!("{method} HTTP {status}: {text}")))
            }
            other => other,
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for RpcProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match (method, self.account) {
            ("eth_accounts" | "eth_requestAccounts", Some(account)) => Ok(json!([account])),
            ("eth_requestAccounts", None) => self.post("eth_accounts", params).await,
            _ => self.post(method, params).await,
        }
    }

    fn subscribe(&self, handler: EventHandler) -> Subscription {
        self.listeners.add(handler)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ── JSON-RPC envelope ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Split a JSON-RPC 2.0 response into its result or error.
///
/// `"result": null` is a valid answer (a receipt that is not mined yet);
/// a body with neither member is not.
pub fn parse_envelope(text: &str) -> Result<Value, ProviderError> {
    let envelope: Value =
        serde_json::from_str(text).map_err(|err| ProviderError::Malformed(err.to_string()))?;
    let Value::Object(mut members) = envelope else {
        return Err(ProviderError::Malformed(format!(
            "expected a JSON-RPC object, got {text}"
        )));
    };

    if let Some(error) = members.remove("error").filter(|error| !error.is_null()) {
        let error: RpcErrorObject = serde_json::from_value(error)
            .map_err(|err| ProviderError::Malformed(format!("error object: {err}")))?;
        return Err(ProviderError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    members
        .remove("result")
        .ok_or_else(|| ProviderError::Malformed("response has no result".to_owned()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WalletState {
    accounts: Vec<Address>,
    chain_id: u64,
}

fn wallet_changes(previous: &WalletState, current: &WalletState) -> Vec<ProviderEvent> {
    let mut events = Vec::new();
    if previous.chain_id != current.chain_id {
        events.push(ProviderEvent::ChainChanged(current.chain_id));
    }
    if previous.accounts != current.accounts {
        events.push(ProviderEvent::AccountsChanged(current.accounts.clone()));
    }
    events
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|err| ProviderError::Malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use cc_wallet_provider::codes;

    const ALICE: Address = address!("0x1111111111111111111111111111111111111111");
    const BOB: Address = address!("0x2222222222222222222222222222222222222222");

    #[test]
    fn result_is_returned() {
        let value = parse_envelope(r#"{"jsonrpc":"2.0","id":1,"result":"0x7a69"}"#).unwrap();
        assert_eq!(value, json!("0x7a69"));
    }

    #[test]
    fn null_result_is_an_answer() {
        let value = parse_envelope(r#"{"jsonrpc":"2.0","id":4,"result":null}"#).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn error_object_keeps_code_and_data() {
        let text = r#"{"jsonrpc":"2.0","id":2,"error":{"code":3,"message":"execution reverted: Not authorized","data":"0x08c379a0"}}"#;
        let err = parse_envelope(text).unwrap_err();
        assert_eq!(
            err,
            ProviderError::Rpc {
                code: codes::EXECUTION_REVERTED,
                message: "execution reverted: Not authorized".to_owned(),
                data: Some(json!("0x08c379a0")),
            }
        );
    }

    #[test]
    fn empty_or_garbled_bodies_are_malformed() {
        assert!(matches!(
            parse_envelope(r#"{"jsonrpc":"2.0","id":3}"#),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_envelope("<html>bad gateway</html>"),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_envelope("[1,2]"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn endpoint_loses_trailing_slash() {
        let provider = RpcProvider::new(Some("http://127.0.0.1:8545/".to_owned()));
        assert_eq!(provider.endpoint(), "http://127.0.0.1:8545");
    }

    #[tokio::test]
    async fn pinned_account_answers_locally() {
        // Nothing listens on this port; a network request would fail.
        let provider =
            RpcProvider::new(Some("http://127.0.0.1:9".to_owned())).with_account(BOB);
        let accounts = provider
            .request("eth_requestAccounts", json!([]))
            .await
            .unwrap();
        assert_eq!(accounts, json!([BOB]));
    }

    #[test]
    fn wallet_changes_report_chain_before_accounts() {
        let before = WalletState {
            accounts: vec![ALICE],
            chain_id: 31337,
        };
        assert!(wallet_changes(&before, &before).is_empty());

        let after = WalletState {
            accounts: vec![BOB, ALICE],
            chain_id: 1,
        };
        assert_eq!(
            wallet_changes(&before, &after),
            vec![
                ProviderEvent::ChainChanged(1),
                ProviderEvent::AccountsChanged(vec![BOB, ALICE]),
            ]
        );
    }
}
