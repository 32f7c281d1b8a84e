use alloy_primitives::{B256, hex};
use cc_api_types::{InvalidAccount, UnknownStatus};
use cc_contract::{AbiError, Revert};
use cc_wallet_provider::{ProviderError, codes};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CourtError {
    #[error("transaction rejected in the wallet")]
    TransactionRejected,
    #[error("contract call {0}")]
    ContractRevert(Revert),
    #[error("network error: {0}")]
    Network(String),
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("wallet not connected")]
    NotConnected,
    #[error("transaction {tx_hash} still pending")]
    Pending { tx_hash: B256 },
    #[error("wallet provider error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl CourtError {
    pub(crate) fn invalid_account(field: &str, err: InvalidAccount) -> Self {
        CourtError::InvalidInput(format!("{field}: {err}"))
    }
}

impl From<AbiError> for CourtError {
    fn from(err: AbiError) -> Self {
        CourtError::Decode(err.to_string())
    }
}

impl From<ProviderError> for CourtError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Rpc {
                code,
                message,
                data,
            } => from_rpc(code, message, data),
            ProviderError::Transport(message) => CourtError::Network(message),
            ProviderError::Malformed(message) => CourtError::Decode(message),
        }
    }
}

fn from_rpc(code: i64, message: String, data: Option<Value>) -> CourtError {
    let lower = message.to_ascii_lowercase();

    if code == codes::USER_REJECTED
        || lower.contains("user rejected")
        || lower.contains("user denied")
    {
        return CourtError::TransactionRejected;
    }
    if code == codes::UNAUTHORIZED {
        return CourtError::NotConnected;
    }
    if code == codes::DISCONNECTED || code == codes::CHAIN_DISCONNECTED {
        return CourtError::Network(message);
    }

    let payload = data.as_ref().and_then(revert_payload);
    if code == codes::EXECUTION_REVERTED || lower.contains("revert") || payload.is_some() {
        let revert = match payload {
            Some(bytes) => {
                let decoded = Revert::from_data(&bytes);
                if decoded.reason.is_some() {
                    decoded
                } else {
                    Revert::from_message(&message)
                }
            }
            None => Revert::from_message(&message),
        };
        return CourtError::ContractRevert(revert);
    }

    if code == codes::INTERNAL_ERROR {
        return CourtError::Network(message);
    }
    CourtError::Rpc { code, message }
}

/// Revert bytes as wallets attach them: a bare hex string, or nested under
/// `data` / `originalError` objects.
fn revert_payload(value: &Value) -> Option<Vec<u8>> {
    fn walk(value: &Value, depth: u8) -> Option<Vec<u8>> {
        if depth == 0 {
            return None;
        }
        match value {
            Value::String(text) if text.starts_with("0x") && text.len() > 2 => {
                hex::decode(text).ok()
            }
            Value::Object(map) => ["data", "originalError", "error"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|inner| walk(inner, depth - 1)),
            _ => None,
        }
    }
    walk(value, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{Revert as SolRevert, SolError};
    use cc_contract::RevertKind;
    use serde_json::json;

    fn rpc(code: i64, message: &str, data: Option<Value>) -> ProviderError {
        ProviderError::Rpc {
            code,
            message: message.to_owned(),
            data,
        }
    }

    #[test]
    fn user_rejection_maps_to_transaction_rejected() {
        assert_eq!(
            CourtError::from(rpc(4001, "User rejected the request.", None)),
            CourtError::TransactionRejected
        );
        assert_eq!(
            CourtError::from(rpc(-32000, "MetaMask Tx Signature: User denied transaction signature.", None)),
            CourtError::TransactionRejected
        );
    }

    #[test]
    fn transport_failures_are_network_errors() {
        assert!(matches!(
            CourtError::from(ProviderError::Transport("connection refused".into())),
            CourtError::Network(_)
        ));
        assert!(matches!(
            CourtError::from(rpc(4900, "disconnected", None)),
            CourtError::Network(_)
        ));
    }

    #[test]
    fn nested_revert_data_is_decoded() {
        let encoded = SolRevert {
            reason: "Only authorized arbitrator".to_owned(),
        }
        .abi_encode();
        let data = json!({
            "originalError": {
                "data": format!("0x{}", hex::encode(encoded)),
                "message": "execution reverted"
            }
        });

        let CourtError::ContractRevert(revert) =
            CourtError::from(rpc(-32603, "Internal JSON-RPC error.", Some(data)))
        else {
            panic!("expected a revert");
        };
        assert_eq!(revert.kind, RevertKind::Unauthorized);
        assert_eq!(revert.reason.as_deref(), Some("Only authorized arbitrator"));
    }

    #[test]
    fn message_only_revert_is_classified() {
        let err = CourtError::from(rpc(3, "execution reverted: Dispute does not exist", None));
        assert_eq!(
            err,
            CourtError::ContractRevert(Revert {
                kind: RevertKind::NotFound,
                reason: Some("Dispute does not exist".to_owned()),
            })
        );
    }

    #[test]
    fn other_rpc_errors_keep_their_code() {
        assert_eq!(
            CourtError::from(rpc(-32000, "insufficient funds for gas * price + value", None)),
            CourtError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".to_owned()
            }
        );
    }
}
