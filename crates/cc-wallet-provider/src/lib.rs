//! Wallet provider seam.
//!
//! A [`WalletProvider`] is anything that speaks the EIP-1193 request shape:
//! an injected browser wallet, a JSON-RPC node, or a test double. Signing
//! always happens on the provider side.

mod eth;
mod listeners;

pub use eth::{Log, LogFilter, ProviderExt, TransactionReceipt, TransactionRequest};
pub use listeners::{Listeners, Subscription};

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;

/// EIP-1193 and JSON-RPC error codes the client reacts to.
pub mod codes {
    pub const EXECUTION_REVERTED: i64 = 3;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("provider transport error: {0}")]
    Transport(String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        ProviderError::Rpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Wallet-side notifications, as emitted by EIP-1193 `on(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnect { code: i64, message: String },
}

pub type EventHandler = Rc<dyn Fn(&ProviderEvent)>;

/// Futures are `?Send`: the browser provider holds `JsValue`s and the
/// whole client runs on a single event loop.
#[async_trait(?Send)]
pub trait WalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register for wallet notifications. Dropping or disposing the
    /// returned handle unregisters the handler.
    fn subscribe(&self, handler: EventHandler) -> Subscription;

    /// Suspend for `duration` on the provider's own event loop.
    async fn sleep(&self, duration: Duration);
}
