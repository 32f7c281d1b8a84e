//! CryptoCourt wallet/contract adapter.
//!
//! Front-ends hold one [`CourtClient`] per page or process. It connects to a
//! [`WalletProvider`](cc_wallet_provider::WalletProvider), exposes the
//! court's operations, and reports failures as [`CourtError`]. Contract
//! events arrive through an [`EventFeed`] and are folded into a
//! [`DisputeBoard`] keyed by dispute id.

mod board;
mod client;
mod config;
mod error;
mod feed;
mod session;
#[cfg(test)]
mod testing;

pub use board::DisputeBoard;
pub use client::{CourtClient, TxOutcome};
pub use config::{
    CONTRACT_ADDRESS_ENV, CourtConfig, RECEIPT_POLL_MS_ENV, RECEIPT_TIMEOUT_SECS_ENV,
};
pub use error::CourtError;
pub use feed::EventFeed;
pub use session::{CourtContract, Session, SignerHandle};

pub use cc_contract::{Revert, RevertKind};
