use crate::session::{CourtContract, Session};
use crate::{CourtConfig, CourtError};
use alloy_primitives::{Address, B256, Bytes, U256};
use cc_api_types::{CourtEvent, CourtEventKind, Dispute, DisputeId, parse_account, parse_address};
use cc_contract::{Revert, RevertKind, calls, decode_log};
use cc_wallet_provider::{ProviderEvent, ProviderExt, Subscription, TransactionReceipt, WalletProvider};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A confirmed transaction and the court events it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub events: Vec<CourtEvent>,
}

/// Wallet/contract adapter.
///
/// Owns the wallet session explicitly: it is created by
/// [`connect_wallet`](Self::connect_wallet) or
/// [`check_wallet_connection`](Self::check_wallet_connection) and torn down
/// by [`disconnect`](Self::disconnect) or by wallet notifications. Session
/// state is never borrowed across an `.await`. Every teardown bumps an epoch,
/// and a connect that started under an older epoch is dropped when its
/// provider calls return.
pub struct CourtClient<P: ?Sized> {
    provider: Rc<P>,
    config: CourtConfig,
    contract: CourtContract<P>,
    session: RefCell<Option<Session<P>>>,
    epoch: Cell<u64>,
}

impl<P: WalletProvider + ?Sized + 'static> CourtClient<P> {
    pub fn new(provider: Rc<P>, config: CourtConfig) -> Self {
        let contract = CourtContract::new(config.contract_address, Rc::clone(&provider));
        Self {
            provider,
            config,
            contract,
            session: RefCell::new(None),
            epoch: Cell::new(0),
        }
    }

    pub fn config(&self) -> &CourtConfig {
        &self.config
    }

    pub fn provider(&self) -> &Rc<P> {
        &self.provider
    }

    /// Read-only contract handle; usable without a session.
    pub fn contract(&self) -> &CourtContract<P> {
        &self.contract
    }

    pub fn session(&self) -> Option<Session<P>> {
        self.session.borrow().clone()
    }

    pub fn connected_address(&self) -> Option<Address> {
        self.session.borrow().as_ref().map(Session::address)
    }

    pub fn is_connected(&self) -> bool {
        self.session.borrow().is_some()
    }

    // ── Connection ──

    /// Silent reconnect through `eth_accounts`. Never prompts the user.
    ///
    /// Resolves to `None` when a disconnect lands while the check is in
    /// flight.
    pub async fn check_wallet_connection(&self) -> Result<Option<Address>, CourtError> {
        let epoch = self.epoch.get();
        let accounts = self.provider.accounts().await?;
        let Some(address) = accounts.first().copied() else {
            debug!("no previously authorized wallet account");
            return Ok(None);
        };
        Ok(self.open_session(epoch, address).await?.then_some(address))
    }

    /// Prompt the wallet for account access. A refusal leaves any existing
    /// session untouched. A disconnect that lands before the wallet answers
    /// wins and the call fails with `NotConnected`.
    pub async fn connect_wallet(&self) -> Result<Address, CourtError> {
        let epoch = self.epoch.get();
        let accounts = self.provider.request_accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| CourtError::Decode("wallet returned no accounts".to_owned()))?;
        if !self.open_session(epoch, address).await? {
            return Err(CourtError::NotConnected);
        }
        Ok(address)
    }

    pub fn disconnect(&self) {
        self.epoch.set(self.epoch.get() + 1);
        if self.session.borrow_mut().take().is_some() {
            info!("wallet session closed");
        }
    }

    /// Returns `false` without touching the session if a disconnect happened
    /// since `epoch` was read.
    async fn open_session(&self, epoch: u64, address: Address) -> Result<bool, CourtError> {
        let chain_id = self.provider.chain_id().await?;
        if self.epoch.get() != epoch {
            debug!(%address, "wallet disconnected while connecting, dropping session");
            return Ok(false);
        }
        let session = Session::open(Rc::clone(&self.provider), &self.contract, address, chain_id);
        *self.session.borrow_mut() = Some(session);
        info!(%address, chain_id, "wallet session opened");
        Ok(true)
    }

    /// Apply a wallet notification to the session.
    ///
    /// An empty account list or a disconnect closes the session. A new first
    /// account rebinds it. A chain switch closes it, since the court address
    /// is only meaningful on the chain it was deployed to.
    pub fn handle_provider_event(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => self.disconnect(),
                Some(&address) => {
                    let mut slot = self.session.borrow_mut();
                    if let Some(current) = slot.as_ref() {
                        if current.address() != address {
                            let chain_id = current.chain_id();
                            *slot = Some(Session::open(
                                Rc::clone(&self.provider),
                                &self.contract,
                                address,
                                chain_id,
                            ));
                            info!(%address, "wallet account switched");
                        }
                    }
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                let connected_elsewhere = self
                    .session
                    .borrow()
                    .as_ref()
                    .is_some_and(|s| s.chain_id() != *chain_id);
                if connected_elsewhere {
                    warn!(chain_id, "wallet switched chains");
                    self.disconnect();
                }
            }
            ProviderEvent::Disconnect { code, message } => {
                warn!(code, %message, "wallet disconnected");
                self.disconnect();
            }
        }
    }

    /// Route wallet notifications into
    /// [`handle_provider_event`](Self::handle_provider_event) until the
    /// returned subscription is disposed.
    pub fn watch_wallet(self: &Rc<Self>) -> Subscription {
        let client: Weak<Self> = Rc::downgrade(self);
        self.provider.subscribe(Rc::new(move |event: &ProviderEvent| {
            if let Some(client) = client.upgrade() {
                client.handle_provider_event(event);
            }
        }))
    }

    // ── Writes ──

    pub async fn create_dispute(
        &self,
        defendant: &str,
        description: &str,
        value: U256,
    ) -> Result<DisputeId, CourtError> {
        let defendant = parse_account(defendant)
            .map_err(|err| CourtError::invalid_account("defendant", err))?;
        let description = description.trim();
        if description.is_empty() {
            return Err(CourtError::InvalidInput("description cannot be empty".to_owned()));
        }

        let value = (!value.is_zero()).then_some(value);
        let outcome = self
            .transact(calls::create_dispute(defendant, description), value)
            .await?;

        outcome
            .events
            .iter()
            .find_map(|event| match event.kind {
                CourtEventKind::DisputeCreated { dispute_id, .. } => Some(dispute_id),
                _ => None,
            })
            .ok_or_else(|| {
                CourtError::Decode(format!(
                    "transaction {} emitted no DisputeCreated event",
                    outcome.tx_hash
                ))
            })
    }

    pub async fn assign_arbitrator(
        &self,
        dispute_id: DisputeId,
        arbitrator: &str,
    ) -> Result<TxOutcome, CourtError> {
        let arbitrator = parse_account(arbitrator)
            .map_err(|err| CourtError::invalid_account("arbitrator", err))?;
        self.transact(calls::assign_arbitrator(dispute_id, arbitrator), None)
            .await
    }

    pub async fn resolve_dispute(
        &self,
        dispute_id: DisputeId,
        winner: &str,
    ) -> Result<TxOutcome, CourtError> {
        let winner = parse_account(winner).map_err(|err| CourtError::invalid_account("winner", err))?;
        self.transact(calls::resolve_dispute(dispute_id, winner), None)
            .await
    }

    pub async fn authorize_arbitrator(&self, arbitrator: &str) -> Result<TxOutcome, CourtError> {
        let arbitrator = parse_account(arbitrator)
            .map_err(|err| CourtError::invalid_account("arbitrator", err))?;
        self.transact(calls::authorize_arbitrator(arbitrator), None)
            .await
    }

    async fn transact(&self, data: Bytes, value: Option<U256>) -> Result<TxOutcome, CourtError> {
        let contract = self
            .session
            .borrow()
            .as_ref()
            .map(|session| session.contract().clone())
            .ok_or(CourtError::NotConnected)?;

        let tx_hash = contract.submit(data, value).await?;
        info!(%tx_hash, "transaction submitted");

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.succeeded() {
            return Err(CourtError::ContractRevert(Revert {
                kind: RevertKind::Other,
                reason: None,
            }));
        }

        let events = self.receipt_events(&receipt);
        let block_number = receipt.block_number.map(|n| n.to::<u64>());
        info!(%tx_hash, ?block_number, events = events.len(), "transaction confirmed");
        Ok(TxOutcome {
            tx_hash,
            block_number,
            events,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, CourtError> {
        let interval = self.config.receipt_poll_interval;
        let mut waited = Duration::ZERO;
        loop {
            if let Some(receipt) = self.provider.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if let Some(timeout) = self.config.receipt_timeout {
                if waited >= timeout {
                    return Err(CourtError::Pending { tx_hash });
                }
            }
            self.provider.sleep(interval).await;
            waited += interval;
        }
    }

    fn receipt_events(&self, receipt: &TransactionReceipt) -> Vec<CourtEvent> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == self.config.contract_address)
            .filter_map(|log| match decode_log(log)? {
                Ok(mut event) => {
                    event.block_number = event
                        .block_number
                        .or(receipt.block_number.map(|n| n.to::<u64>()));
                    event.tx_hash = event.tx_hash.or(Some(receipt.transaction_hash));
                    Some(event)
                }
                Err(err) => {
                    warn!(%err, "skipping undecodable court log");
                    None
                }
            })
            .collect()
    }

    // ── Reads ──

    pub async fn get_dispute(&self, dispute_id: DisputeId) -> Result<Dispute, CourtError> {
        self.contract.get_dispute(dispute_id).await
    }

    pub async fn get_dispute_count(&self) -> Result<U256, CourtError> {
        self.contract.get_dispute_count().await
    }

    /// Any well-formed address is asked about, the zero address included.
    pub async fn is_authorized_arbitrator(&self, arbitrator: &str) -> Result<bool, CourtError> {
        let arbitrator = parse_address(arbitrator)
            .map_err(|err| CourtError::invalid_account("arbitrator", err))?;
        self.contract.is_authorized_arbitrator(arbitrator).await
    }

    pub async fn arbitration_fee(&self) -> Result<U256, CourtError> {
        self.contract.arbitration_fee().await
    }

    pub async fn owner(&self) -> Result<Address, CourtError> {
        self.contract.owner().await
    }
}
