use crate::CourtError;
use alloy_primitives::{Address, U64};
use cc_api_types::CourtEvent;
use cc_contract::decode_log;
use cc_wallet_provider::{Listeners, LogFilter, ProviderExt, Subscription, WalletProvider};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Polls the court's logs and fans decoded events out to subscribers.
pub struct EventFeed<P: ?Sized> {
    provider: Rc<P>,
    contract: Address,
    next_block: Cell<Option<u64>>,
    polling: Cell<bool>,
    listeners: Listeners<CourtEvent>,
}

impl<P: WalletProvider + ?Sized> EventFeed<P> {
    /// The first poll starts at the current head.
    pub fn new(provider: Rc<P>, contract: Address) -> Self {
        Self {
            provider,
            contract,
            next_block: Cell::new(None),
            polling: Cell::new(false),
            listeners: Listeners::default(),
        }
    }

    pub fn starting_at(self, block: u64) -> Self {
        self.next_block.set(Some(block));
        self
    }

    pub fn subscribe(&self, handler: Rc<dyn Fn(&CourtEvent)>) -> Subscription {
        self.listeners.add(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Fetch logs up to the current head and dispatch them in chain order.
    ///
    /// A poll that starts while another is still waiting on the provider
    /// returns nothing, so no block range is delivered twice. Dropping a poll
    /// mid-flight frees the feed for the next one.
    pub async fn poll(&self) -> Result<Vec<CourtEvent>, CourtError> {
        if self.polling.replace(true) {
            return Ok(Vec::new());
        }
        let result = {
            let _polling = PollGuard(&self.polling);
            self.fetch().await
        };

        let events = result?;
        for event in &events {
            self.listeners.emit(event);
        }
        Ok(events)
    }

    async fn fetch(&self) -> Result<Vec<CourtEvent>, CourtError> {
        let head = self.provider.block_number().await?;
        let from = self.next_block.get().unwrap_or(head);
        if from > head {
            return Ok(Vec::new());
        }

        let filter = LogFilter {
            address: self.contract,
            from_block: U64::from(from),
            to_block: U64::from(head),
        };
        let logs = self.provider.logs(&filter).await?;
        self.next_block.set(Some(head + 1));
        debug!(from, head, logs = logs.len(), "court logs fetched");

        Ok(logs
            .iter()
            .filter(|log| log.address == self.contract)
            .filter_map(|log| match decode_log(log)? {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(%err, "skipping undecodable court log");
                    None
                }
            })
            .collect())
    }
}

struct PollGuard<'a>(&'a Cell<bool>);

impl Drop for PollGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
