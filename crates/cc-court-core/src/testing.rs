//! Scripted in-memory provider for adapter tests.

use alloy_primitives::hex;
use async_trait::async_trait;
use cc_wallet_provider::{
    EventHandler, Listeners, ProviderError, ProviderEvent, Subscription, WalletProvider, codes,
};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
pub(crate) struct MockProvider {
    scripted: RefCell<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    requests: RefCell<Vec<(String, Value)>>,
    listeners: Listeners<ProviderEvent>,
    sleeps: Cell<u32>,
    held: RefCell<HashSet<String>>,
}

impl MockProvider {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn ok(&self, method: &str, value: Value) {
        self.push(method, Ok(value));
    }

    pub(crate) fn fail(&self, method: &str, err: ProviderError) {
        self.push(method, Err(err));
    }

    fn push(&self, method: &str, result: Result<Value, ProviderError>) {
        self.scripted
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(result);
    }

    /// Park calls to `method` until [`release`](Self::release), so a test can
    /// interleave other work with an in-flight request.
    pub(crate) fn hold(&self, method: &str) {
        self.held.borrow_mut().insert(method.to_owned());
    }

    pub(crate) fn release(&self, method: &str) {
        self.held.borrow_mut().remove(method);
    }

    fn is_held(&self, method: &str) -> bool {
        self.held.borrow().contains(method)
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub(crate) fn total(&self) -> usize {
        self.requests.borrow().len()
    }

    pub(crate) fn params(&self, method: &str) -> Vec<Value> {
        self.requests
            .borrow()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub(crate) fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }

    pub(crate) fn emit(&self, event: ProviderEvent) {
        self.listeners.emit(&event);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.requests
            .borrow_mut()
            .push((method.to_owned(), params));
        while self.is_held(method) {
            tokio::task::yield_now().await;
        }
        self.scripted
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ProviderError::rpc(
                    codes::UNSUPPORTED_METHOD,
                    format!("unscripted {method}"),
                ))
            })
    }

    fn subscribe(&self, handler: EventHandler) -> Subscription {
        self.listeners.add(handler)
    }

    async fn sleep(&self, _duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

pub(crate) fn hex_value(bytes: impl AsRef<[u8]>) -> Value {
    json!(format!("0x{}", hex::encode(bytes)))
}
