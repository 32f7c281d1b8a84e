//! Injected EIP-1193 wallet (`window.ethereum`).
//!
//! Requests go through `ethereum.request({ method, params })`. Wallet
//! notifications are bridged once into a [`Listeners`] registry and the
//! bridges are removed again when the provider is dropped.

use alloy_primitives::{Address, U64};
use async_trait::async_trait;
use cc_wallet_provider::{
    EventHandler, Listeners, ProviderError, ProviderEvent, Subscription, WalletProvider, codes,
};
use gloo_console as console;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const ACCOUNTS_CHANGED: &str = "accountsChanged";
const CHAIN_CHANGED: &str = "chainChanged";
const DISCONNECT: &str = "disconnect";

pub struct InjectedProvider {
    ethereum: Object,
    listeners: Listeners<ProviderEvent>,
    bridges: Vec<(&'static str, Closure<dyn FnMut(JsValue)>)>,
}

impl InjectedProvider {
    /// `None` when no wallet extension injected `window.ethereum`.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        let ethereum = ethereum.dyn_into::<Object>().ok()?;

        let listeners = Listeners::default();
        let mut bridges = Vec::new();
        for name in [ACCOUNTS_CHANGED, CHAIN_CHANGED, DISCONNECT] {
            let sink = listeners.clone();
            let bridge = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
                match decode_event(name, payload) {
                    Some(event) => sink.emit(&event),
                    None => console::warn!("unreadable wallet notification", name),
                }
            });
            let args = [JsValue::from_str(name), bridge.as_ref().clone()];
            if let Err(err) = call(&ethereum, "on", &args) {
                console::warn!("wallet does not emit", name, err);
                continue;
            }
            bridges.push((name, bridge));
        }

        Some(Self {
            ethereum,
            listeners,
            bridges,
        })
    }
}

impl Drop for InjectedProvider {
    fn drop(&mut self) {
        for (name, bridge) in &self.bridges {
            let args = [JsValue::from_str(name), bridge.as_ref().clone()];
            let _ = call(&self.ethereum, "removeListener", &args);
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = Object::new();
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| ProviderError::Malformed(err.to_string()))?;
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .and_then(|_| Reflect::set(&args, &JsValue::from_str("params"), &params))
            .map_err(provider_error)?;

        let pending = call(&self.ethereum, "request", &[args.into()]).map_err(provider_error)?;
        let result = JsFuture::from(Promise::resolve(&pending))
            .await
            .map_err(provider_error)?;

        serde_wasm_bindgen::from_value(result).map_err(|err| ProviderError::Malformed(err.to_string()))
    }

    fn subscribe(&self, handler: EventHandler) -> Subscription {
        self.listeners.add(handler)
    }

    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

fn call(target: &Object, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let function = Reflect::get(target, &JsValue::from_str(method))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("ethereum.{method} is not a function")))?;
    function.apply(target, &args.iter().collect::<js_sys::Array>())
}

/// Wallets reject with `{ code, message, data }`; anything without a
/// numeric code never reached the wallet.
fn provider_error(err: JsValue) -> ProviderError {
    let field = |name: &str| {
        Reflect::get(&err, &JsValue::from_str(name))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
    };
    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));

    match field("code").and_then(|c| c.as_f64()) {
        Some(code) => ProviderError::Rpc {
            code: code as i64,
            message,
            data: field("data").and_then(|d| serde_wasm_bindgen::from_value(d).ok()),
        },
        None => ProviderError::Transport(message),
    }
}

fn decode_event(name: &str, payload: JsValue) -> Option<ProviderEvent> {
    match name {
        ACCOUNTS_CHANGED => serde_wasm_bindgen::from_value::<Vec<Address>>(payload)
            .ok()
            .map(ProviderEvent::AccountsChanged),
        CHAIN_CHANGED => serde_wasm_bindgen::from_value::<U64>(payload)
            .ok()
            .map(|id| ProviderEvent::ChainChanged(id.to::<u64>())),
        DISCONNECT => Some(match provider_error(payload) {
            ProviderError::Rpc { code, message, .. } => ProviderEvent::Disconnect { code, message },
            other => ProviderEvent::Disconnect {
                code: codes::DISCONNECTED,
                message: other.to_string(),
            },
        }),
        _ => None,
    }
}
