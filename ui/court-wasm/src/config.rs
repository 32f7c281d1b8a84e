//! Contract address selection.
//!
//! Priority: user-supplied `#contractAddress` input → `cc_contract_address`
//! in localStorage.

use crate::dom::{self, Elements};
use cc_api_types::parse_account;
use cc_court_core::CourtConfig;
use gloo_console as console;
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen::JsValue;

pub const CONTRACT_STORAGE_KEY: &str = "cc_contract_address";

pub fn contract_address(els: &Elements) -> Option<String> {
    pick_contract(
        &dom::get_input_value(&els.contract_address),
        LocalStorage::get::<String>(CONTRACT_STORAGE_KEY).ok(),
    )
}

fn pick_contract(typed: &str, stored: Option<String>) -> Option<String> {
    let typed = typed.trim();
    if !typed.is_empty() {
        return Some(typed.to_string());
    }
    stored
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn court_config(els: &Elements) -> Option<CourtConfig> {
    let raw = contract_address(els)?;
    match parse_account(&raw) {
        Ok(address) => Some(CourtConfig::new(address)),
        Err(err) => {
            console::warn!("ignoring contract address", raw, err.to_string());
            None
        }
    }
}

/// Show the remembered address so the user can see which court is in use.
pub fn restore_contract_input(els: &Elements) {
    if dom::get_input_value(&els.contract_address).is_empty() {
        if let Ok(saved) = LocalStorage::get::<String>(CONTRACT_STORAGE_KEY) {
            els.contract_address.set_value(&saved);
        }
    }
}

pub fn remember_contract(address: &str) -> Result<(), JsValue> {
    LocalStorage::set(CONTRACT_STORAGE_KEY, address)
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_address_wins_over_storage() {
        assert_eq!(
            pick_contract(" 0xabc ", Some("0xdef".into())).as_deref(),
            Some("0xabc")
        );
    }

    #[test]
    fn storage_is_the_fallback() {
        assert_eq!(pick_contract("", Some("0xdef".into())).as_deref(), Some("0xdef"));
        assert_eq!(pick_contract("", Some("  ".into())), None);
        assert_eq!(pick_contract("", None), None);
    }
}
