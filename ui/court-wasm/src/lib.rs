//! CryptoCourt browser front-end.
//!
//! Rust + WASM page controller over an injected EIP-1193 wallet. Each
//! concern lives in its own module; [`controller::App`] owns the session
//! and every registered listener.

pub mod config;
pub mod controller;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod render;

use gloo_console as console;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    config::restore_contract_input(&els);

    let Some(provider) = ethereum::InjectedProvider::detect() else {
        render::set_result_error(
            &els.wallet_status,
            "No Ethereum wallet found. Install a browser wallet and reload.",
        );
        return Ok(());
    };

    let Some(court) = config::court_config(&els) else {
        render::set_result_error(
            &els.wallet_status,
            "Enter the deployed CryptoCourt contract address and press Use.",
        );
        // Lives until the page reloads with a contract configured.
        events::bind_contract_input(&els)?.forget();
        return Ok(());
    };
    console::log!("cryptocourt contract", court.contract_address.to_string());

    let app = controller::App::mount(els, Rc::new(provider), court)?;
    app.start();
    Ok(())
}
