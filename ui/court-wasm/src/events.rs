//! Event binding.
//!
//! Every registration returns a [`Listener`] that removes its callback when
//! dropped. The controller keeps them and drops them on page hide.

use crate::config;
use crate::controller::App;
use crate::dom::{self, Elements};
use crate::render;
use cc_api_types::parse_account;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Option<Closure<dyn FnMut(Event)>>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback: Some(callback),
        })
    }

    /// Leave the callback attached for the lifetime of the page.
    pub fn forget(mut self) {
        if let Some(callback) = self.callback.take() {
            callback.forget();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, callback.as_ref().unchecked_ref());
        }
    }
}

/// Helper: attach an async click handler that runs while the app is alive.
macro_rules! on_click_async {
    ($bindings:expr, $el:expr, $app:expr, $handler:path) => {{
        let app = Rc::downgrade($app);
        $bindings.push(Listener::new($el.as_ref(), "click", move |_: Event| {
            if let Some(app) = app.upgrade() {
                wasm_bindgen_futures::spawn_local(async move {
                    $handler(&app).await;
                });
            }
        })?);
    }};
}

/// Bind all UI event listeners. Call once after mount.
pub fn bind_events(app: &Rc<App>) -> Result<Vec<Listener>, JsValue> {
    let els = &app.els;
    let mut bindings = Vec::new();

    // ── Tabs ──
    for tab in &els.tabs {
        let tab_name = tab.get_attribute("data-tab").unwrap_or_default();
        let els2 = els.clone();
        bindings.push(Listener::new(tab.as_ref(), "click", move |_| {
            set_active_tab(&els2, &tab_name);
        })?);
    }

    // ── Wallet ──
    on_click_async!(bindings, els.connect_btn, app, App::on_connect);
    on_click_async!(bindings, els.disconnect_btn, app, App::on_disconnect);
    bindings.push(bind_contract_input(els)?);

    // ── Court ──
    on_click_async!(bindings, els.refresh_info_btn, app, App::refresh_info);
    on_click_async!(bindings, els.create_dispute_btn, app, App::on_create_dispute);
    on_click_async!(bindings, els.assign_btn, app, App::on_assign_arbitrator);
    on_click_async!(bindings, els.resolve_btn, app, App::on_resolve_dispute);
    on_click_async!(bindings, els.authorize_btn, app, App::on_authorize_arbitrator);
    on_click_async!(bindings, els.lookup_btn, app, App::on_lookup);

    // ── Page teardown ──
    {
        let app = Rc::downgrade(app);
        bindings.push(Listener::new(dom::window().as_ref(), "pagehide", move |_| {
            if let Some(app) = app.upgrade() {
                // Not from inside this callback: teardown drops it.
                wasm_bindgen_futures::spawn_local(async move { app.teardown() });
            }
        })?);
    }

    Ok(bindings)
}

/// "Use" stores the typed contract address and reloads the page with it.
pub fn bind_contract_input(els: &Elements) -> Result<Listener, JsValue> {
    let els2 = els.clone();
    Listener::new(els.use_contract_btn.as_ref(), "click", move |_| {
        let typed = dom::get_input_value(&els2.contract_address);
        let stored = parse_account(&typed)
            .map_err(|err| JsValue::from_str(&format!("contract address: {err}")))
            .and_then(|address| config::remember_contract(&address.to_checksum(None)))
            .and_then(|_| dom::window().location().reload());
        if let Err(err) = stored {
            let message = err.as_string().unwrap_or_else(|| format!("{err:?}"));
            render::set_result_error(&els2.wallet_status, &message);
        }
    })
}

/// Switch active tab and panel.
fn set_active_tab(els: &Elements, tab_name: &str) {
    for tab in &els.tabs {
        dom::toggle_class(tab, "active", tab.get_attribute("data-tab").as_deref() == Some(tab_name));
    }
    for panel in &els.panels {
        dom::toggle_class(panel, "active", panel.id() == tab_name);
    }
}
