//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

// ── Helpers ──

pub fn window() -> web_sys::Window {
    web_sys::window().expect("no global window")
}

fn doc() -> Document {
    window().document().expect("window has no document")
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(nodes) = doc().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    doc().create_element(tag)
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn get_textarea_value(el: &HtmlTextAreaElement) -> String {
    el.value().trim().to_string()
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

// ── Elements struct ──

/// All DOM element references used by the court UI.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Header / config
    pub contract_address: HtmlInputElement,
    pub use_contract_btn: HtmlElement,

    // Tabs
    pub tabs: Vec<Element>,
    pub panels: Vec<Element>,

    // Wallet
    pub connect_btn: HtmlElement,
    pub disconnect_btn: HtmlElement,
    pub wallet_status: Element,

    // Court info
    pub refresh_info_btn: HtmlElement,
    pub court_info: Element,

    // File a dispute
    pub defendant_address: HtmlInputElement,
    pub dispute_description: HtmlTextAreaElement,
    pub dispute_amount: HtmlInputElement,
    pub create_dispute_btn: HtmlElement,
    pub create_result: Element,

    // Arbitration
    pub assign_dispute_id: HtmlInputElement,
    pub arbitrator_address: HtmlInputElement,
    pub assign_btn: HtmlElement,
    pub assign_result: Element,
    pub resolve_dispute_id: HtmlInputElement,
    pub winner_address: HtmlInputElement,
    pub resolve_btn: HtmlElement,
    pub resolve_result: Element,

    // Owner
    pub authorize_address: HtmlInputElement,
    pub authorize_btn: HtmlElement,
    pub authorize_result: Element,

    // Disputes
    pub lookup_dispute_id: HtmlInputElement,
    pub lookup_btn: HtmlElement,
    pub lookup_result: Element,
    pub dispute_list: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_textarea {
    ($id:expr) => {
        by_id_typed::<HtmlTextAreaElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing textarea #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once the document has loaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            contract_address: get_input!("contractAddress"),
            use_contract_btn: get_html!("useContractBtn"),

            tabs: query_all(".tab"),
            panels: query_all(".panel"),

            connect_btn: get_html!("connectBtn"),
            disconnect_btn: get_html!("disconnectBtn"),
            wallet_status: get_el!("walletStatus"),

            refresh_info_btn: get_html!("refreshInfoBtn"),
            court_info: get_el!("courtInfo"),

            defendant_address: get_input!("defendantAddress"),
            dispute_description: get_textarea!("disputeDescription"),
            dispute_amount: get_input!("disputeAmount"),
            create_dispute_btn: get_html!("createDisputeBtn"),
            create_result: get_el!("createResult"),

            assign_dispute_id: get_input!("assignDisputeId"),
            arbitrator_address: get_input!("arbitratorAddress"),
            assign_btn: get_html!("assignBtn"),
            assign_result: get_el!("assignResult"),
            resolve_dispute_id: get_input!("resolveDisputeId"),
            winner_address: get_input!("winnerAddress"),
            resolve_btn: get_html!("resolveBtn"),
            resolve_result: get_el!("resolveResult"),

            authorize_address: get_input!("authorizeAddress"),
            authorize_btn: get_html!("authorizeBtn"),
            authorize_result: get_el!("authorizeResult"),

            lookup_dispute_id: get_input!("lookupDisputeId"),
            lookup_btn: get_html!("lookupBtn"),
            lookup_result: get_el!("lookupResult"),
            dispute_list: get_el!("disputeList"),
        })
    }
}
