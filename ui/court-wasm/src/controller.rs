//! Page controller.
//!
//! [`App`] is the single owner of the court client, the dispute board and
//! every listener registered on behalf of the page.

use crate::dom::{self, Elements};
use crate::ethereum::InjectedProvider;
use crate::events::{self, Listener};
use crate::render;
use alloy_primitives::U256;
use cc_api_types::{CourtEvent, DisputeId, parse_ether, short_address};
use cc_court_core::{
    CourtClient, CourtConfig, CourtError, DisputeBoard, EventFeed, TxOutcome,
};
use cc_wallet_provider::{ProviderEvent, Subscription, WalletProvider};
use gloo_console as console;
use gloo_timers::callback::Interval;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

const EVENT_POLL_MS: u32 = 4_000;
const RECENT_DISPUTES: u64 = 20;

pub type Client = CourtClient<InjectedProvider>;

thread_local! {
    /// The mounted page. Listeners only hold weak references, so this is
    /// what keeps the app alive until teardown.
    static MOUNTED: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

pub struct App {
    pub els: Elements,
    client: Rc<Client>,
    feed: EventFeed<InjectedProvider>,
    board: RefCell<DisputeBoard>,
    bindings: RefCell<Vec<Listener>>,
    subscriptions: RefCell<Vec<Subscription>>,
    ticker: RefCell<Option<Interval>>,
}

impl App {
    pub fn mount(
        els: Elements,
        provider: Rc<InjectedProvider>,
        config: CourtConfig,
    ) -> Result<Rc<Self>, JsValue> {
        let feed = EventFeed::new(Rc::clone(&provider), config.contract_address);
        let app = Rc::new(Self {
            els,
            client: Rc::new(CourtClient::new(provider, config)),
            feed,
            board: RefCell::new(DisputeBoard::default()),
            bindings: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            ticker: RefCell::new(None),
        });
        let bindings = events::bind_events(&app)?;
        app.bindings.replace(bindings);
        Ok(app)
    }

    /// Wire wallet and contract notifications, then restore any existing
    /// wallet authorization without prompting.
    pub fn start(self: &Rc<Self>) {
        MOUNTED.with(|mounted| mounted.replace(Some(Rc::clone(self))));

        let wallet = self.client.watch_wallet();

        let weak = Rc::downgrade(self);
        let wallet_view = self
            .client
            .provider()
            .subscribe(Rc::new(move |event: &ProviderEvent| {
                if let Some(app) = weak.upgrade() {
                    console::log!("wallet notification", format!("{event:?}"));
                    app.render_wallet();
                }
            }));

        let weak = Rc::downgrade(self);
        let court_events = self.feed.subscribe(Rc::new(move |event: &CourtEvent| {
            if let Some(app) = weak.upgrade() {
                console::log!("court event", render::event_summary(event));
                app.board.borrow_mut().apply_event(event);
            }
        }));
        self.subscriptions
            .borrow_mut()
            .extend([wallet, wallet_view, court_events]);

        let weak = Rc::downgrade(self);
        self.ticker.replace(Some(Interval::new(EVENT_POLL_MS, move || {
            if let Some(app) = weak.upgrade() {
                spawn_local(async move { app.poll_events().await });
            }
        })));

        let app = Rc::clone(self);
        spawn_local(async move {
            app.check_connection().await;
            app.refresh_info().await;
            app.load_recent_disputes().await;
        });
    }

    /// Drop every listener, timer and the wallet session.
    pub fn teardown(&self) {
        self.ticker.take();
        self.subscriptions.take();
        self.bindings.take();
        self.client.disconnect();
        MOUNTED.with(|mounted| mounted.take());
        console::log!("cryptocourt page torn down");
    }

    // ── Wallet ──

    async fn check_connection(self: &Rc<Self>) {
        match self.client.check_wallet_connection().await {
            Ok(_) => self.render_wallet(),
            Err(err) => render::set_result_error(&self.els.wallet_status, &render::describe(&err)),
        }
    }

    pub async fn on_connect(self: &Rc<Self>) {
        render::set_pending(&self.els.wallet_status, "Waiting for the wallet...");
        match self.client.connect_wallet().await {
            Ok(address) => {
                console::log!("wallet connected", address.to_string());
                self.render_wallet();
                self.refresh_info().await;
            }
            Err(err) => render::set_result_error(&self.els.wallet_status, &render::describe(&err)),
        }
    }

    pub async fn on_disconnect(self: &Rc<Self>) {
        self.client.disconnect();
        self.render_wallet();
    }

    fn render_wallet(&self) {
        let session = self.client.session();
        let connected = session.is_some();
        dom::toggle_class(&self.els.connect_btn, "hidden", connected);
        dom::toggle_class(&self.els.disconnect_btn, "hidden", !connected);

        let view = match session {
            Some(session) => json!({
                "account": session.address(),
                "short": short_address(&session.address()),
                "chainId": session.chain_id(),
            }),
            None => json!({
                "account": null,
                "hint": "Connect a wallet to file or arbitrate disputes.",
            }),
        };
        render::set_result(&self.els.wallet_status, &view);
        self.render_board();
    }

    // ── Reads ──

    pub async fn refresh_info(self: &Rc<Self>) {
        let client = &self.client;
        let info = async {
            let owner = client.owner().await?;
            let fee = client.arbitration_fee().await?;
            let count = client.get_dispute_count().await?;
            let me = client.connected_address();
            let arbitrator = match me {
                Some(address) => Some(client.contract().is_authorized_arbitrator(address).await?),
                None => None,
            };
            Ok::<_, CourtError>(json!({
                "contract": client.config().contract_address,
                "owner": owner,
                "arbitrationFee": format!("{} ETH", cc_api_types::format_ether(fee)),
                "disputeCount": count.to_string(),
                "youAreOwner": me.map(|address| address == owner),
                "youAreArbitrator": arbitrator,
            }))
        }
        .await;

        match info {
            Ok(info) => render::set_result(&self.els.court_info, &info),
            Err(err) => render::set_result_error(&self.els.court_info, &render::describe(&err)),
        }
    }

    pub async fn on_lookup(self: &Rc<Self>) {
        let id = match render::parse_dispute_id(&dom::get_input_value(&self.els.lookup_dispute_id)) {
            Ok(id) => id,
            Err(msg) => return render::set_result_error(&self.els.lookup_result, &msg),
        };
        if let Some(dispute) = self.load_dispute(id, Some(&self.els.lookup_result)).await {
            render::set_result(&self.els.lookup_result, &render::dispute_json(&dispute));
        }
    }

    /// Fetch one dispute into the board. Failures go to `report` when given,
    /// otherwise to the console.
    async fn load_dispute(
        self: &Rc<Self>,
        id: DisputeId,
        report: Option<&Element>,
    ) -> Option<cc_api_types::Dispute> {
        match self.client.get_dispute(id).await {
            Ok(dispute) => {
                self.board.borrow_mut().upsert(dispute.clone());
                self.render_board();
                Some(dispute)
            }
            Err(err) => {
                match report {
                    Some(el) => render::set_result_error(el, &render::describe(&err)),
                    None => console::warn!("could not load dispute", id.to_string(), err.to_string()),
                }
                None
            }
        }
    }

    /// Load the newest disputes concurrently; each lands on its own card
    /// whatever order the answers arrive in.
    async fn load_recent_disputes(self: &Rc<Self>) {
        let count = match self.client.get_dispute_count().await {
            Ok(count) => count,
            Err(err) => {
                console::warn!("could not read dispute count", err.to_string());
                return;
            }
        };
        // Ids may start at 0 or 1 depending on the deployment; probing both
        // ends costs one extra read and missing ids are skipped.
        let mut id = count.saturating_sub(U256::from(RECENT_DISPUTES));
        while id <= count {
            let app = Rc::clone(self);
            spawn_local(async move {
                match app.client.get_dispute(id).await {
                    Ok(dispute) => {
                        app.board.borrow_mut().upsert(dispute);
                        app.render_board();
                    }
                    Err(err) if render::is_missing_dispute(&err) => {}
                    Err(err) => console::warn!("could not load dispute", id.to_string(), err.to_string()),
                }
            });
            id += U256::from(1);
        }
    }

    async fn poll_events(self: &Rc<Self>) {
        match self.feed.poll().await {
            Ok(events) if events.is_empty() => {}
            Ok(_) => {
                let stale = self.board.borrow().stale_ids();
                for id in stale {
                    self.load_dispute(id, None).await;
                }
            }
            Err(err) => console::warn!("court event poll failed", err.to_string()),
        }
    }

    fn render_board(&self) {
        let result = render::render_board(
            &self.els.dispute_list,
            &self.board.borrow(),
            self.client.connected_address(),
        );
        if let Err(err) = result {
            console::error!("could not render disputes", err);
        }
    }

    // ── Writes ──

    pub async fn on_create_dispute(self: &Rc<Self>) {
        let els = &self.els;
        let amount = dom::get_input_value(&els.dispute_amount);
        let value = if amount.is_empty() {
            U256::ZERO
        } else {
            match parse_ether(&amount) {
                Ok(value) => value,
                Err(err) => {
                    return render::set_result_error(&els.create_result, &format!("Amount: {err}"));
                }
            }
        };

        render::set_pending(&els.create_result, "Confirm the transaction in your wallet...");
        let created = self
            .client
            .create_dispute(
                &dom::get_input_value(&els.defendant_address),
                &dom::get_textarea_value(&els.dispute_description),
                value,
            )
            .await;

        match created {
            Ok(id) => {
                render::set_result(&els.create_result, &json!({ "disputeId": id.to_string() }));
                els.dispute_description.set_value("");
                self.load_dispute(id, None).await;
            }
            Err(err) => render::set_result_error(&els.create_result, &render::describe(&err)),
        }
    }

    pub async fn on_assign_arbitrator(self: &Rc<Self>) {
        let els = &self.els;
        let id = match render::parse_dispute_id(&dom::get_input_value(&els.assign_dispute_id)) {
            Ok(id) => id,
            Err(msg) => return render::set_result_error(&els.assign_result, &msg),
        };
        render::set_pending(&els.assign_result, "Confirm the transaction in your wallet...");
        let outcome = self
            .client
            .assign_arbitrator(id, &dom::get_input_value(&els.arbitrator_address))
            .await;
        self.finish_write(&els.assign_result, Some(id), outcome).await;
    }

    pub async fn on_resolve_dispute(self: &Rc<Self>) {
        let els = &self.els;
        let id = match render::parse_dispute_id(&dom::get_input_value(&els.resolve_dispute_id)) {
            Ok(id) => id,
            Err(msg) => return render::set_result_error(&els.resolve_result, &msg),
        };
        render::set_pending(&els.resolve_result, "Confirm the transaction in your wallet...");
        let outcome = self
            .client
            .resolve_dispute(id, &dom::get_input_value(&els.winner_address))
            .await;
        self.finish_write(&els.resolve_result, Some(id), outcome).await;
    }

    pub async fn on_authorize_arbitrator(self: &Rc<Self>) {
        let els = &self.els;
        render::set_pending(&els.authorize_result, "Confirm the transaction in your wallet...");
        let outcome = self
            .client
            .authorize_arbitrator(&dom::get_input_value(&els.authorize_address))
            .await;
        self.finish_write(&els.authorize_result, None, outcome).await;
        self.refresh_info().await;
    }

    async fn finish_write(
        self: &Rc<Self>,
        pane: &Element,
        dispute: Option<DisputeId>,
        outcome: Result<TxOutcome, CourtError>,
    ) {
        match outcome {
            Ok(outcome) => {
                render::set_result(pane, &render::outcome_json(&outcome));
                if let Some(id) = dispute {
                    self.load_dispute(id, None).await;
                }
            }
            Err(err) => render::set_result_error(pane, &render::describe(&err)),
        }
    }
}
