//! Result panes and dispute cards.

use crate::dom;
use alloy_primitives::{Address, U256};
use cc_api_types::{CourtEvent, Dispute, DisputeId, format_ether, short_address, status_label};
use cc_court_core::{CourtError, DisputeBoard, RevertKind, TxOutcome};
use serde_json::{Value, json};
use wasm_bindgen::JsValue;
use web_sys::Element;

/// Write a JSON result into a `<pre>` element.
pub fn set_result(el: &Element, value: &Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    dom::remove_class(el, "error");
    el.set_text_content(Some(&pretty));
}

/// Write an error string into a `<pre>` element.
pub fn set_result_error(el: &Element, msg: &str) {
    dom::add_class(el, "error");
    el.set_text_content(Some(msg));
}

pub fn set_pending(el: &Element, msg: &str) {
    dom::remove_class(el, "error");
    el.set_text_content(Some(msg));
}

/// Wording shown to the user for each failure.
pub fn describe(err: &CourtError) -> String {
    match err {
        CourtError::TransactionRejected => "Request rejected in your wallet.".to_string(),
        CourtError::NotConnected => "Connect your wallet first.".to_string(),
        CourtError::ContractRevert(revert) => match (revert.kind, revert.reason.as_deref()) {
            (RevertKind::Unauthorized, Some(reason)) => format!("Not allowed: {reason}"),
            (RevertKind::Unauthorized, None) => {
                "Not allowed: the connected account lacks the required role.".to_string()
            }
            (RevertKind::NotFound, _) => "That dispute does not exist.".to_string(),
            (RevertKind::Other, Some(reason)) => format!("The contract rejected the call: {reason}"),
            (RevertKind::Other, None) => "The contract rejected the call.".to_string(),
        },
        CourtError::Pending { tx_hash } => {
            format!("Transaction {tx_hash} is still waiting to be mined.")
        }
        CourtError::Network(message) => format!("Network problem: {message}"),
        other => other.to_string(),
    }
}

/// Lookups of ids that do not exist are expected while scanning for recent
/// disputes and are not worth a console warning.
pub fn is_missing_dispute(err: &CourtError) -> bool {
    matches!(err, CourtError::ContractRevert(revert) if revert.kind == RevertKind::NotFound)
}

pub fn parse_dispute_id(input: &str) -> Result<DisputeId, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Enter a dispute id.".to_string());
    }
    input
        .parse::<U256>()
        .map_err(|_| format!("`{input}` is not a dispute id."))
}

/// Label/value rows for one dispute card, in display order.
pub fn dispute_rows(
    dispute: &Dispute,
    me: Option<Address>,
    format_time: impl Fn(U256) -> String,
) -> Vec<(&'static str, String)> {
    let who = |address: Address| {
        let short = short_address(&address);
        if Some(address) == me {
            format!("{short} (you)")
        } else {
            short
        }
    };

    let mut rows = vec![
        ("Plaintiff", who(dispute.plaintiff)),
        ("Defendant", who(dispute.defendant)),
        ("Amount", format!("{} ETH", format_ether(dispute.amount))),
        ("Filed", format_time(dispute.created_at)),
    ];
    if let Some(arbitrator) = dispute.assigned_arbitrator() {
        rows.push(("Arbitrator", who(arbitrator)));
    }
    if let Some(resolved_at) = dispute.resolution_time() {
        rows.push(("Resolved", format_time(resolved_at)));
    }
    if let Some(winner) = dispute.declared_winner() {
        rows.push(("Winner", who(winner)));
    }
    rows
}

pub fn status_text(code: u8) -> String {
    status_label(code)
        .map(str::to_string)
        .unwrap_or_else(|_| format!("Unknown ({code})"))
}

pub fn dispute_json(dispute: &Dispute) -> Value {
    json!({
        "id": dispute.id.to_string(),
        "status": status_text(dispute.status),
        "plaintiff": dispute.plaintiff,
        "defendant": dispute.defendant,
        "arbitrator": dispute.assigned_arbitrator(),
        "description": dispute.description,
        "amount": format!("{} ETH", format_ether(dispute.amount)),
        "createdAt": dispute.created_at.to_string(),
        "resolvedAt": dispute.resolution_time().map(|t| t.to_string()),
        "winner": dispute.declared_winner(),
    })
}

pub fn outcome_json(outcome: &TxOutcome) -> Value {
    json!({
        "txHash": outcome.tx_hash,
        "blockNumber": outcome.block_number,
        "events": outcome.events.iter().map(event_summary).collect::<Vec<_>>(),
    })
}

pub fn event_summary(event: &CourtEvent) -> String {
    format!("{} #{}", event.name(), event.dispute_id())
}

/// Unix seconds as a local date-time string.
fn local_time(seconds: U256) -> String {
    let millis = seconds.saturating_to::<u64>() as f64 * 1000.0;
    let date = js_sys::Date::new(&JsValue::from_f64(millis));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

/// Rebuild the dispute list, newest first. Text goes in through
/// `textContent` only; descriptions are user-supplied.
pub fn render_board(
    container: &Element,
    board: &DisputeBoard,
    me: Option<Address>,
) -> Result<(), JsValue> {
    container.set_text_content(None);
    if board.is_empty() {
        let empty = dom::create_element("p")?;
        empty.set_class_name("empty");
        empty.set_text_content(Some("No disputes loaded yet."));
        container.append_child(&empty)?;
        return Ok(());
    }

    for dispute in board.iter() {
        let card = dom::create_element("article")?;
        card.set_class_name(&format!("dispute-card status-{}", dispute.status));
        dom::toggle_class(&card, "stale", board.is_stale(&dispute.id));

        let title = dom::create_element("h3")?;
        title.set_text_content(Some(&format!(
            "#{} · {}",
            dispute.id,
            status_text(dispute.status)
        )));
        card.append_child(&title)?;

        let description = dom::create_element("p")?;
        description.set_text_content(Some(&dispute.description));
        card.append_child(&description)?;

        let list = dom::create_element("dl")?;
        for (label, value) in dispute_rows(dispute, me, local_time) {
            let term = dom::create_element("dt")?;
            term.set_text_content(Some(label));
            let detail = dom::create_element("dd")?;
            detail.set_text_content(Some(&value));
            list.append_child(&term)?;
            list.append_child(&detail)?;
        }
        card.append_child(&list)?;
        container.append_child(&card)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use cc_court_core::Revert;

    const PLAINTIFF: Address = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

    fn dispute() -> Dispute {
        Dispute {
            id: U256::from(4),
            plaintiff: PLAINTIFF,
            defendant: address!("0x2222222222222222222222222222222222222222"),
            arbitrator: Address::ZERO,
            description: "<b>not html</b>".to_string(),
            amount: U256::from(2_000_000_000_000_000_000_u128),
            status: 0,
            created_at: U256::from(1_700_000_000_u64),
            resolved_at: U256::ZERO,
            winner: Address::ZERO,
        }
    }

    #[test]
    fn open_dispute_has_no_arbitrator_or_winner_rows() {
        let rows = dispute_rows(&dispute(), Some(PLAINTIFF), |t| t.to_string());
        let labels: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["Plaintiff", "Defendant", "Amount", "Filed"]);
        assert_eq!(rows[0].1, "0x5aAe...eAed (you)");
        assert!(rows[2].1.starts_with("2.0"));
        assert_eq!(rows[3].1, "1700000000");
    }

    #[test]
    fn resolved_dispute_lists_outcome() {
        let mut resolved = dispute();
        resolved.status = 3;
        resolved.arbitrator = address!("0x3333333333333333333333333333333333333333");
        resolved.resolved_at = U256::from(1_700_100_000_u64);
        resolved.winner = PLAINTIFF;

        let rows = dispute_rows(&resolved, None, |t| t.to_string());
        let labels: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            ["Plaintiff", "Defendant", "Amount", "Filed", "Arbitrator", "Resolved", "Winner"]
        );
        assert_eq!(dispute_json(&resolved)["status"], "Resolved");
    }

    #[test]
    fn unknown_status_still_renders() {
        assert_eq!(status_text(1), "Arbitrator Assigned");
        assert_eq!(status_text(7), "Unknown (7)");
    }

    #[test]
    fn dispute_ids_are_decimal() {
        assert_eq!(parse_dispute_id(" 12 "), Ok(U256::from(12)));
        assert!(parse_dispute_id("").is_err());
        assert!(parse_dispute_id("twelve").is_err());
    }

    #[test]
    fn failures_read_as_sentences() {
        assert_eq!(
            describe(&CourtError::TransactionRejected),
            "Request rejected in your wallet."
        );
        let revert = Revert::from_reason(Some("Only owner can authorize".to_string()));
        assert_eq!(
            describe(&CourtError::ContractRevert(revert)),
            "Not allowed: Only owner can authorize"
        );
        assert_eq!(
            describe(&CourtError::InvalidInput("description cannot be empty".into())),
            "invalid input: description cannot be empty"
        );
    }

    #[test]
    fn only_missing_ids_are_skipped_quietly() {
        let missing = Revert::from_reason(Some("Dispute does not exist".to_string()));
        assert!(is_missing_dispute(&CourtError::ContractRevert(missing)));

        let other = Revert::from_reason(None);
        assert!(!is_missing_dispute(&CourtError::ContractRevert(other)));
        let role = Revert::from_reason(Some("Only owner".to_string()));
        assert!(!is_missing_dispute(&CourtError::ContractRevert(role)));
        assert!(!is_missing_dispute(&CourtError::Network("offline".into())));
    }
}
