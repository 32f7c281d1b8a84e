use cc_api_types::{CourtEvent, Dispute, format_ether, status_label};
use cc_court_core::TxOutcome;
use serde_json::{Value, json};

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Decimal ids and timestamps plus the status label, for reading at a terminal.
pub fn dispute_json(dispute: &Dispute) -> Value {
    let status = status_label(dispute.status)
        .map(str::to_owned)
        .unwrap_or_else(|err| err.to_string());
    json!({
        "id": dispute.id.to_string(),
        "plaintiff": dispute.plaintiff,
        "defendant": dispute.defendant,
        "arbitrator": dispute.assigned_arbitrator(),
        "description": dispute.description,
        "amountWei": dispute.amount.to_string(),
        "amountEther": format_ether(dispute.amount),
        "status": dispute.status,
        "statusLabel": status,
        "createdAt": dispute.created_at.to_string(),
        "resolvedAt": dispute.resolution_time().map(|t| t.to_string()),
        "winner": dispute.declared_winner(),
    })
}

pub fn event_json(event: &CourtEvent) -> Value {
    let mut value = serde_json::to_value(event).unwrap_or(Value::Null);
    if let Value::Object(members) = &mut value {
        members.insert("disputeId".to_owned(), json!(event.dispute_id().to_string()));
    }
    value
}

pub fn outcome_json(outcome: &TxOutcome) -> Value {
    json!({
        "txHash": outcome.tx_hash,
        "blockNumber": outcome.block_number,
        "events": outcome.events.iter().map(event_json).collect::<Vec<_>>(),
    })
}
