use crate::Command;
use crate::output::{dispute_json, event_json, outcome_json, print_json};
use anyhow::Context;
use cc_api_types::{CourtEvent, format_ether, parse_ether};
use cc_court_core::{CourtClient, EventFeed};
use cc_provider_rpc::RpcProvider;
use cc_wallet_provider::ProviderExt;
use serde_json::json;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

type Client = CourtClient<RpcProvider>;

pub(crate) async fn run(
    command: Command,
    provider: &Rc<RpcProvider>,
    client: &Rc<Client>,
) -> anyhow::Result<()> {
    match command {
        Command::Status => status(provider, client).await,
        Command::Create {
            defendant,
            description,
            amount,
        } => {
            let value = parse_ether(&amount).context("--amount must be an ether amount")?;
            connect(client).await?;
            let dispute_id = client
                .create_dispute(&defendant, &description, value)
                .await
                .context("create dispute")?;
            print_json(&json!({ "disputeId": dispute_id.to_string() }))
        }
        Command::Assign {
            dispute_id,
            arbitrator,
        } => {
            connect(client).await?;
            let outcome = client
                .assign_arbitrator(dispute_id, &arbitrator)
                .await
                .context("assign arbitrator")?;
            print_json(&outcome_json(&outcome))
        }
        Command::Resolve { dispute_id, winner } => {
            connect(client).await?;
            let outcome = client
                .resolve_dispute(dispute_id, &winner)
                .await
                .context("resolve dispute")?;
            print_json(&outcome_json(&outcome))
        }
        Command::Authorize { arbitrator } => {
            connect(client).await?;
            let outcome = client
                .authorize_arbitrator(&arbitrator)
                .await
                .context("authorize arbitrator")?;
            print_json(&outcome_json(&outcome))
        }
        Command::Get { dispute_id } => {
            let dispute = client
                .get_dispute(dispute_id)
                .await
                .with_context(|| format!("read dispute {dispute_id}"))?;
            print_json(&dispute_json(&dispute))
        }
        Command::Count => {
            let count = client.get_dispute_count().await.context("read dispute count")?;
            print_json(&json!({ "disputeCount": count.to_string() }))
        }
        Command::IsArbitrator { address } => {
            let authorized = client
                .is_authorized_arbitrator(&address)
                .await
                .context("read arbitrator authorization")?;
            print_json(&json!({ "address": address, "authorized": authorized }))
        }
        Command::Fee => {
            let fee = client.arbitration_fee().await.context("read arbitration fee")?;
            print_json(&json!({ "wei": fee.to_string(), "ether": format_ether(fee) }))
        }
        Command::Owner => {
            let owner = client.owner().await.context("read contract owner")?;
            print_json(&json!({ "owner": owner }))
        }
        Command::Watch {
            from_block,
            interval_ms,
        } => watch(provider, client, from_block, Duration::from_millis(interval_ms.max(1))).await,
    }
}

async fn connect(client: &Client) -> anyhow::Result<()> {
    let address = client
        .connect_wallet()
        .await
        .context("node offered no account to act as")?;
    info!(%address, "acting as");
    Ok(())
}

async fn status(provider: &RpcProvider, client: &Client) -> anyhow::Result<()> {
    let account = client
        .check_wallet_connection()
        .await
        .context("query node accounts")?;
    let chain_id = provider.chain_id().await.context("query chain id")?;
    print_json(&json!({
        "rpcUrl": provider.endpoint(),
        "chainId": chain_id,
        "contract": client.config().contract_address,
        "account": account,
        "receiptPollMs": client.config().receipt_poll_interval.as_millis() as u64,
        "receiptTimeoutSecs": client.config().receipt_timeout.map(|t| t.as_secs()),
    }))
}

async fn watch(
    provider: &Rc<RpcProvider>,
    client: &Rc<Client>,
    from_block: Option<u64>,
    interval: Duration,
) -> anyhow::Result<()> {
    client.check_wallet_connection().await.context("query node accounts")?;
    let _wallet = client.watch_wallet();

    let feed = EventFeed::new(Rc::clone(provider), client.config().contract_address);
    let feed = match from_block {
        Some(block) => feed.starting_at(block),
        None => feed,
    };
    let _printer = feed.subscribe(Rc::new(|event: &CourtEvent| {
        if let Err(err) = print_json(&event_json(event)) {
            warn!(%err, "could not print event");
        }
    }));
    info!(contract = %client.config().contract_address, "watching court events");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        if let Err(err) = feed.poll().await {
            warn!(%err, "event poll failed");
        }
        if let Err(err) = provider.poll_wallet_changes().await {
            warn!(%err, "account poll failed");
        }
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!("stopped watching");
    Ok(())
}
