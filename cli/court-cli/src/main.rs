mod commands;
mod output;

use alloy_primitives::U256;
use anyhow::Context;
use cc_api_types::parse_account;
use cc_court_core::{
    CONTRACT_ADDRESS_ENV, CourtClient, CourtConfig, RECEIPT_POLL_MS_ENV, RECEIPT_TIMEOUT_SECS_ENV,
};
use cc_provider_rpc::{RPC_URL_ENV, RpcProvider};
use clap::{Parser, Subcommand};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "court-cli",
    version,
    about = "Drive a deployed CryptoCourt contract through a JSON-RPC node"
)]
struct Cli {
    /// JSON-RPC endpoint of a node that holds (or forwards to) the signing accounts.
    #[arg(long, global = true, env = RPC_URL_ENV)]
    rpc_url: Option<String>,

    /// Deployed court contract.
    #[arg(long, global = true, env = CONTRACT_ADDRESS_ENV)]
    contract: Option<String>,

    /// Account to act as; defaults to the node's first account.
    #[arg(long, global = true, env = "CRYPTOCOURT_FROM")]
    from: Option<String>,

    #[arg(long, global = true, env = RECEIPT_POLL_MS_ENV, default_value_t = 1_000)]
    receipt_poll_ms: u64,

    /// Give up waiting for a receipt after this many seconds.
    #[arg(long, global = true, env = RECEIPT_TIMEOUT_SECS_ENV)]
    receipt_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the connected account, chain and contract settings.
    Status,
    /// File a dispute against `defendant`, escrowing `amount` ether.
    Create {
        defendant: String,
        description: String,
        #[arg(long, default_value = "0")]
        amount: String,
    },
    /// Assign an authorized arbitrator to a dispute.
    Assign {
        #[arg(value_parser = parse_dispute_id)]
        dispute_id: U256,
        arbitrator: String,
    },
    /// Resolve a dispute in favour of `winner`.
    Resolve {
        #[arg(value_parser = parse_dispute_id)]
        dispute_id: U256,
        winner: String,
    },
    /// Authorize an arbitrator (contract owner only).
    Authorize { arbitrator: String },
    /// Print one dispute.
    Get {
        #[arg(value_parser = parse_dispute_id)]
        dispute_id: U256,
    },
    /// Print the number of disputes filed.
    Count,
    /// Check whether an address may arbitrate.
    IsArbitrator { address: String },
    /// Print the arbitration fee.
    Fee,
    /// Print the contract owner.
    Owner,
    /// Stream court events as JSON lines until interrupted.
    Watch {
        /// First block to scan; defaults to the current head.
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long, default_value_t = 2_000)]
        interval_ms: u64,
    },
}

fn parse_dispute_id(input: &str) -> Result<U256, String> {
    input
        .trim()
        .parse::<U256>()
        .map_err(|_| format!("`{input}` is not a dispute id"))
}

impl Cli {
    fn court_config(&self) -> anyhow::Result<CourtConfig> {
        let contract = self
            .contract
            .as_deref()
            .with_context(|| format!("--contract or {CONTRACT_ADDRESS_ENV} is required"))?;
        let contract = parse_account(contract).context("invalid contract address")?;
        Ok(CourtConfig::new(contract)
            .with_receipt_poll_interval(Duration::from_millis(self.receipt_poll_ms.max(1)))
            .with_receipt_timeout(self.receipt_timeout_secs.map(Duration::from_secs)))
    }

    fn provider(&self) -> anyhow::Result<RpcProvider> {
        let provider = RpcProvider::new(self.rpc_url.clone());
        match self.from.as_deref() {
            Some(from) => Ok(provider.with_account(parse_account(from).context("invalid --from")?)),
            None => Ok(provider),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = Rc::new(cli.provider()?);
    let client = Rc::new(CourtClient::new(Rc::clone(&provider), cli.court_config()?));

    commands::run(cli.command, &provider, &client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "court-cli",
            "get",
            "7",
            "--contract",
            COURT,
            "--receipt-timeout-secs",
            "30",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Get { dispute_id } if dispute_id == U256::from(7)));

        let config = cli.court_config().unwrap();
        assert_eq!(config.contract_address.to_checksum(None), COURT);
        assert_eq!(config.receipt_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn create_takes_amount_in_ether() {
        let cli = Cli::try_parse_from([
            "court-cli",
            "create",
            "0x1111111111111111111111111111111111111111",
            "unpaid invoice",
            "--amount",
            "0.25",
        ])
        .unwrap();
        let Command::Create { amount, .. } = cli.command else {
            panic!("expected create");
        };
        assert_eq!(amount, "0.25");
    }

    #[test]
    fn non_numeric_dispute_id_is_refused() {
        assert!(Cli::try_parse_from(["court-cli", "resolve", "seven", COURT]).is_err());
    }

    #[test]
    fn malformed_contract_is_reported() {
        let cli = Cli::try_parse_from(["court-cli", "count", "--contract", "0x1234"]).unwrap();
        assert!(cli.court_config().is_err());
    }
}
