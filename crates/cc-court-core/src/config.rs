use crate::CourtError;
use alloy_primitives::Address;
use cc_api_types::parse_account;
use std::time::Duration;

pub const CONTRACT_ADDRESS_ENV: &str = "CRYPTOCOURT_CONTRACT_ADDRESS";
pub const RECEIPT_POLL_MS_ENV: &str = "CRYPTOCOURT_RECEIPT_POLL_MS";
pub const RECEIPT_TIMEOUT_SECS_ENV: &str = "CRYPTOCOURT_RECEIPT_TIMEOUT_SECS";

const DEFAULT_RECEIPT_POLL: Duration = Duration::from_millis(1_000);
const MIN_RECEIPT_POLL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtConfig {
    pub contract_address: Address,
    pub receipt_poll_interval: Duration,
    /// `None` waits for a receipt for as long as the provider keeps answering.
    pub receipt_timeout: Option<Duration>,
}

impl CourtConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL,
            receipt_timeout: None,
        }
    }

    /// Reads `CRYPTOCOURT_CONTRACT_ADDRESS` (required),
    /// `CRYPTOCOURT_RECEIPT_POLL_MS` and `CRYPTOCOURT_RECEIPT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, CourtError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CourtError> {
        let raw = lookup(CONTRACT_ADDRESS_ENV)
            .ok_or_else(|| CourtError::InvalidInput(format!("{CONTRACT_ADDRESS_ENV} is not set")))?;
        let contract_address = parse_account(&raw)
            .map_err(|err| CourtError::invalid_account(CONTRACT_ADDRESS_ENV, err))?;

        let mut config = Self::new(contract_address);
        if let Some(ms) = lookup(RECEIPT_POLL_MS_ENV) {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                CourtError::InvalidInput(format!("{RECEIPT_POLL_MS_ENV} must be milliseconds"))
            })?;
            config = config.with_receipt_poll_interval(Duration::from_millis(ms));
        }
        if let Some(secs) = lookup(RECEIPT_TIMEOUT_SECS_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CourtError::InvalidInput(format!("{RECEIPT_TIMEOUT_SECS_ENV} must be seconds"))
            })?;
            config.receipt_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Clamped to at least one millisecond so a receipt timeout can elapse.
    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval.max(MIN_RECEIPT_POLL);
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receipt_timeout = timeout;
        self
    }
}
