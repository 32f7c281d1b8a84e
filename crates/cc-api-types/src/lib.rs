use alloy_primitives::utils::{self, UnitsError};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dispute identifiers are assigned by the contract and grow monotonically.
pub type DisputeId = U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown dispute status code {0}")]
pub struct UnknownStatus(pub u8);

/// Display-only view of the contract's status code.
///
/// The table is fixed and ordered; nothing beyond the label should be read
/// into a status on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Created,
    ArbitratorAssigned,
    InProgress,
    Resolved,
    Cancelled,
}

impl DisputeStatus {
    pub const ALL: [DisputeStatus; 5] = [
        DisputeStatus::Created,
        DisputeStatus::ArbitratorAssigned,
        DisputeStatus::InProgress,
        DisputeStatus::Resolved,
        DisputeStatus::Cancelled,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            DisputeStatus::Created => "Created",
            DisputeStatus::ArbitratorAssigned => "Arbitrator Assigned",
            DisputeStatus::InProgress => "In Progress",
            DisputeStatus::Resolved => "Resolved",
            DisputeStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<u8> for DisputeStatus {
    type Error = UnknownStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DisputeStatus::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(UnknownStatus(code))
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn status_label(code: u8) -> Result<&'static str, UnknownStatus> {
    DisputeStatus::try_from(code).map(DisputeStatus::label)
}

/// A dispute as returned by `getDispute`, field for field.
///
/// Zero addresses and timestamps are kept as the contract reports them;
/// the accessor methods give the nullable view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: DisputeId,
    pub plaintiff: Address,
    pub defendant: Address,
    pub arbitrator: Address,
    pub description: String,
    pub amount: U256,
    pub status: u8,
    pub created_at: U256,
    pub resolved_at: U256,
    pub winner: Address,
}

impl Dispute {
    pub fn status(&self) -> Result<DisputeStatus, UnknownStatus> {
        DisputeStatus::try_from(self.status)
    }

    pub fn assigned_arbitrator(&self) -> Option<Address> {
        non_zero(self.arbitrator)
    }

    pub fn declared_winner(&self) -> Option<Address> {
        non_zero(self.winner)
    }

    pub fn resolution_time(&self) -> Option<U256> {
        (!self.resolved_at.is_zero()).then_some(self.resolved_at)
    }
}

fn non_zero(address: Address) -> Option<Address> {
    (!address.is_zero()).then_some(address)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CourtEventKind {
    DisputeCreated {
        dispute_id: DisputeId,
        plaintiff: Address,
        defendant: Address,
        amount: U256,
    },
    ArbitratorAssigned {
        dispute_id: DisputeId,
        arbitrator: Address,
    },
    DisputeResolved {
        dispute_id: DisputeId,
        winner: Address,
        amount: U256,
    },
}

/// A decoded contract event plus where it was mined, when the provider said so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtEvent {
    #[serde(flatten)]
    pub kind: CourtEventKind,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
}

impl CourtEvent {
    pub fn dispute_id(&self) -> DisputeId {
        match &self.kind {
            CourtEventKind::DisputeCreated { dispute_id, .. }
            | CourtEventKind::ArbitratorAssigned { dispute_id, .. }
            | CourtEventKind::DisputeResolved { dispute_id, .. } => *dispute_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            CourtEventKind::DisputeCreated { .. } => "DisputeCreated",
            CourtEventKind::ArbitratorAssigned { .. } => "ArbitratorAssigned",
            CourtEventKind::DisputeResolved { .. } => "DisputeResolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAccount {
    #[error("account must be a 0x-prefixed 20-byte hex address")]
    Malformed,
    #[error("account checksum does not match")]
    BadChecksum,
    #[error("zero address is not a valid account")]
    Zero,
}

/// Parse a user-supplied account identifier for a transaction. Same rules as
/// [`parse_address`], and the zero address is refused.
pub fn parse_account(input: &str) -> Result<Address, InvalidAccount> {
    let address = parse_address(input)?;
    if address.is_zero() {
        return Err(InvalidAccount::Zero);
    }
    Ok(address)
}

/// Parse a `0x`-prefixed address without judging its value.
///
/// All-lowercase and all-uppercase hex are accepted as is; mixed case must
/// carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, InvalidAccount> {
    let input = input.trim();
    let hex = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or(InvalidAccount::Malformed)?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InvalidAccount::Malformed);
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None).map_err(|_| InvalidAccount::BadChecksum)
    } else {
        Address::from_str(hex).map_err(|_| InvalidAccount::Malformed)
    }
}

/// `0x1234...abcd` form for compact display.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_ether(wei: U256) -> String {
    utils::format_ether(wei)
}

pub fn parse_ether(input: &str) -> Result<U256, UnitsError> {
    utils::parse_ether(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn status_codes_map_to_fixed_labels() {
        let expected = [
            "Created",
            "Arbitrator Assigned",
            "In Progress",
            "Resolved",
            "Cancelled",
        ];
        for (code, label) in expected.iter().enumerate() {
            assert_eq!(status_label(code as u8), Ok(*label));
        }
    }

    #[test]
    fn out_of_range_status_is_unknown() {
        for code in [5_u8, 42, u8::MAX] {
            assert_eq!(status_label(code), Err(UnknownStatus(code)));
        }
    }

    #[test]
    fn status_roundtrips_through_code() {
        for status in DisputeStatus::ALL {
            assert_eq!(DisputeStatus::try_from(status.code()), Ok(status));
        }
    }

    #[test]
    fn zero_fields_read_as_unset() {
        let dispute = Dispute {
            id: U256::from(1),
            plaintiff: address!("0x1111111111111111111111111111111111111111"),
            defendant: address!("0x2222222222222222222222222222222222222222"),
            arbitrator: Address::ZERO,
            description: "late delivery".to_owned(),
            amount: U256::from(10),
            status: 0,
            created_at: U256::from(1_700_000_000_u64),
            resolved_at: U256::ZERO,
            winner: Address::ZERO,
        };

        assert_eq!(dispute.assigned_arbitrator(), None);
        assert_eq!(dispute.declared_winner(), None);
        assert_eq!(dispute.resolution_time(), None);
        assert_eq!(dispute.status(), Ok(DisputeStatus::Created));
    }

    #[test]
    fn parse_account_accepts_plain_hex() {
        let parsed = parse_account(" 0x52908400098527886e0f7030069857d2e4169ee7 ").unwrap();
        assert_eq!(parsed, address!("0x52908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn parse_account_checks_mixed_case_checksum() {
        assert!(parse_account("0x52908400098527886E0F7030069857D2E4169EE7").is_ok());
        assert!(parse_account("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert_eq!(
            parse_account("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Err(InvalidAccount::BadChecksum)
        );
    }

    #[test]
    fn parse_account_rejects_malformed_and_zero() {
        for input in ["", "0x", "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "0x1234", "0xzz"] {
            assert_eq!(parse_account(input), Err(InvalidAccount::Malformed), "{input}");
        }
        assert_eq!(
            parse_account("0x0000000000000000000000000000000000000000"),
            Err(InvalidAccount::Zero)
        );
        assert_eq!(
            parse_address("0x0000000000000000000000000000000000000000"),
            Ok(Address::ZERO)
        );
        assert_eq!(parse_address("0x1234"), Err(InvalidAccount::Malformed));
    }

    #[test]
    fn short_address_keeps_both_ends() {
        let addr = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(short_address(&addr), "0x5aAe...eAed");
    }

    #[test]
    fn ether_amounts_convert_both_ways() {
        let wei = parse_ether("1.5").unwrap();
        assert_eq!(wei, U256::from(1_500_000_000_000_000_000_u128));
        assert!(format_ether(wei).starts_with("1.5"));
        assert!(parse_ether("one").is_err());
    }

    #[test]
    fn events_serialize_with_their_name() {
        let event = CourtEvent {
            kind: CourtEventKind::ArbitratorAssigned {
                dispute_id: U256::from(3),
                arbitrator: address!("0x3333333333333333333333333333333333333333"),
            },
            block_number: Some(12),
            tx_hash: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ArbitratorAssigned");
        assert_eq!(event.name(), "ArbitratorAssigned");
        assert_eq!(event.dispute_id(), U256::from(3));
    }
}
