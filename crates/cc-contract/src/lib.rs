//! CryptoCourt contract interface.
//!
//! The ABI below is the wire contract with the deployed court and is kept
//! exactly as published: names, argument order and types. The unnamed
//! tuple returned by `getDispute` is declared as `DisputeRecord`; a named
//! struct encodes identically.

mod revert;

pub use revert::{Revert, RevertKind};

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue, sol};
use cc_api_types::{CourtEvent, CourtEventKind, Dispute, DisputeId};
use cc_wallet_provider::Log;

sol! {
    interface ICryptoCourt {
        #[derive(Debug, PartialEq, Eq)]
        struct DisputeRecord {
            uint256 id;
            address plaintiff;
            address defendant;
            address arbitrator;
            string description;
            uint256 amount;
            uint8 status;
            uint256 createdAt;
            uint256 resolvedAt;
            address winner;
        }

        function createDispute(address _defendant, string memory _description) external payable returns (uint256);
        function assignArbitrator(uint256 _disputeId, address _arbitrator) external;
        function resolveDispute(uint256 _disputeId, address _winner) external;
        function authorizeArbitrator(address _arbitrator) external;
        function getDispute(uint256 _disputeId) external view returns (DisputeRecord memory);
        function getDisputeCount() external view returns (uint256);
        function isAuthorizedArbitrator(address _arbitrator) external view returns (bool);
        function arbitrationFee() external view returns (uint256);
        function owner() external view returns (address);

        event DisputeCreated(uint256 indexed disputeId, address indexed plaintiff, address indexed defendant, uint256 amount);
        event ArbitratorAssigned(uint256 indexed disputeId, address indexed arbitrator);
        event DisputeResolved(uint256 indexed disputeId, address indexed winner, uint256 amount);
    }
}

use ICryptoCourt::{
    ArbitratorAssigned, DisputeCreated, DisputeRecord, DisputeResolved, arbitrationFeeCall,
    assignArbitratorCall, authorizeArbitratorCall, createDisputeCall, getDisputeCall,
    getDisputeCountCall, isAuthorizedArbitratorCall, ownerCall, resolveDisputeCall,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("abi decode failed for {what}: {message}")]
pub struct AbiError {
    pub what: &'static str,
    pub message: String,
}

impl AbiError {
    fn new(what: &'static str, err: alloy_sol_types::Error) -> Self {
        Self {
            what,
            message: err.to_string(),
        }
    }
}

impl From<DisputeRecord> for Dispute {
    fn from(record: DisputeRecord) -> Self {
        Dispute {
            id: record.id,
            plaintiff: record.plaintiff,
            defendant: record.defendant,
            arbitrator: record.arbitrator,
            description: record.description,
            amount: record.amount,
            status: record.status,
            created_at: record.createdAt,
            resolved_at: record.resolvedAt,
            winner: record.winner,
        }
    }
}

impl From<Dispute> for DisputeRecord {
    fn from(dispute: Dispute) -> Self {
        DisputeRecord {
            id: dispute.id,
            plaintiff: dispute.plaintiff,
            defendant: dispute.defendant,
            arbitrator: dispute.arbitrator,
            description: dispute.description,
            amount: dispute.amount,
            status: dispute.status,
            createdAt: dispute.created_at,
            resolvedAt: dispute.resolved_at,
            winner: dispute.winner,
        }
    }
}

/// Calldata builders, one per ABI function.
pub mod calls {
    use super::*;

    pub fn create_dispute(defendant: Address, description: &str) -> Bytes {
        createDisputeCall {
            _defendant: defendant,
            _description: description.to_owned(),
        }
        .abi_encode()
        .into()
    }

    pub fn assign_arbitrator(dispute_id: DisputeId, arbitrator: Address) -> Bytes {
        assignArbitratorCall {
            _disputeId: dispute_id,
            _arbitrator: arbitrator,
        }
        .abi_encode()
        .into()
    }

    pub fn resolve_dispute(dispute_id: DisputeId, winner: Address) -> Bytes {
        resolveDisputeCall {
            _disputeId: dispute_id,
            _winner: winner,
        }
        .abi_encode()
        .into()
    }

    pub fn authorize_arbitrator(arbitrator: Address) -> Bytes {
        authorizeArbitratorCall {
            _arbitrator: arbitrator,
        }
        .abi_encode()
        .into()
    }

    pub fn get_dispute(dispute_id: DisputeId) -> Bytes {
        getDisputeCall {
            _disputeId: dispute_id,
        }
        .abi_encode()
        .into()
    }

    pub fn get_dispute_count() -> Bytes {
        getDisputeCountCall {}.abi_encode().into()
    }

    pub fn is_authorized_arbitrator(arbitrator: Address) -> Bytes {
        isAuthorizedArbitratorCall {
            _arbitrator: arbitrator,
        }
        .abi_encode()
        .into()
    }

    pub fn arbitration_fee() -> Bytes {
        arbitrationFeeCall {}.abi_encode().into()
    }

    pub fn owner() -> Bytes {
        ownerCall {}.abi_encode().into()
    }
}

/// Return-data decoders for the view functions.
pub mod returns {
    use super::*;

    pub fn dispute(data: &[u8]) -> Result<Dispute, AbiError> {
        DisputeRecord::abi_decode(data)
            .map(Dispute::from)
            .map_err(|err| AbiError::new("getDispute", err))
    }

    pub fn uint(what: &'static str, data: &[u8]) -> Result<U256, AbiError> {
        U256::abi_decode(data).map_err(|err| AbiError::new(what, err))
    }

    pub fn boolean(what: &'static str, data: &[u8]) -> Result<bool, AbiError> {
        bool::abi_decode(data).map_err(|err| AbiError::new(what, err))
    }

    pub fn address(what: &'static str, data: &[u8]) -> Result<Address, AbiError> {
        Address::abi_decode(data).map_err(|err| AbiError::new(what, err))
    }
}

/// Decode a log emitted by the court.
///
/// Returns `None` for logs whose first topic is not one of the three court
/// events.
pub fn decode_log(log: &Log) -> Option<Result<CourtEvent, AbiError>> {
    let topic0 = *log.topics.first()?;
    let topics = log.topics.iter().copied();
    let data = log.data.as_ref();

    let kind = if topic0 == DisputeCreated::SIGNATURE_HASH {
        DisputeCreated::decode_raw_log(topics, data)
            .map(|event| CourtEventKind::DisputeCreated {
                dispute_id: event.disputeId,
                plaintiff: event.plaintiff,
                defendant: event.defendant,
                amount: event.amount,
            })
            .map_err(|err| AbiError::new("DisputeCreated", err))
    } else if topic0 == ArbitratorAssigned::SIGNATURE_HASH {
        ArbitratorAssigned::decode_raw_log(topics, data)
            .map(|event| CourtEventKind::ArbitratorAssigned {
                dispute_id: event.disputeId,
                arbitrator: event.arbitrator,
            })
            .map_err(|err| AbiError::new("ArbitratorAssigned", err))
    } else if topic0 == DisputeResolved::SIGNATURE_HASH {
        DisputeResolved::decode_raw_log(topics, data)
            .map(|event| CourtEventKind::DisputeResolved {
                dispute_id: event.disputeId,
                winner: event.winner,
                amount: event.amount,
            })
            .map_err(|err| AbiError::new("DisputeResolved", err))
    } else {
        return None;
    };

    Some(kind.map(|kind| CourtEvent {
        kind,
        block_number: log.block_number.map(|n| n.to::<u64>()),
        tx_hash: log.transaction_hash,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U64, address, hex};

    fn sample_dispute() -> Dispute {
        Dispute {
            id: U256::from(7),
            plaintiff: address!("0x1111111111111111111111111111111111111111"),
            defendant: address!("0x2222222222222222222222222222222222222222"),
            arbitrator: address!("0x3333333333333333333333333333333333333333"),
            description: "undelivered goods, order #88".to_owned(),
            amount: U256::from(5_000_000_000_000_000_u64),
            status: 3,
            created_at: U256::from(1_700_000_000_u64),
            resolved_at: U256::from(1_700_086_400_u64),
            winner: address!("0x1111111111111111111111111111111111111111"),
        }
    }

    #[test]
    fn function_signatures_match_published_abi() {
        assert_eq!(createDisputeCall::SIGNATURE, "createDispute(address,string)");
        assert_eq!(assignArbitratorCall::SIGNATURE, "assignArbitrator(uint256,address)");
        assert_eq!(resolveDisputeCall::SIGNATURE, "resolveDispute(uint256,address)");
        assert_eq!(authorizeArbitratorCall::SIGNATURE, "authorizeArbitrator(address)");
        assert_eq!(getDisputeCall::SIGNATURE, "getDispute(uint256)");
        assert_eq!(getDisputeCountCall::SIGNATURE, "getDisputeCount()");
        assert_eq!(isAuthorizedArbitratorCall::SIGNATURE, "isAuthorizedArbitrator(address)");
        assert_eq!(arbitrationFeeCall::SIGNATURE, "arbitrationFee()");
        assert_eq!(ownerCall::SIGNATURE, "owner()");
    }

    #[test]
    fn event_signatures_match_published_abi() {
        assert_eq!(
            DisputeCreated::SIGNATURE,
            "DisputeCreated(uint256,address,address,uint256)"
        );
        assert_eq!(ArbitratorAssigned::SIGNATURE, "ArbitratorAssigned(uint256,address)");
        assert_eq!(DisputeResolved::SIGNATURE, "DisputeResolved(uint256,address,uint256)");
    }

    #[test]
    fn owner_calldata_is_bare_selector() {
        assert_eq!(calls::owner().as_ref(), hex!("8da5cb5b"));
    }

    #[test]
    fn assign_arbitrator_calldata_layout() {
        let arbitrator = address!("0x3333333333333333333333333333333333333333");
        let data = calls::assign_arbitrator(U256::from(9), arbitrator);

        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &assignArbitratorCall::SELECTOR);
        assert_eq!(data[35], 9);
        assert_eq!(&data[48..68], arbitrator.as_slice());
    }

    #[test]
    fn dispute_return_keeps_all_fields() {
        let dispute = sample_dispute();
        let encoded = DisputeRecord::from(dispute.clone()).abi_encode();

        assert_eq!(returns::dispute(&encoded).unwrap(), dispute);
    }

    #[test]
    fn truncated_return_data_is_an_error() {
        let err = returns::uint("getDisputeCount", &[0u8; 4]).unwrap_err();
        assert_eq!(err.what, "getDisputeCount");
    }

    #[test]
    fn dispute_created_log_decodes() {
        let event = DisputeCreated {
            disputeId: U256::from(4),
            plaintiff: address!("0x1111111111111111111111111111111111111111"),
            defendant: address!("0x2222222222222222222222222222222222222222"),
            amount: U256::from(1_000),
        };
        let encoded = event.encode_log_data();
        let log = Log {
            address: address!("0x9999999999999999999999999999999999999999"),
            topics: encoded.topics().to_vec(),
            data: encoded.data.clone(),
            block_number: Some(U64::from(21)),
            transaction_hash: Some(B256::repeat_byte(0xaa)),
        };

        let decoded = decode_log(&log).unwrap().unwrap();
        assert_eq!(decoded.dispute_id(), U256::from(4));
        assert_eq!(decoded.block_number, Some(21));
        assert_eq!(
            decoded.kind,
            CourtEventKind::DisputeCreated {
                dispute_id: U256::from(4),
                plaintiff: address!("0x1111111111111111111111111111111111111111"),
                defendant: address!("0x2222222222222222222222222222222222222222"),
                amount: U256::from(1_000),
            }
        );
    }

    #[test]
    fn foreign_logs_are_skipped() {
        let log = Log {
            address: Address::ZERO,
            topics: vec![B256::repeat_byte(0x01)],
            data: Bytes::new(),
            block_number: None,
            transaction_hash: None,
        };
        assert!(decode_log(&log).is_none());

        let anonymous = Log {
            topics: Vec::new(),
            ..log
        };
        assert!(decode_log(&anonymous).is_none());
    }

    #[test]
    fn resolved_log_with_missing_topic_fails() {
        let event = DisputeResolved {
            disputeId: U256::from(2),
            winner: address!("0x2222222222222222222222222222222222222222"),
            amount: U256::from(10),
        };
        let encoded = event.encode_log_data();
        let log = Log {
            address: Address::ZERO,
            topics: encoded.topics()[..1].to_vec(),
            data: encoded.data.clone(),
            block_number: None,
            transaction_hash: None,
        };

        assert!(decode_log(&log).unwrap().is_err());
    }
}
