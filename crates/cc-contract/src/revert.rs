use alloy_sol_types::{Panic, Revert as SolRevert, SolError};
use std::fmt;
use tracing::debug;

/// Coarse reason for an on-chain precondition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertKind {
    /// Caller lacks the owner or arbitrator role.
    Unauthorized,
    /// The referenced dispute does not exist.
    NotFound,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert {
    pub kind: RevertKind,
    pub reason: Option<String>,
}

const UNAUTHORIZED_MARKERS: &[&str] = &[
    "owner",
    "authori",
    "arbitrator",
    "permission",
    "not allowed",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "does not exist",
    "doesn't exist",
    "invalid dispute",
    "no dispute",
    "nonexistent",
];

impl Revert {
    pub fn from_reason(reason: Option<String>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty());
        let kind = reason.as_deref().map_or(RevertKind::Other, classify);
        Self { kind, reason }
    }

    /// Decode `Error(string)`, `Panic(uint256)` or raw UTF-8 revert data.
    pub fn from_data(data: &[u8]) -> Self {
        if let Ok(revert) = SolRevert::abi_decode(data) {
            return Self::from_reason(Some(revert.reason));
        }
        if let Ok(panic) = Panic::abi_decode(data) {
            let reason = match panic.kind() {
                Some(kind) => kind.as_str().to_owned(),
                None => format!("panic code {}", panic.code),
            };
            // Compiler-inserted checks, never a role or lookup failure.
            return Self {
                kind: RevertKind::Other,
                reason: Some(reason),
            };
        }
        match std::str::from_utf8(data) {
            Ok(text) => Self::from_reason(Some(text.to_owned())),
            Err(_) => {
                debug!(len = data.len(), "undecodable revert data");
                Self::from_reason(None)
            }
        }
    }

    /// Pull the reason out of a provider message such as
    /// `execution reverted: Only owner`.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        let reason = match lower.find("reverted") {
            Some(at) => {
                let rest = &message[at + "reverted".len()..];
                rest.trim_start_matches([':', ' ']).to_owned()
            }
            None => message.to_owned(),
        };
        Self::from_reason(Some(reason))
    }
}

fn classify(reason: &str) -> RevertKind {
    let lower = reason.to_ascii_lowercase();
    // Not-found wording wins: "invalid dispute" must not read as an arbitrator problem.
    if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        RevertKind::NotFound
    } else if UNAUTHORIZED_MARKERS.iter().any(|m| lower.contains(m)) {
        RevertKind::Unauthorized
    } else {
        RevertKind::Other
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            RevertKind::Unauthorized => "unauthorized",
            RevertKind::NotFound => "not found",
            RevertKind::Other => "reverted",
        };
        match &self.reason {
            Some(reason) => write!(f, "{kind}: {reason}"),
            None => f.write_str(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn error_string_payload_is_decoded_and_classified() {
        let data = SolRevert {
            reason: "Only owner can authorize arbitrators".to_owned(),
        }
        .abi_encode();

        let revert = Revert::from_data(&data);
        assert_eq!(revert.kind, RevertKind::Unauthorized);
        assert_eq!(
            revert.reason.as_deref(),
            Some("Only owner can authorize arbitrators")
        );
    }

    #[test]
    fn panic_payload_is_other_with_its_description() {
        let data = Panic {
            code: U256::from(0x12),
        }
        .abi_encode();

        let revert = Revert::from_data(&data);
        assert_eq!(revert.kind, RevertKind::Other);
        let reason = revert.reason.unwrap();
        assert!(reason.contains("zero"), "{reason}");
        assert!(!reason.starts_with("panic:"), "{reason}");
    }

    #[test]
    fn raw_utf8_payload_is_taken_as_reason() {
        let revert = Revert::from_data(b"Dispute does not exist");
        assert_eq!(revert.kind, RevertKind::NotFound);
        assert_eq!(revert.reason.as_deref(), Some("Dispute does not exist"));
    }

    #[test]
    fn binary_payload_has_no_reason() {
        let revert = Revert::from_data(&[0xde, 0xad, 0xbe, 0xef, 0xff]);
        assert_eq!(revert, Revert { kind: RevertKind::Other, reason: None });
    }

    #[test]
    fn missing_dispute_reads_as_not_found() {
        for reason in ["Dispute does not exist", "Invalid dispute ID", "dispute not found"] {
            assert_eq!(
                Revert::from_reason(Some(reason.to_owned())).kind,
                RevertKind::NotFound,
                "{reason}"
            );
        }
    }

    #[test]
    fn provider_message_prefix_is_stripped() {
        let revert = Revert::from_message("execution reverted: Not an authorized arbitrator");
        assert_eq!(revert.kind, RevertKind::Unauthorized);
        assert_eq!(revert.reason.as_deref(), Some("Not an authorized arbitrator"));
    }

    #[test]
    fn bare_revert_has_no_reason() {
        let revert = Revert::from_message("execution reverted");
        assert_eq!(revert, Revert { kind: RevertKind::Other, reason: None });
        assert_eq!(revert.to_string(), "reverted");
        assert_eq!(Revert::from_data(&[]).kind, RevertKind::Other);
    }

    #[test]
    fn unrelated_reason_is_other() {
        let revert = Revert::from_reason(Some("Description cannot be empty".to_owned()));
        assert_eq!(revert.kind, RevertKind::Other);
        assert_eq!(revert.to_string(), "reverted: Description cannot be empty");
    }
}
