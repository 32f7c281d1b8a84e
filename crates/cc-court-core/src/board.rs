use cc_api_types::{CourtEvent, Dispute, DisputeId};
use std::collections::{BTreeMap, BTreeSet};

/// Client-side view of disputes, keyed by id.
///
/// Reads may resolve in any order; every update lands on the entry named by
/// the id inside the response, so a late answer for one dispute never
/// overwrites another.
#[derive(Debug, Clone, Default)]
pub struct DisputeBoard {
    disputes: BTreeMap<DisputeId, Dispute>,
    stale: BTreeSet<DisputeId>,
}

impl DisputeBoard {
    pub fn upsert(&mut self, dispute: Dispute) {
        self.stale.remove(&dispute.id);
        self.disputes.insert(dispute.id, dispute);
    }

    /// Record that the chain reported a change for this dispute; the entry
    /// needs a fresh `getDispute`.
    pub fn apply_event(&mut self, event: &CourtEvent) -> DisputeId {
        let id = event.dispute_id();
        self.stale.insert(id);
        id
    }

    pub fn get(&self, id: &DisputeId) -> Option<&Dispute> {
        self.disputes.get(id)
    }

    pub fn is_stale(&self, id: &DisputeId) -> bool {
        self.stale.contains(id)
    }

    pub fn stale_ids(&self) -> Vec<DisputeId> {
        self.stale.iter().copied().collect()
    }

    /// Newest dispute first.
    pub fn iter(&self) -> impl Iterator<Item = &Dispute> {
        self.disputes.values().rev()
    }

    pub fn len(&self) -> usize {
        self.disputes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disputes.is_empty()
    }

    pub fn clear(&mut self) {
        self.disputes.clear();
        self.stale.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use cc_api_types::CourtEventKind;

    fn dispute(id: u64, status: u8) -> Dispute {
        Dispute {
            id: U256::from(id),
            plaintiff: Address::repeat_byte(0x11),
            defendant: Address::repeat_byte(0x22),
            arbitrator: Address::ZERO,
            description: format!("dispute {id}"),
            amount: U256::from(1),
            status,
            created_at: U256::from(1_700_000_000_u64),
            resolved_at: U256::ZERO,
            winner: Address::ZERO,
        }
    }

    #[test]
    fn out_of_order_reads_land_on_their_own_ids() {
        let mut board = DisputeBoard::default();
        board.upsert(dispute(2, 1));
        board.upsert(dispute(1, 0));

        assert_eq!(board.get(&U256::from(1)).unwrap().status, 0);
        assert_eq!(board.get(&U256::from(2)).unwrap().status, 1);
        let order: Vec<u64> = board.iter().map(|d| d.id.to::<u64>()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn events_mark_entries_stale_until_refetched() {
        let mut board = DisputeBoard::default();
        board.upsert(dispute(3, 0));

        let event = CourtEvent {
            kind: CourtEventKind::ArbitratorAssigned {
                dispute_id: U256::from(3),
                arbitrator: Address::repeat_byte(0x33),
            },
            block_number: Some(5),
            tx_hash: None,
        };
        assert_eq!(board.apply_event(&event), U256::from(3));
        assert!(board.is_stale(&U256::from(3)));
        assert_eq!(board.stale_ids(), vec![U256::from(3)]);

        board.upsert(dispute(3, 1));
        assert!(!board.is_stale(&U256::from(3)));
        assert_eq!(board.len(), 1);
    }
}
