use quickdraw_core::NodeAddress;

use super::state::NodeState;

/// Per-node, in-memory race record. Nothing here survives a power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceRecord {
    pub state: NodeState,
    /// Timestamp of the first claim/decision observed in the current race.
    /// Zero exactly while idle; cleared only on return to idle.
    pub race_started_at: u64,
    /// Participant believed to have pressed first.
    pub claimant: NodeAddress,
    /// Winner declared by the coordinator.
    pub winner: NodeAddress,
    /// Coordinator-only latch: a decision is made at most once per cycle.
    pub decision_made: bool,
}

impl RaceRecord {
    pub fn idle() -> Self {
        Self {
            state: NodeState::Listening,
            race_started_at: 0,
            claimant: NodeAddress::BROADCAST,
            winner: NodeAddress::BROADCAST,
            decision_made: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.race_started_at == 0
    }

    /// Stamps the start of a race cycle on first observation. Zero is the
    /// idle sentinel, so a start at clock sample 0 is pinned to 1.
    pub fn mark_started(&mut self, now: u64) {
        if self.race_started_at == 0 {
            self.race_started_at = now.max(1);
        }
    }
}

impl Default for RaceRecord {
    fn default() -> Self {
        Self::idle()
    }
}
