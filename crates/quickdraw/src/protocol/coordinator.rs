use quickdraw_core::{DatagramKind, NodeAddress, RaceDatagram};

use crate::config::TimingConfig;

use super::record::RaceRecord;

/// What the coordinator wants done with an inbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorReply {
    /// Broadcast this decision. `newly_decided` is true only for the claim
    /// that latched the winner, so the driver can log the outcome once.
    Decision {
        datagram: RaceDatagram,
        newly_decided: bool,
    },
    /// Nothing to send (decision echo, or no active race).
    Ignore,
}

/// The arbitration half of the protocol. Two effective states: idle and
/// decided, tracked by the `decision_made` latch.
///
/// First claim received wins; ties break on network arrival order, which is
/// authoritative regardless of true physical press order. There is no
/// timer-driven resend: participants keep re-sending claims until they see a
/// decision, so answering every claim doubles as the rebroadcast mechanism.
pub struct Coordinator {
    timing: TimingConfig,
    record: RaceRecord,
}

impl Coordinator {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            record: RaceRecord::idle(),
        }
    }

    pub fn record(&self) -> &RaceRecord {
        &self.record
    }

    pub fn decision_made(&self) -> bool {
        self.record.decision_made
    }

    pub fn winner(&self) -> Option<NodeAddress> {
        self.record.decision_made.then_some(self.record.winner)
    }

    /// Processes one inbound datagram. Only this path ever writes the
    /// `decision_made` latch; the periodic [`poll`](Self::poll) only clears
    /// it, which is what makes the latch safe without a lock.
    pub fn handle_datagram(&mut self, now: u64, dgram: &RaceDatagram) -> CoordinatorReply {
        match dgram.kind() {
            DatagramKind::Decision => {
                // Our own decision flooded back by winners; nothing to do.
                CoordinatorReply::Ignore
            }
            DatagramKind::Claim => {
                let newly_decided = !self.record.decision_made;
                if newly_decided {
                    self.record.winner = dgram.pressed_by;
                    self.record.claimant = dgram.pressed_by;
                    self.record.mark_started(now);
                    self.record.decision_made = true;
                    tracing::info!(winner = %self.record.winner, "declared winner");
                }

                // Reaffirm the same winner for every claim in the window,
                // first or not: this answers new joiners and re-covers loss.
                CoordinatorReply::Decision {
                    datagram: RaceDatagram::decision(self.record.winner),
                    newly_decided,
                }
            }
        }
    }

    /// Clears the latch once the coordination window has elapsed, returning
    /// to idle and ready for the next race.
    pub fn poll(&mut self, now: u64) {
        if self.record.decision_made
            && now.saturating_sub(self.record.race_started_at) > self.timing.coordination_window_ms
        {
            tracing::info!(winner = %self.record.winner, "coordination window elapsed, resetting");
            self.record = RaceRecord::idle();
        }
    }
}
