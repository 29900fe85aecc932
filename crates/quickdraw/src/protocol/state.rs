use quickdraw_core::NodeAddress;

/// Participant states. Any `Cooldown*` state is terminal for the cycle: the
/// node requests suspension from it and restarts in `Listening` on wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Listening,
    ClaimPending,
    Winner,
    Loser,
    CooldownWinner,
    CooldownLoser,
    CooldownUnknown,
}

impl NodeState {
    pub fn is_cooldown(&self) -> bool {
        matches!(
            self,
            NodeState::CooldownWinner | NodeState::CooldownLoser | NodeState::CooldownUnknown
        )
    }
}

/// Inputs that can move the participant state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceEvent {
    /// The local trigger fired.
    LocalPress,
    /// A claim datagram arrived naming this participant as presser.
    ClaimReceived(NodeAddress),
    /// A decision datagram arrived naming the arbitrated winner.
    DecisionReceived(NodeAddress),
    /// No decision arrived within the claim timeout.
    ClaimTimeout,
    /// The outcome display window ran out.
    DisplayElapsed,
}

/// The participant transition table.
///
/// Unlisted combinations keep the current state; exhaustiveness of the match
/// is the compile-time guard against silent fallthrough.
///
/// A decision is applied from `CooldownUnknown` as well as the pending
/// states: when a timeout transition and a decision datagram land in the
/// same iteration, whichever is processed second wins, and a learned
/// decision must never stay overridden by a timeout.
pub fn transition(state: NodeState, event: RaceEvent, own: NodeAddress) -> NodeState {
    use NodeState::*;

    match (state, event) {
        (Listening, RaceEvent::LocalPress) => ClaimPending,
        (Listening, RaceEvent::ClaimReceived(_)) => ClaimPending,

        (
            Listening | ClaimPending | CooldownUnknown,
            RaceEvent::DecisionReceived(winner),
        ) => {
            if winner == own {
                Winner
            } else {
                Loser
            }
        }

        (ClaimPending, RaceEvent::ClaimTimeout) => CooldownUnknown,

        (Winner, RaceEvent::DisplayElapsed) => CooldownWinner,
        (Loser, RaceEvent::DisplayElapsed) => CooldownLoser,

        // Everything else is a no-op: duplicate decisions on a settled
        // outcome, presses outside Listening, stale timeouts.
        (state, _) => state,
    }
}
