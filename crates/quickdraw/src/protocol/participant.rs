use quickdraw_core::{DatagramKind, NodeAddress, RaceDatagram};

use crate::config::TimingConfig;

use super::record::RaceRecord;
use super::signal::flash_is_on;
use super::state::{transition, NodeState, RaceEvent};
use super::WakeSet;

/// Side effect requested by the machine, executed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Broadcast a datagram on the shared channel.
    Send(RaceDatagram),
    /// Drive the indicator output.
    SetIndicator(bool),
    /// Park everything and suspend with the given wake conditions armed.
    Suspend(WakeSet),
}

/// The participant half of the race protocol.
///
/// Owns the [`RaceRecord`] and the rebroadcast scheduler. Reliability over
/// the lossy medium comes entirely from periodic resend while the state's
/// outcome has not been superseded; nothing is queued beyond the current
/// record snapshot.
pub struct Participant {
    own: NodeAddress,
    timing: TimingConfig,
    record: RaceRecord,
    /// True when this node is the original presser for the current cycle.
    pressed_locally: bool,
    woke_at: u64,
    last_broadcast_at: u64,
    cooldown_entered_at: u64,
}

impl Participant {
    pub fn new(own: NodeAddress, timing: TimingConfig) -> Self {
        Self {
            own,
            timing,
            record: RaceRecord::idle(),
            pressed_locally: false,
            woke_at: 0,
            last_broadcast_at: 0,
            cooldown_entered_at: 0,
        }
    }

    pub fn own_address(&self) -> NodeAddress {
        self.own
    }

    pub fn state(&self) -> NodeState {
        self.record.state
    }

    pub fn record(&self) -> &RaceRecord {
        &self.record
    }

    /// Resets the cycle after resume. The platform cannot say which wake
    /// condition fired, so the driver polls the trigger level and passes it
    /// in; an asserted trigger counts as a fresh local press.
    pub fn wake(&mut self, now: u64, trigger_asserted: bool) {
        self.record = RaceRecord::idle();
        self.pressed_locally = false;
        self.woke_at = now;
        self.last_broadcast_at = 0;
        self.cooldown_entered_at = 0;

        if trigger_asserted {
            self.local_press(now);
        }
    }

    /// The local trigger fired. Only meaningful while `Listening`; a press
    /// during an active race changes nothing.
    pub fn local_press(&mut self, now: u64) {
        if self.record.state != NodeState::Listening {
            return;
        }
        self.pressed_locally = true;
        self.record.claimant = self.own;
        self.record.mark_started(now);
        self.apply(now, RaceEvent::LocalPress);
    }

    /// Applies one inbound datagram. Malformed buffers never reach this
    /// point; ambiguous ones classify as decisions.
    pub fn handle_datagram(&mut self, now: u64, dgram: &RaceDatagram) {
        self.record.mark_started(now);

        match dgram.kind() {
            DatagramKind::Claim => {
                if self.record.state == NodeState::Listening {
                    self.record.claimant = dgram.pressed_by;
                }
                self.apply(now, RaceEvent::ClaimReceived(dgram.pressed_by));
            }
            DatagramKind::Decision => {
                self.apply(now, RaceEvent::DecisionReceived(dgram.declared_winner));
            }
        }
    }

    /// One iteration of the state's periodic work: rebroadcast, indicator
    /// refresh, timeout checks. Call once per loop pass with a fresh clock
    /// sample.
    pub fn poll(&mut self, now: u64) -> Vec<Action> {
        let mut actions = Vec::new();
        let elapsed = now.saturating_sub(self.record.race_started_at);

        match self.record.state {
            NodeState::Listening => {
                actions.push(Action::SetIndicator(false));
                // Nothing seen since wake: go back to sleep instead of
                // burning the battery listening to an idle channel.
                if self.record.is_idle()
                    && now.saturating_sub(self.woke_at) >= self.timing.listen_window_ms
                {
                    actions.push(Action::Suspend(self.wake_set()));
                }
            }

            NodeState::ClaimPending => {
                actions.push(Action::SetIndicator(flash_is_on(
                    elapsed,
                    self.timing.unknown_flash_half_period_ms,
                )));

                if self.rebroadcast_due(now) {
                    let claimant = if self.pressed_locally {
                        self.own
                    } else {
                        self.record.claimant
                    };
                    actions.push(Action::Send(RaceDatagram::claim(claimant)));
                    self.last_broadcast_at = now;
                }

                if elapsed > self.timing.claim_timeout_ms {
                    // Expected never to happen while the coordinator is
                    // reachable; degrade rather than hang.
                    tracing::warn!(
                        own = %self.own,
                        elapsed_ms = elapsed,
                        "no decision within claim timeout, coordinator unreachable?"
                    );
                    self.apply(now, RaceEvent::ClaimTimeout);
                }
            }

            NodeState::Winner => {
                if self.rebroadcast_due(now) {
                    actions.push(Action::Send(RaceDatagram::decision(self.record.winner)));
                    self.last_broadcast_at = now;
                }
                actions.push(Action::SetIndicator(flash_is_on(
                    elapsed,
                    self.timing.winner_flash_half_period_ms,
                )));
                if elapsed > self.timing.display_ms {
                    self.apply(now, RaceEvent::DisplayElapsed);
                }
            }

            NodeState::Loser => {
                actions.push(Action::SetIndicator(true));
                if elapsed > self.timing.display_ms {
                    self.apply(now, RaceEvent::DisplayElapsed);
                }
            }

            NodeState::CooldownWinner => {
                // Keep flooding the decision so late-joining or lossy peers
                // still converge while we wind down.
                if self.rebroadcast_due(now) {
                    actions.push(Action::Send(RaceDatagram::decision(self.record.winner)));
                    self.last_broadcast_at = now;
                }
                actions.push(Action::SetIndicator(flash_is_on(
                    elapsed,
                    self.timing.winner_flash_half_period_ms,
                )));
                self.check_cooldown_over(now, &mut actions);
            }

            NodeState::CooldownLoser => {
                actions.push(Action::SetIndicator(true));
                self.check_cooldown_over(now, &mut actions);
            }

            NodeState::CooldownUnknown => {
                actions.push(Action::SetIndicator(flash_is_on(
                    elapsed,
                    self.timing.unknown_flash_half_period_ms,
                )));
                self.check_cooldown_over(now, &mut actions);
            }
        }

        actions
    }

    fn wake_set(&self) -> WakeSet {
        WakeSet {
            timer_ms: self.timing.sleep_timer_ms,
            trigger: true,
        }
    }

    fn rebroadcast_due(&self, now: u64) -> bool {
        now.saturating_sub(self.last_broadcast_at) > self.timing.rebroadcast_interval_ms
    }

    fn check_cooldown_over(&self, now: u64, actions: &mut Vec<Action>) {
        if now.saturating_sub(self.cooldown_entered_at) > self.timing.cooldown_ms {
            actions.push(Action::SetIndicator(false));
            actions.push(Action::Suspend(self.wake_set()));
        }
    }

    fn apply(&mut self, now: u64, event: RaceEvent) {
        let from = self.record.state;
        let to = transition(from, event, self.own);
        if from == to {
            return;
        }

        match to {
            NodeState::Winner | NodeState::Loser => {
                if let RaceEvent::DecisionReceived(winner) = event {
                    self.record.winner = winner;
                }
            }
            _ => {}
        }
        if to.is_cooldown() {
            self.cooldown_entered_at = now;
        }

        self.record.state = to;
        tracing::info!(own = %self.own, ?from, ?to, "state transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn own() -> NodeAddress {
        NodeAddress::new([2, 0, 0, 0, 0, 1])
    }

    fn other() -> NodeAddress {
        NodeAddress::new([2, 0, 0, 0, 0, 2])
    }

    fn awake_participant(now: u64) -> Participant {
        let mut p = Participant::new(own(), TimingConfig::default());
        p.wake(now, false);
        p
    }

    fn sends(actions: &[Action]) -> Vec<RaceDatagram> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_press_rebroadcasts_own_claim() {
        let mut p = awake_participant(0);
        p.local_press(10);
        assert_eq!(p.state(), NodeState::ClaimPending);

        let actions = p.poll(40);
        let sent = sends(&actions);
        assert_eq!(sent, vec![RaceDatagram::claim(own())]);
    }

    #[test]
    fn test_relayed_claim_carries_original_claimant() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::claim(other()));
        assert_eq!(p.state(), NodeState::ClaimPending);

        let sent = sends(&p.poll(40));
        assert_eq!(sent, vec![RaceDatagram::claim(other())]);
    }

    #[test]
    fn test_rebroadcast_respects_interval() {
        let mut p = awake_participant(0);
        p.local_press(10);

        assert_eq!(sends(&p.poll(40)).len(), 1);
        // Second poll inside the interval sends nothing.
        assert_eq!(sends(&p.poll(45)).len(), 0);
        assert_eq!(sends(&p.poll(70)).len(), 1);
    }

    #[test]
    fn test_claim_timeout_degrades_to_unknown() {
        let mut p = awake_participant(0);
        p.local_press(10);

        let timeout = TimingConfig::default().claim_timeout_ms;
        p.poll(10 + timeout + 1);
        assert_eq!(p.state(), NodeState::CooldownUnknown);
    }

    #[test]
    fn test_decision_after_timeout_still_applies() {
        let mut p = awake_participant(0);
        p.local_press(10);
        let timeout = TimingConfig::default().claim_timeout_ms;
        p.poll(10 + timeout + 1);
        assert_eq!(p.state(), NodeState::CooldownUnknown);

        p.handle_datagram(10 + timeout + 2, &RaceDatagram::decision(own()));
        assert_eq!(p.state(), NodeState::Winner);
        assert_eq!(p.record().winner, own());
    }

    #[test]
    fn test_duplicate_decision_is_idempotent() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(other()));
        assert_eq!(p.state(), NodeState::Loser);

        for t in [20, 30, 40] {
            p.handle_datagram(t, &RaceDatagram::decision(other()));
        }
        assert_eq!(p.state(), NodeState::Loser);
        assert_eq!(p.record().winner, other());
        assert_eq!(p.record().race_started_at, 10);
    }

    #[test]
    fn test_winner_rebroadcasts_decision() {
        let mut p = awake_participant(0);
        p.local_press(10);
        p.handle_datagram(30, &RaceDatagram::decision(own()));
        assert_eq!(p.state(), NodeState::Winner);

        let sent = sends(&p.poll(60));
        assert_eq!(sent, vec![RaceDatagram::decision(own())]);
    }

    #[test]
    fn test_loser_holds_indicator_solid() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(other()));

        let actions = p.poll(700);
        assert!(actions.contains(&Action::SetIndicator(true)));
        assert!(sends(&actions).is_empty());
    }

    #[test]
    fn test_display_then_cooldown_then_suspend() {
        let timing = TimingConfig::default();
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(other()));

        let after_display = 10 + timing.display_ms + 1;
        p.poll(after_display);
        assert_eq!(p.state(), NodeState::CooldownLoser);

        // Not yet.
        let actions = p.poll(after_display + timing.cooldown_ms);
        assert!(!actions.iter().any(|a| matches!(a, Action::Suspend(_))));

        let actions = p.poll(after_display + timing.cooldown_ms + 1);
        let wake = actions.iter().find_map(|a| match a {
            Action::Suspend(w) => Some(*w),
            _ => None,
        });
        let wake = wake.expect("cooldown exit must request suspension");
        assert!(wake.trigger);
        assert_eq!(wake.timer_ms, timing.sleep_timer_ms);
        assert!(actions.contains(&Action::SetIndicator(false)));
    }

    #[test]
    fn test_idle_listen_window_expires_into_suspend() {
        let mut p = awake_participant(100);
        let window = TimingConfig::default().listen_window_ms;

        assert!(!p
            .poll(100 + window - 1)
            .iter()
            .any(|a| matches!(a, Action::Suspend(_))));
        assert!(p
            .poll(100 + window)
            .iter()
            .any(|a| matches!(a, Action::Suspend(_))));
    }

    #[test]
    fn test_active_race_disarms_listen_window() {
        let mut p = awake_participant(100);
        p.handle_datagram(110, &RaceDatagram::claim(other()));

        let window = TimingConfig::default().listen_window_ms;
        assert!(!p
            .poll(100 + window + 10)
            .iter()
            .any(|a| matches!(a, Action::Suspend(_))));
    }

    #[test]
    fn test_wake_with_asserted_trigger_is_a_press() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(other()));

        p.wake(50_000, true);
        assert_eq!(p.state(), NodeState::ClaimPending);
        assert_eq!(p.record().claimant, own());
        assert_eq!(p.record().race_started_at, 50_000);
    }

    #[test]
    fn test_wake_without_trigger_listens() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(own()));

        p.wake(50_000, false);
        assert_eq!(p.state(), NodeState::Listening);
        assert!(p.record().is_idle());
    }

    #[test]
    fn test_press_during_active_race_is_ignored() {
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::claim(other()));
        p.local_press(20);

        assert_eq!(p.record().claimant, other());
        let sent = sends(&p.poll(50));
        assert_eq!(sent, vec![RaceDatagram::claim(other())]);
    }

    #[test]
    fn test_decision_without_prior_claim_is_handled() {
        // A participant may receive a decision without ever having sent or
        // seen a claim; it must classify immediately.
        let mut p = awake_participant(0);
        p.handle_datagram(10, &RaceDatagram::decision(own()));
        assert_eq!(p.state(), NodeState::Winner);
        assert_eq!(p.record().race_started_at, 10);
    }
}
