//! Node drivers: the non-preemptive loops that wire the pure protocol
//! machines to a transport, an indicator, a trigger and a clock.
//!
//! Each loop iteration samples the clock once, runs the current state's
//! periodic actions, drains at most one pending inbound datagram, and
//! yields. The machines own the shared `RaceRecord`; because the loop is the
//! only caller of both the tick path and the inbound path, no lock is
//! needed, and a decision datagram processed after a timeout transition
//! still wins (the transition table re-applies it from `CooldownUnknown`).

use std::time::Duration;

use quickdraw_core::{NodeAddress, Result};

use crate::config::TimingConfig;
use crate::network::{Inbox, Transport};
use crate::platform::{Clock, Indicator, PowerController, TriggerInput};
use crate::protocol::{Action, Coordinator, CoordinatorReply, NodeState, Participant, WakeSet};
use crate::util::logging::RaceOutcomeLogger;

/// Loop tick, well under the rebroadcast interval so resend deadlines are
/// never missed by more than a tick.
const TICK_MS: u64 = 5;

pub struct ParticipantNode<T, I, Q, C> {
    machine: Participant,
    transport: T,
    inbox: Inbox,
    indicator: I,
    trigger: Q,
    clock: C,
}

impl<T, I, Q, C> ParticipantNode<T, I, Q, C>
where
    T: Transport,
    I: Indicator,
    Q: TriggerInput,
    C: Clock,
{
    pub fn new(
        own: NodeAddress,
        timing: TimingConfig,
        transport: T,
        inbox: Inbox,
        indicator: I,
        trigger: Q,
        clock: C,
    ) -> Self {
        let mut machine = Participant::new(own, timing);
        machine.wake(clock.now_ms(), trigger.is_asserted());
        Self {
            machine,
            transport,
            inbox,
            indicator,
            trigger,
            clock,
        }
    }

    pub fn state(&self) -> NodeState {
        self.machine.state()
    }

    /// Runs one race cycle to its terminal condition and returns the wake
    /// set to suspend with. The caller owns the actual suspension.
    pub async fn run_cycle(&mut self) -> Result<WakeSet> {
        loop {
            let now = self.clock.now_ms();

            if self.trigger.is_asserted() {
                self.machine.local_press(now);
            }

            if let Some(dgram) = self.inbox.try_recv() {
                self.machine.handle_datagram(now, &dgram);
            }

            for action in self.machine.poll(now) {
                match action {
                    Action::Send(dgram) => {
                        tracing::trace!(?dgram, "broadcast");
                        self.transport.broadcast(&dgram).await?;
                    }
                    Action::SetIndicator(on) => self.indicator.set_output(on),
                    Action::Suspend(wake) => {
                        self.indicator.set_output(false);
                        return Ok(wake);
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(TICK_MS)).await;
        }
    }

    /// Full power-cycle loop: run a cycle, suspend, inspect the trigger on
    /// resume, restart. An asserted trigger on resume is a fresh press.
    pub async fn run<P: PowerController>(&mut self, power: &mut P) -> Result<()> {
        loop {
            let wake = self.run_cycle().await?;
            tracing::debug!(timer_ms = wake.timer_ms, "suspending");
            power.suspend(wake).await;

            // On hardware the radio is parked through the suspension; the
            // host receive task is not, so anything it queued mid-sleep
            // must not leak into the fresh cycle.
            while self.inbox.try_recv().is_some() {}

            let now = self.clock.now_ms();
            let pressed = self.trigger.is_asserted();
            tracing::debug!(pressed, "resumed");
            self.machine.wake(now, pressed);
        }
    }
}

pub struct CoordinatorNode<T, C> {
    machine: Coordinator,
    transport: T,
    inbox: Inbox,
    clock: C,
    outcome_logger: Option<RaceOutcomeLogger>,
}

impl<T, C> CoordinatorNode<T, C>
where
    T: Transport,
    C: Clock,
{
    pub fn new(
        timing: TimingConfig,
        transport: T,
        inbox: Inbox,
        clock: C,
        outcome_logger: Option<RaceOutcomeLogger>,
    ) -> Self {
        Self {
            machine: Coordinator::new(timing),
            transport,
            inbox,
            clock,
            outcome_logger,
        }
    }

    pub fn decision_made(&self) -> bool {
        self.machine.decision_made()
    }

    pub fn winner(&self) -> Option<NodeAddress> {
        self.machine.winner()
    }

    /// Serves races until the transport closes its inbox.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.machine.poll(self.clock.now_ms());

            match tokio::time::timeout(Duration::from_millis(TICK_MS), self.inbox.recv()).await {
                Ok(Some(dgram)) => self.handle(dgram).await?,
                Ok(None) => {
                    tracing::info!("inbox closed, coordinator stopping");
                    return Ok(());
                }
                Err(_) => {} // tick elapsed with no traffic
            }
        }
    }

    async fn handle(&mut self, dgram: quickdraw_core::RaceDatagram) -> Result<()> {
        let now = self.clock.now_ms();
        match self.machine.handle_datagram(now, &dgram) {
            CoordinatorReply::Decision {
                datagram,
                newly_decided,
            } => {
                if newly_decided {
                    if let Some(ref logger) = self.outcome_logger {
                        logger.log(&datagram.declared_winner);
                    }
                }
                self.transport.broadcast(&datagram).await?;
            }
            CoordinatorReply::Ignore => {}
        }
        Ok(())
    }
}
