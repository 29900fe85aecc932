//! Boundary traits for the excluded platform collaborators: clock,
//! indicator, trigger input and power controller. The protocol core never
//! touches hardware directly; the node driver wires these in.

use std::time::{Duration, Instant};

use crate::protocol::WakeSet;

/// Monotonic millisecond time source, used only for elapsed-time
/// comparisons.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Binary output device encoding visual state.
pub trait Indicator {
    fn set_output(&mut self, on: bool);
}

/// Physical trigger, polled (not interrupt-driven) at loop entry and
/// immediately post-resume.
pub trait TriggerInput {
    fn is_asserted(&self) -> bool;
}

/// Suspends execution until either the timer elapses or the external wake
/// source fires. Returns only after resume, and cannot report which
/// condition ended the suspension.
pub trait PowerController {
    fn suspend(&mut self, wake: WakeSet) -> impl std::future::Future<Output = ()> + Send;
}

/// Process-relative monotonic clock.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Host rendering of the power controller: a timer raced against the polled
/// trigger level. Firmware ports park the radio and deep-sleep here instead.
pub struct HostPower<Q> {
    trigger: Q,
    poll_interval: Duration,
}

impl<Q: TriggerInput> HostPower<Q> {
    pub fn new(trigger: Q) -> Self {
        Self {
            trigger,
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl<Q: TriggerInput + Send> PowerController for HostPower<Q> {
    async fn suspend(&mut self, wake: WakeSet) {
        let deadline = Instant::now() + Duration::from_millis(wake.timer_ms);
        loop {
            if wake.trigger && self.trigger.is_asserted() {
                return;
            }
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Indicator that reports output changes through tracing, for host runs.
#[derive(Default)]
pub struct LogIndicator {
    last: Option<bool>,
}

impl Indicator for LogIndicator {
    fn set_output(&mut self, on: bool) {
        if self.last != Some(on) {
            tracing::debug!(on, "indicator");
            self.last = Some(on);
        }
    }
}
