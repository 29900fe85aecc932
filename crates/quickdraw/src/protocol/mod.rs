//! Race-resolution protocol core.
//!
//! The machines in this module are pure: they consume clock samples and
//! inbound datagrams and emit [`Action`] values. The outer driver in
//! [`crate::node`] owns the transport, indicator and power controller and
//! executes the actions, which keeps every protocol rule testable without a
//! radio or a timer.

mod coordinator;
mod participant;
mod record;
mod signal;
mod state;

pub use coordinator::{Coordinator, CoordinatorReply};
pub use participant::{Action, Participant};
pub use record::RaceRecord;
pub use signal::flash_is_on;
pub use state::{transition, NodeState, RaceEvent};

/// Wake conditions armed together at suspension. The platform cannot report
/// which one fired; the driver inspects the trigger level on resume instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSet {
    pub timer_ms: u64,
    pub trigger: bool,
}
