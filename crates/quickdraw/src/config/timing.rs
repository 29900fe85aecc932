use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Protocol timing constants, all in milliseconds.
///
/// Defaults match the reference hardware deployment. Only relative ordering
/// and bounded windows matter; none of these carry exact-timing guarantees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long a freshly woken participant stays in `Listening` before
    /// giving up and sleeping again when nothing is happening.
    #[serde(default = "default_listen_window")]
    pub listen_window_ms: u64,

    /// Resend period for claims and decisions while their state holds.
    #[serde(default = "default_rebroadcast_interval")]
    pub rebroadcast_interval_ms: u64,

    /// How long a participant waits in `ClaimPending` for a decision before
    /// degrading to `CooldownUnknown`.
    #[serde(default = "default_claim_timeout")]
    pub claim_timeout_ms: u64,

    /// How long the winner/loser outcome is displayed before cooldown.
    #[serde(default = "default_display")]
    pub display_ms: u64,

    /// Settle period in any cooldown state before requesting suspension.
    #[serde(default = "default_cooldown")]
    pub cooldown_ms: u64,

    /// How long the coordinator holds its decision latch before accepting
    /// the next race.
    #[serde(default = "default_coordination_window")]
    pub coordination_window_ms: u64,

    /// Half-period of the fast flash shown in `Winner`/`CooldownWinner`.
    #[serde(default = "default_winner_flash")]
    pub winner_flash_half_period_ms: u64,

    /// Half-period of the slow flash shown in `ClaimPending`/`CooldownUnknown`.
    #[serde(default = "default_unknown_flash")]
    pub unknown_flash_half_period_ms: u64,

    /// Timer wake armed alongside the trigger wake at suspension.
    #[serde(default = "default_sleep_timer")]
    pub sleep_timer_ms: u64,
}

fn default_listen_window() -> u64 {
    50
}

fn default_rebroadcast_interval() -> u64 {
    20
}

fn default_claim_timeout() -> u64 {
    5_000
}

fn default_display() -> u64 {
    5_000
}

fn default_cooldown() -> u64 {
    15_000
}

fn default_coordination_window() -> u64 {
    17_000
}

fn default_winner_flash() -> u64 {
    120
}

fn default_unknown_flash() -> u64 {
    500
}

fn default_sleep_timer() -> u64 {
    2_000
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rebroadcast_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "rebroadcast_interval_ms must be non-zero".into(),
            ));
        }

        // The resend period must fit inside every window that depends on a
        // resend being observed, or a single lost datagram ends the race.
        if self.rebroadcast_interval_ms >= self.claim_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "rebroadcast_interval_ms ({}) must be < claim_timeout_ms ({})",
                self.rebroadcast_interval_ms, self.claim_timeout_ms
            )));
        }

        if self.coordination_window_ms <= self.claim_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "coordination_window_ms ({}) must be > claim_timeout_ms ({})",
                self.coordination_window_ms, self.claim_timeout_ms
            )));
        }

        if self.winner_flash_half_period_ms == 0 || self.unknown_flash_half_period_ms == 0 {
            return Err(ConfigError::Validation(
                "flash half-periods must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            listen_window_ms: default_listen_window(),
            rebroadcast_interval_ms: default_rebroadcast_interval(),
            claim_timeout_ms: default_claim_timeout(),
            display_ms: default_display(),
            cooldown_ms: default_cooldown(),
            coordination_window_ms: default_coordination_window(),
            winner_flash_half_period_ms: default_winner_flash(),
            unknown_flash_half_period_ms: default_unknown_flash(),
            sleep_timer_ms: default_sleep_timer(),
        }
    }
}
