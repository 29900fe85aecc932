mod timing;

use std::path::Path;

use serde::{Deserialize, Serialize};

use quickdraw_core::NodeAddress;

pub use crate::util::logging::LogConfig;
pub use timing::TimingConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickdrawConfig {
    pub node: NodeConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub role: Role,
    /// Own 6-byte address. Required for participants; the coordinator never
    /// puts its own address on the wire and may omit it.
    pub address: Option<NodeAddress>,
    /// Radio channel. The UDP transport folds it into the port; a radio
    /// transport consumes it directly.
    #[serde(default = "default_channel")]
    pub channel: u8,
}

fn default_channel() -> u8 {
    4
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    #[default]
    Participant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_broadcast_addr")]
    pub broadcast_addr: String,
    /// Base UDP port; the effective port is `port_base + channel`.
    #[serde(default = "default_port_base")]
    pub port_base: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".into()
}

fn default_broadcast_addr() -> String {
    "255.255.255.255".into()
}

fn default_port_base() -> u16 {
    47000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            broadcast_addr: default_broadcast_addr(),
            port_base: default_port_base(),
        }
    }
}

impl TransportConfig {
    /// Effective UDP port for a channel. Saturates at the top of the port
    /// range; `validate` rejects combinations that would.
    pub fn port(&self, channel: u8) -> u16 {
        self.port_base.saturating_add(channel as u16)
    }
}

impl QuickdrawConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses without validating, so callers can layer overrides (CLI flags,
    /// environment) on top before calling [`validate`](Self::validate).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.role == Role::Participant {
            match self.node.address {
                None => {
                    return Err(ConfigError::Validation(
                        "participants must configure node.address".into(),
                    ))
                }
                Some(addr) if addr.is_zero() || addr.is_broadcast() => {
                    return Err(ConfigError::Validation(
                        "node.address must not be the zero or broadcast sentinel".into(),
                    ))
                }
                Some(_) => {}
            }
        }
        if self
            .transport
            .port_base
            .checked_add(self.node.channel as u16)
            .is_none()
        {
            return Err(ConfigError::Validation(format!(
                "port_base ({}) + channel ({}) exceeds the valid port range",
                self.transport.port_base, self.node.channel
            )));
        }
        self.timing.validate()?;
        Ok(())
    }

    /// Minimal participant config for tests and defaults.
    pub fn minimal() -> Self {
        Self {
            node: NodeConfig {
                role: Role::Participant,
                address: Some(NodeAddress::new([0x02, 0, 0, 0, 0, 0x01])),
                channel: default_channel(),
            },
            timing: TimingConfig::default(),
            transport: TransportConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

impl Default for QuickdrawConfig {
    fn default() -> Self {
        Self::minimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = QuickdrawConfig::minimal();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [node]
            role = "participant"
            address = "02:00:00:00:00:0a"
            channel = 4

            [timing]
            rebroadcast_interval_ms = 20
            claim_timeout_ms = 5000

            [transport]
            port_base = 48000
        "#;

        let config = QuickdrawConfig::from_toml(toml).unwrap();
        assert_eq!(config.node.channel, 4);
        assert_eq!(config.transport.port(4), 48004);
        assert_eq!(config.timing.rebroadcast_interval_ms, 20);
    }

    #[test]
    fn test_participant_requires_address() {
        let toml = r#"
            [node]
            role = "participant"
        "#;
        let config = QuickdrawConfig::from_toml(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_coordinator_may_omit_address() {
        let toml = r#"
            [node]
            role = "coordinator"
        "#;
        let config = QuickdrawConfig::from_toml(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.node.role, Role::Coordinator);
        assert!(config.node.address.is_none());
    }

    #[test]
    fn test_broadcast_address_rejected_as_own() {
        let toml = r#"
            [node]
            role = "participant"
            address = "ff:ff:ff:ff:ff:ff"
        "#;
        let config = QuickdrawConfig::from_toml(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_port_overflow_rejected() {
        let mut config = QuickdrawConfig::minimal();
        config.transport.port_base = 65_530;
        config.node.channel = 10;
        assert!(config.validate().is_err());

        // The accessor itself never panics, even unvalidated.
        assert_eq!(config.transport.port(10), u16::MAX);
    }
}
