use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed 6-byte node identifier.
///
/// The all-ones value is reserved as the broadcast destination and doubles
/// as the "unset" sentinel for address-valued record fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress(pub [u8; 6]);

impl NodeAddress {
    /// Broadcast destination, also the unset sentinel.
    pub const BROADCAST: NodeAddress = NodeAddress([0xFF; 6]);

    /// All-zero address, the "no value" encoding inside a datagram field.
    pub const ZERO: NodeAddress = NodeAddress([0; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// True when every byte is zero, i.e. the datagram field carries nothing.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    /// True when this is the broadcast/unset sentinel.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl fmt::Debug for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeAddress({})", self)
    }
}

#[derive(Debug, Clone, Error)]
pub enum AddrParseError {
    #[error("invalid address length: expected 6 bytes, got {0}")]
    Length(usize),

    #[error("invalid hex in address: {0}")]
    Hex(String),
}

impl FromStr for NodeAddress {
    type Err = AddrParseError;

    /// Parses `aa:bb:cc:dd:ee:ff` (colons optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| *c != ':').collect();
        let bytes = hex::decode(&compact).map_err(|e| AddrParseError::Hex(e.to_string()))?;
        let bytes: [u8; 6] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| AddrParseError::Length(v.len()))?;
        Ok(NodeAddress(bytes))
    }
}

impl Serialize for NodeAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
