use thiserror::Error;

use crate::addr::NodeAddress;

/// Fixed wire size of a [`RaceDatagram`]: two 6-byte address fields,
/// no header, no versioning, no checksum beyond the transport's own.
pub const DATAGRAM_LEN: usize = 12;

/// The sole wire entity of the protocol.
///
/// Exactly one of the two fields is meaningfully non-zero in a well-formed
/// datagram. A datagram with both fields set is tolerated on receive and
/// treated as a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceDatagram {
    /// Participant claiming to have fired first. Non-zero in a claim.
    pub pressed_by: NodeAddress,
    /// Arbitration outcome. Non-zero in a decision.
    pub declared_winner: NodeAddress,
}

/// Receive-side classification of a datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatagramKind {
    Claim,
    Decision,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("wrong datagram length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

impl RaceDatagram {
    pub fn claim(pressed_by: NodeAddress) -> Self {
        Self {
            pressed_by,
            declared_winner: NodeAddress::ZERO,
        }
    }

    pub fn decision(declared_winner: NodeAddress) -> Self {
        Self {
            pressed_by: NodeAddress::ZERO,
            declared_winner,
        }
    }

    /// Decision takes precedence when both fields are set.
    pub fn kind(&self) -> DatagramKind {
        if !self.declared_winner.is_zero() {
            DatagramKind::Decision
        } else {
            DatagramKind::Claim
        }
    }

    pub fn encode(&self) -> [u8; DATAGRAM_LEN] {
        let mut buf = [0u8; DATAGRAM_LEN];
        buf[..6].copy_from_slice(self.pressed_by.as_bytes());
        buf[6..].copy_from_slice(self.declared_winner.as_bytes());
        buf
    }

    /// Decodes a broadcast payload. Anything that is not exactly
    /// [`DATAGRAM_LEN`] bytes is malformed and must be dropped by the caller.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() != DATAGRAM_LEN {
            return Err(WireError::WrongLength {
                expected: DATAGRAM_LEN,
                actual: buf.len(),
            });
        }
        let mut pressed_by = [0u8; 6];
        let mut declared_winner = [0u8; 6];
        pressed_by.copy_from_slice(&buf[..6]);
        declared_winner.copy_from_slice(&buf[6..]);
        Ok(Self {
            pressed_by: NodeAddress::new(pressed_by),
            declared_winner: NodeAddress::new(declared_winner),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> NodeAddress {
        NodeAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    #[test]
    fn test_claim_classification() {
        let dgram = RaceDatagram::claim(addr(1));
        assert_eq!(dgram.kind(), DatagramKind::Claim);
        assert!(dgram.declared_winner.is_zero());
    }

    #[test]
    fn test_decision_classification() {
        let dgram = RaceDatagram::decision(addr(2));
        assert_eq!(dgram.kind(), DatagramKind::Decision);
    }

    #[test]
    fn test_both_fields_set_is_a_decision() {
        let dgram = RaceDatagram {
            pressed_by: addr(1),
            declared_winner: addr(2),
        };
        assert_eq!(dgram.kind(), DatagramKind::Decision);
    }

    #[test]
    fn test_encode_layout() {
        let dgram = RaceDatagram {
            pressed_by: addr(1),
            declared_winner: addr(2),
        };
        let buf = dgram.encode();
        assert_eq!(&buf[..6], addr(1).as_bytes());
        assert_eq!(&buf[6..], addr(2).as_bytes());
    }

    #[test]
    fn test_decode_round_trip() {
        let dgram = RaceDatagram::claim(addr(7));
        let decoded = RaceDatagram::decode(&dgram.encode()).unwrap();
        assert_eq!(decoded, dgram);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            RaceDatagram::decode(&[0u8; 11]),
            Err(WireError::WrongLength {
                expected: 12,
                actual: 11
            })
        );
        assert_eq!(
            RaceDatagram::decode(&[0u8; 13]),
            Err(WireError::WrongLength {
                expected: 12,
                actual: 13
            })
        );
    }
}
