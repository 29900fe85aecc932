//! # quickdraw-core
//!
//! Wire-level types for the quickdraw race protocol.
//!
//! This crate provides:
//! - [`NodeAddress`] 6-byte node identifier with the broadcast sentinel
//! - [`RaceDatagram`] the single 12-byte wire entity and its classification
//! - Common error types

pub mod addr;
pub mod datagram;
pub mod error;

pub use addr::NodeAddress;
pub use datagram::{DatagramKind, RaceDatagram, WireError, DATAGRAM_LEN};
pub use error::{QuickdrawError, Result};
