//! # Quickdraw
//!
//! First-responder-wins race protocol for battery-powered nodes sharing one
//! broadcast radio channel.
//!
//! One node is the coordinator; the rest are participants holding a physical
//! trigger. A fired trigger floods a claim, the coordinator declares the
//! winner (first claim received wins), and every participant converges on a
//! winner/loser indication before sleeping.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quickdraw::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QuickdrawConfig::from_file("quickdraw.toml")?;
//!
//!     let transport = UdpBroadcast::bind(&config.transport, config.node.channel).await?;
//!     let inbox = transport.start_receive_loop();
//!     // wire a ParticipantNode or CoordinatorNode, then run it
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: Enable the CLI binary with file logging and a stdin trigger

pub mod config;
pub mod network;
pub mod node;
pub mod platform;
pub mod protocol;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use quickdraw_core::{NodeAddress, QuickdrawError, RaceDatagram};

pub mod prelude {
    pub use quickdraw_core::{NodeAddress, RaceDatagram};

    pub use crate::config::QuickdrawConfig;
    pub use crate::network::UdpBroadcast;
    pub use crate::node::{CoordinatorNode, ParticipantNode};
}
