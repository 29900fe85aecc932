//! Broadcast transport boundary.
//!
//! The medium is unreliable and connectionless: sends are fire-and-forget to
//! the broadcast address, and inbound datagrams arrive through a bounded
//! single-slot [`Inbox`] drained once per loop iteration.

pub mod udp;

use std::future::Future;

use tokio::sync::mpsc;

use quickdraw_core::{RaceDatagram, Result};

pub use udp::UdpBroadcast;

/// Outbound half of the broadcast medium. All sends go to the reserved
/// broadcast destination; no unicast is used.
pub trait Transport {
    fn broadcast(&self, dgram: &RaceDatagram) -> impl Future<Output = Result<()>> + Send;
}

/// Bounded single-slot inbox of decoded inbound datagrams.
///
/// Capacity one preserves the "at most one in-flight inbound event between
/// iterations" semantics; overflow is dropped at the sender, which is safe
/// because every protocol message is periodically re-sent anyway.
pub struct Inbox {
    rx: mpsc::Receiver<RaceDatagram>,
}

#[derive(Clone)]
pub struct InboxSender {
    tx: mpsc::Sender<RaceDatagram>,
}

pub fn inbox() -> (InboxSender, Inbox) {
    let (tx, rx) = mpsc::channel(1);
    (InboxSender { tx }, Inbox { rx })
}

impl Inbox {
    /// Takes the pending datagram, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<RaceDatagram> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next datagram. Returns `None` once every sender is
    /// gone.
    pub async fn recv(&mut self) -> Option<RaceDatagram> {
        self.rx.recv().await
    }
}

impl InboxSender {
    /// Delivers without blocking; a full slot loses the datagram.
    pub fn deliver(&self, dgram: RaceDatagram) {
        if self.tx.try_send(dgram).is_err() {
            tracing::trace!("inbox full, inbound datagram dropped");
        }
    }
}
