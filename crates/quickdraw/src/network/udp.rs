//! UDP broadcast rendering of the radio medium.
//!
//! One socket, SO_BROADCAST, all sends to `broadcast_addr:port` where the
//! port folds in the configured radio channel. A background task decodes
//! inbound payloads and feeds the single-slot inbox; malformed payloads are
//! dropped there with no state change.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;

use quickdraw_core::{QuickdrawError, RaceDatagram, Result, DATAGRAM_LEN};

use crate::config::TransportConfig;

use super::{inbox, Inbox, Transport};

pub struct UdpBroadcast {
    socket: Arc<UdpSocket>,
    dest: SocketAddr,
}

impl UdpBroadcast {
    pub async fn bind(config: &TransportConfig, channel: u8) -> Result<Self> {
        let port = config.port(channel);
        let bind: SocketAddr = format!("{}:{}", config.bind_addr, port)
            .parse()
            .map_err(|e| QuickdrawError::transport(format!("bad bind address: {}", e)))?;
        let dest: SocketAddr = format!("{}:{}", config.broadcast_addr, port)
            .parse()
            .map_err(|e| QuickdrawError::transport(format!("bad broadcast address: {}", e)))?;

        let socket = UdpSocket::bind(bind).await?;
        socket.set_broadcast(true)?;

        tracing::info!(local = %socket.local_addr()?, dest = %dest, channel, "transport bound");

        Ok(Self {
            socket: Arc::new(socket),
            dest,
        })
    }

    /// Spawns the receive loop and returns the inbox it feeds.
    pub fn start_receive_loop(&self) -> Inbox {
        let (tx, rx) = inbox();
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut buf = [0u8; DATAGRAM_LEN + 1];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, from)) => match RaceDatagram::decode(&buf[..len]) {
                        Ok(dgram) => tx.deliver(dgram),
                        Err(e) => {
                            tracing::trace!(%from, len, error = %e, "malformed datagram dropped");
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "udp receive error");
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                }
            }
        });

        rx
    }
}

impl Transport for UdpBroadcast {
    async fn broadcast(&self, dgram: &RaceDatagram) -> Result<()> {
        self.socket.send_to(&dgram.encode(), self.dest).await?;
        Ok(())
    }
}
