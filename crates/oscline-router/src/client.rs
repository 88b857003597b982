//! UDP send endpoint

use oscline_core::{OscBundle, OscMessage, OscPacket};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::error::{Result, RouterError};

/// Sends OSC packets to one target
#[derive(Debug)]
pub struct OscClient {
    socket: UdpSocket,
    target: SocketAddr,
    max_packet_size: usize,
}

impl OscClient {
    /// Bind an ephemeral local port and send to `target`
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        Self::bind(local, target).await
    }

    /// Bind `local` and send to `target`
    pub async fn bind(local: &str, target: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        debug!("OSC client bound to {}, target {}", socket.local_addr()?, target);

        Ok(Self {
            socket,
            target,
            max_packet_size: oscline_core::MAX_DATAGRAM_SIZE,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn set_target(&mut self, target: SocketAddr) {
        self.target = target;
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Allow sending to broadcast addresses
    pub fn set_broadcast(&self, enable: bool) -> Result<()> {
        Ok(self.socket.set_broadcast(enable)?)
    }

    /// Encode and send `packet`, returning the number of bytes sent.
    ///
    /// Every message in the packet, including those nested in bundles, must
    /// carry a concrete path and arguments that encode without loss.
    pub async fn send(&self, packet: &OscPacket) -> Result<usize> {
        for message in packet.messages() {
            if !message.is_sendable() {
                return Err(RouterError::UnsendableAddress(message.address.clone()));
            }
            if let Some(index) = message.arguments.iter().position(|a| !a.is_lossless()) {
                return Err(RouterError::UnencodableArgument {
                    address: message.address.clone(),
                    index,
                });
            }
        }

        let len = packet.encoded_len();
        if len > self.max_packet_size {
            return Err(RouterError::PacketTooLarge(len, self.max_packet_size));
        }

        let bytes = packet.try_encode()?;

        let sent = self.socket.send_to(&bytes, self.target).await?;
        debug!("OSC sent {} bytes to {}", sent, self.target);
        Ok(sent)
    }

    pub async fn send_message(&self, message: OscMessage) -> Result<usize> {
        self.send(&OscPacket::Message(message)).await
    }

    pub async fn send_bundle(&self, bundle: OscBundle) -> Result<usize> {
        self.send(&OscPacket::Bundle(bundle)).await
    }
}
