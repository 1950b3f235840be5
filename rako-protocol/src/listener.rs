//! Status listener: the scoped UDP socket status broadcasts arrive on
//!
//! A listener is opened through a [`ListenerFactory`] and owned by whoever
//! consumes it. Dropping the listener closes the socket, so every exit path of
//! the consumer releases the port.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::error::{ProtocolError, Result};
use crate::message::{decode_datagram, Message};

/// Largest datagram the bridge sends, with headroom
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 256;

/// A source of decoded messages from one bridge
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message.
    ///
    /// Returns `Ok(None)` when the receive timeout elapsed without a datagram.
    /// A [`ProtocolError::Decode`] covers a single bad datagram; any other
    /// error means the source is unusable.
    async fn next_message(&mut self) -> Result<Option<Message>>;
}

/// Opens message sources bound to a bridge status port
#[async_trait]
pub trait ListenerFactory: Send + Sync {
    async fn open(&self, port: u16) -> Result<Box<dyn MessageSource>>;
}

/// UDP socket receiving bridge status broadcasts
#[derive(Debug)]
pub struct UdpListener {
    socket: UdpSocket,
    receive_timeout: Option<Duration>,
    buffer: Vec<u8>,
}

impl UdpListener {
    /// Bind to `port` on all interfaces
    pub async fn bind(
        port: u16,
        receive_timeout: Option<Duration>,
        max_datagram_size: usize,
    ) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ProtocolError::Bind { port, source })?;

        tracing::debug!("Status listener bound on {}", addr);

        Ok(Self {
            socket,
            receive_timeout,
            buffer: vec![0; max_datagram_size],
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl MessageSource for UdpListener {
    async fn next_message(&mut self) -> Result<Option<Message>> {
        let recv = self.socket.recv_from(&mut self.buffer);
        let received = match self.receive_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, recv).await {
                Ok(received) => received,
                Err(_) => return Ok(None),
            },
            None => recv.await,
        };

        let (size, from) = received?;
        tracing::trace!("Received {} byte datagram from {}", size, from);

        Ok(Some(decode_datagram(&self.buffer[..size])?))
    }
}

impl Drop for UdpListener {
    fn drop(&mut self) {
        if let Ok(addr) = self.socket.local_addr() {
            tracing::debug!("Status listener on {} released", addr);
        }
    }
}

/// Production [`ListenerFactory`] binding real UDP sockets
#[derive(Debug, Clone)]
pub struct UdpListenerFactory {
    receive_timeout: Option<Duration>,
    max_datagram_size: usize,
}

impl UdpListenerFactory {
    pub fn new(receive_timeout: Option<Duration>, max_datagram_size: usize) -> Self {
        Self {
            receive_timeout,
            max_datagram_size,
        }
    }
}

impl Default for UdpListenerFactory {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(30)), DEFAULT_MAX_DATAGRAM_SIZE)
    }
}

#[async_trait]
impl ListenerFactory for UdpListenerFactory {
    async fn open(&self, port: u16) -> Result<Box<dyn MessageSource>> {
        let listener = UdpListener::bind(port, self.receive_timeout, self.max_datagram_size).await?;
        Ok(Box::new(listener))
    }
}
