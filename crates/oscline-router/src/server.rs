//! UDP receive endpoint
//!
//! The receive task does nothing but copy datagrams into the inbound queue.
//! Decoding and listener calls happen later in
//! [`OscDispatcher::drain_and_dispatch`](crate::OscDispatcher::drain_and_dispatch).
//!
//! ## Filtering
//!
//! When `allowed_clients` is non-empty, datagrams from any other source IP are
//! dropped before they reach the queue.
//!
//! ## Multicast
//!
//! Setting `multicast_group` joins that IPv4 group on all interfaces after
//! binding.

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RouterError};
use crate::queue::{InboundSender, DEFAULT_QUEUE_CAPACITY};

/// OSC server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscServerConfig {
    /// Bind address for the UDP socket (e.g., "0.0.0.0:8000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Datagrams held before new ones are dropped (default: 1024)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Receive buffer size in bytes (default: 65507)
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
    /// Source IPs to accept. Empty accepts everyone.
    #[serde(default)]
    pub allowed_clients: Vec<IpAddr>,
    /// IPv4 multicast group to join
    #[serde(default)]
    pub multicast_group: Option<Ipv4Addr>,
    /// Receive our own multicast traffic
    #[serde(default = "default_loopback")]
    pub loopback: bool,
}

fn default_bind_addr() -> String {
    format!("0.0.0.0:{}", oscline_core::DEFAULT_PORT)
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_max_packet_size() -> usize {
    oscline_core::MAX_DATAGRAM_SIZE
}

fn default_loopback() -> bool {
    true
}

impl Default for OscServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            queue_capacity: default_queue_capacity(),
            max_packet_size: default_max_packet_size(),
            allowed_clients: Vec::new(),
            multicast_group: None,
            loopback: default_loopback(),
        }
    }
}

impl OscServerConfig {
    /// Config bound to `addr`, everything else default
    pub fn with_bind_addr(addr: impl Into<String>) -> Self {
        Self {
            bind_addr: addr.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(RouterError::Config("queue_capacity must be at least 1".into()));
        }
        if self.max_packet_size == 0 || self.max_packet_size > oscline_core::MAX_DATAGRAM_SIZE {
            return Err(RouterError::Config(format!(
                "max_packet_size must be between 1 and {}",
                oscline_core::MAX_DATAGRAM_SIZE
            )));
        }
        if let Some(group) = self.multicast_group {
            if !group.is_multicast() {
                return Err(RouterError::Config(format!(
                    "{} is not a multicast address",
                    group
                )));
            }
        }
        Ok(())
    }

    /// Whether datagrams from `source` pass the allow-list
    pub fn accepts(&self, source: &SocketAddr) -> bool {
        self.allowed_clients.is_empty() || self.allowed_clients.contains(&source.ip())
    }
}

/// UDP server feeding an inbound queue
pub struct OscServer {
    config: Arc<OscServerConfig>,
    socket: Arc<UdpSocket>,
    sender: InboundSender,
    /// Running flag
    running: Arc<RwLock<bool>>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl OscServer {
    /// Bind the socket described by `config`. Datagrams go to `sender` once
    /// [`spawn`](Self::spawn) is called.
    pub async fn bind(config: OscServerConfig, sender: InboundSender) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(&config.bind_addr).await?;

        if let Some(group) = config.multicast_group {
            socket.join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)?;
            socket.set_multicast_loop_v4(config.loopback)?;
            info!("Joined multicast group {}", group);
        }

        info!("OSC server listening on {}", socket.local_addr()?);

        Ok(Self {
            config: Arc::new(config),
            socket: Arc::new(socket),
            sender,
            running: Arc::new(RwLock::new(false)),
            shutdown: Mutex::new(None),
            task: Mutex::new(None),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn config(&self) -> &OscServerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Start the receive task. Calling it on a running server does nothing.
    pub fn spawn(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *self.shutdown.lock() = Some(shutdown_tx);
        *self.running.write() = true;

        let socket = Arc::clone(&self.socket);
        let sender = self.sender.clone();
        let config = Arc::clone(&self.config);
        let running = Arc::clone(&self.running);

        *task = Some(tokio::spawn(async move {
            let mut buf = vec![0u8; config.max_packet_size];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => match result {
                        Ok((len, source)) => {
                            if !config.accepts(&source) {
                                debug!("Ignoring datagram from unlisted client {}", source);
                                continue;
                            }
                            debug!("OSC received {} bytes from {}", len, source);
                            let data = Bytes::copy_from_slice(&buf[..len]);
                            if !sender.enqueue_raw(data, Some(source)) && sender.is_closed() {
                                warn!("Inbound queue closed, stopping OSC receiver");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("OSC recv error: {}", e);
                        }
                    },
                }
            }

            *running.write() = false;
            info!("OSC receive task stopped");
        }));
    }

    /// Stop the receive task and wait for it to finish
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("OSC receive task failed: {}", e);
            }
        }
        *self.running.write() = false;
    }
}

impl Drop for OscServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
    }
}

impl std::fmt::Debug for OscServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscServer")
            .field("config", &self.config)
            .field("local_addr", &self.socket.local_addr().ok())
            .field("running", &self.is_running())
            .finish()
    }
}
