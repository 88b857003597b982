//! Inbound datagram queue
//!
//! The only state shared between the network receive context and the
//! dispatch context. Producers never block: when the queue is full or closed
//! the datagram is dropped and counted.

use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

/// Default number of datagrams the queue holds before dropping
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A raw datagram waiting to be decoded
#[derive(Debug, Clone)]
pub struct InboundDatagram {
    pub data: Bytes,
    /// Sender of the datagram, when known
    pub source: Option<SocketAddr>,
}

/// Counters shared by both ends of the queue
#[derive(Debug, Default)]
pub struct QueueStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl QueueStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Create a bounded queue holding up to `capacity` datagrams
pub fn inbound_queue(capacity: usize) -> (InboundSender, InboundReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let stats = Arc::new(QueueStats::default());

    (
        InboundSender {
            tx,
            stats: Arc::clone(&stats),
        },
        InboundReceiver { rx, stats },
    )
}

/// Producer half, used from the network receive context
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<InboundDatagram>,
    stats: Arc<QueueStats>,
}

impl InboundSender {
    /// Queue a raw datagram without decoding it.
    ///
    /// Returns `false` when the datagram was dropped because the queue is
    /// full or closed.
    pub fn enqueue_raw(&self, data: impl Into<Bytes>, source: Option<SocketAddr>) -> bool {
        let datagram = InboundDatagram {
            data: data.into(),
            source,
        };

        match self.tx.try_send(datagram) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(d)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Inbound queue full, dropping {} byte datagram from {:?}",
                    d.data.len(),
                    d.source
                );
                false
            }
            Err(TrySendError::Closed(d)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Inbound queue closed, dropping datagram from {:?}", d.source);
                false
            }
        }
    }

    /// Whether the consumer has closed or dropped the queue
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

/// Consumer half, used from the dispatch context
#[derive(Debug)]
pub struct InboundReceiver {
    rx: mpsc::Receiver<InboundDatagram>,
    stats: Arc<QueueStats>,
}

impl InboundReceiver {
    /// Take what is queued right now, in arrival order. Never waits.
    ///
    /// Datagrams arriving while the batch is taken stay queued for the next
    /// call, so a busy producer cannot stretch one batch.
    pub fn drain(&mut self) -> Vec<InboundDatagram> {
        let queued = self.rx.len();
        let mut batch = Vec::with_capacity(queued);
        while batch.len() < queued {
            match self.rx.try_recv() {
                Ok(datagram) => batch.push(datagram),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// Datagrams currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Wait until at least one datagram is queued, returning it.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn recv(&mut self) -> Option<InboundDatagram> {
        self.rx.recv().await
    }

    /// Stop accepting new datagrams. Already queued datagrams stay drainable.
    pub fn close(&mut self) {
        self.rx.close();
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}
