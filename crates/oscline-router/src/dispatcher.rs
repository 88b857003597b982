//! Application-side dispatch
//!
//! Network code only enqueues raw datagrams. Everything else happens when the
//! application calls [`OscDispatcher::drain_and_dispatch`]:
//!
//! ```text
//! Received -> Queued -> Decoded -> Matched x N -> Delivered
//!                          \-> Rejected (decode error or invalid address)
//! ```
//!
//! Listeners therefore always run on the caller's thread, one at a time.

use oscline_core::{OscAddress, OscMessage, OscPacket};
use std::net::SocketAddr;
use tracing::{debug, trace, warn};

use crate::error::BindError;
use crate::queue::{inbound_queue, InboundReceiver, InboundSender, QueueStats, DEFAULT_QUEUE_CAPACITY};
use crate::registry::{ListenerHandle, PatternRegistry};

/// Outcome of one `drain_and_dispatch` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Datagrams taken off the queue
    pub datagrams: usize,
    /// Datagrams dropped because they failed to decode
    pub rejected: usize,
    /// Messages reached after unwrapping bundles
    pub messages: usize,
    /// Messages dropped because their address is not a valid path
    pub invalid_addresses: usize,
    /// Listener invocations
    pub deliveries: usize,
}

impl DispatchReport {
    fn absorb(&mut self, other: DispatchReport) {
        self.datagrams += other.datagrams;
        self.rejected += other.rejected;
        self.messages += other.messages;
        self.invalid_addresses += other.invalid_addresses;
        self.deliveries += other.deliveries;
    }
}

/// Owns the pattern registry and the consumer end of the inbound queue
pub struct OscDispatcher {
    registry: PatternRegistry,
    sender: InboundSender,
    receiver: InboundReceiver,
}

impl OscDispatcher {
    pub fn new(queue_capacity: usize) -> Self {
        let (sender, receiver) = inbound_queue(queue_capacity);
        Self {
            registry: PatternRegistry::new(),
            sender,
            receiver,
        }
    }

    /// Producer handle for receive contexts
    pub fn sender(&self) -> InboundSender {
        self.sender.clone()
    }

    /// Queue a raw datagram from the current context
    pub fn enqueue_raw(&self, data: impl Into<bytes::Bytes>, source: Option<SocketAddr>) -> bool {
        self.sender.enqueue_raw(data, source)
    }

    pub fn bind(&mut self, pattern: OscAddress, listener: ListenerHandle) -> Result<(), BindError> {
        debug!("Binding listener to {}", pattern);
        self.registry.bind(pattern, listener)
    }

    pub fn unbind(&mut self, pattern: &OscAddress, listener: &ListenerHandle) -> bool {
        self.registry.unbind(pattern, listener)
    }

    pub fn unbind_all(&mut self, pattern: &OscAddress) -> usize {
        self.registry.unbind_all(pattern)
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn queue_stats(&self) -> &QueueStats {
        self.receiver.stats()
    }

    /// Decode and deliver everything queued so far, in arrival order.
    ///
    /// Datagrams that fail to decode are logged and dropped without
    /// affecting the rest of the batch.
    pub fn drain_and_dispatch(&mut self) -> DispatchReport {
        let batch = self.receiver.drain();
        let mut report = DispatchReport {
            datagrams: batch.len(),
            ..Default::default()
        };

        for datagram in batch {
            match OscPacket::decode(&datagram.data) {
                Ok(packet) => {
                    trace!("Decoded packet from {:?}", datagram.source);
                    report.absorb(self.dispatch_packet(&packet));
                }
                Err(e) => {
                    report.rejected += 1;
                    warn!(
                        "Dropping malformed OSC datagram ({} bytes) from {:?}: {}",
                        datagram.data.len(),
                        datagram.source,
                        e
                    );
                }
            }
        }

        if report.rejected > 0 {
            debug!("Rejected {} of {} datagrams", report.rejected, report.datagrams);
        }
        report
    }

    /// Deliver an already decoded packet, unwrapping bundles depth-first
    pub fn dispatch_packet(&self, packet: &OscPacket) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.dispatch_into(packet, &mut report);
        report
    }

    fn dispatch_into(&self, packet: &OscPacket, report: &mut DispatchReport) {
        match packet {
            OscPacket::Message(message) => self.dispatch_message(message, report),
            OscPacket::Bundle(bundle) => {
                for element in &bundle.elements {
                    self.dispatch_into(element, report);
                }
            }
        }
    }

    fn dispatch_message(&self, message: &OscMessage, report: &mut DispatchReport) {
        report.messages += 1;

        if !message.address.is_valid_path() {
            report.invalid_addresses += 1;
            warn!("Ignoring message with invalid address {}", message.address);
            return;
        }

        let delivered = self
            .registry
            .for_each_match(&message.address, |pattern, listener| {
                listener.on_message(pattern, message)
            });

        if delivered == 0 {
            trace!("No listener for {}", message.address);
        }
        report.deliveries += delivered;
    }

    /// Stop accepting datagrams. Anything still queued may be discarded.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Default for OscDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl std::fmt::Debug for OscDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscDispatcher")
            .field("registry", &self.registry)
            .field("enqueued", &self.queue_stats().enqueued())
            .field("dropped", &self.queue_stats().dropped())
            .finish()
    }
}
