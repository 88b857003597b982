//! oscline router
//!
//! The receive-side pipeline for OSC:
//! - A bounded inbound queue that network code feeds with raw datagrams
//! - A registry of address patterns and their listeners
//! - A dispatcher that drains the queue, decodes, unwraps bundles and
//!   delivers each message to every matching listener
//! - Thin UDP server and client endpoints
//!
//! # Example
//!
//! ```no_run
//! use oscline_core::OscAddress;
//! use oscline_router::{listener, OscDispatcher, OscServer, OscServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dispatcher = OscDispatcher::new(1024);
//!     dispatcher.bind(
//!         OscAddress::parse("/synth/*/gain")?,
//!         listener(|_, msg| println!("{} {:?}", msg.address, msg.arguments)),
//!     )?;
//!
//!     let server = OscServer::bind(OscServerConfig::default(), dispatcher.sender()).await?;
//!     server.spawn();
//!
//!     loop {
//!         dispatcher.drain_and_dispatch();
//!         tokio::time::sleep(std::time::Duration::from_millis(5)).await;
//!     }
//! }
//! ```

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod registry;
pub mod server;

pub use client::OscClient;
pub use dispatcher::{DispatchReport, OscDispatcher};
pub use error::{BindError, Result, RouterError};
pub use queue::{inbound_queue, InboundDatagram, InboundReceiver, InboundSender, QueueStats};
pub use registry::{listener, ListenerHandle, OscListener, PatternRegistry};
pub use server::{OscServer, OscServerConfig};
