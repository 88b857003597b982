//! oscline core
//!
//! Open Sound Control 1.0 primitives:
//! - Argument values ([`OscValue`], [`OscColor`])
//! - The big-endian, 4-byte aligned stream codec ([`stream`])
//! - Addresses and glob pattern matching ([`OscAddress`], [`pattern`])
//! - Messages and bundles with their wire encoding ([`OscPacket`])
//! - NTP time tags ([`time`])
//!
//! # Example
//!
//! ```
//! use oscline_core::{OscAddress, OscMessage, OscPacket};
//!
//! let address = OscAddress::parse("/synth/1/gain").unwrap();
//! let packet = OscPacket::from(OscMessage::new(address).with_arg(0.5f32));
//!
//! let bytes = packet.encode();
//! assert_eq!(OscPacket::decode(&bytes).unwrap(), packet);
//!
//! let pattern = OscAddress::parse("/synth/*/gain").unwrap();
//! if let OscPacket::Message(msg) = &packet {
//!     assert!(pattern.matches(&msg.address));
//! }
//! ```

pub mod address;
pub mod error;
pub mod packet;
pub mod pattern;
pub mod stream;
pub mod time;
pub mod value;

pub use address::OscAddress;
pub use error::{Error, Result};
pub use packet::{OscBundle, OscMessage, OscPacket};
pub use value::{OscColor, OscValue};

/// Largest payload a single UDP datagram can carry
pub const MAX_DATAGRAM_SIZE: usize = 65507;

/// Conventional OSC UDP port
pub const DEFAULT_PORT: u16 = 8000;
