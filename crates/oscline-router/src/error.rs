//! Router error types

use oscline_core::OscAddress;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouterError>;

/// Rejected listener registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("invalid address pattern: {0}")]
    InvalidPattern(OscAddress),
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("bind error: {0}")]
    Bind(#[from] BindError),

    #[error("core protocol error: {0}")]
    Core(#[from] oscline_core::Error),

    #[error("address is not a sendable path: {0}")]
    UnsendableAddress(OscAddress),

    #[error("argument {index} of {address} contains a NUL and would be cut on the wire")]
    UnencodableArgument { address: OscAddress, index: usize },

    #[error("packet too large: {0} bytes (max {1})")]
    PacketTooLarge(usize, usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
