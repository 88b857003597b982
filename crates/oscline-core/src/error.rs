//! Error types for the OSC core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building addresses or decoding packets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fixed-size read, blob body or padding skip ran past the buffer end
    #[error("buffer truncated: need {needed} bytes, have {have}")]
    TruncatedBuffer { needed: usize, have: usize },

    /// A string ran to the end of the buffer without a NUL terminator
    #[error("string is missing its NUL terminator")]
    MissingTerminator,

    /// Type tag byte outside the supported set
    #[error("unknown type tag: {:?}", char::from(*.0))]
    UnknownTypeTag(u8),

    /// Packet starts with something other than `/` or `#`
    #[error("unrecognized lead byte: 0x{0:02x}")]
    UnrecognizedLeadByte(u8),

    /// Packet starts with `#` but is not `#bundle`
    #[error("invalid bundle header")]
    InvalidBundleHeader,

    /// Blob or bundle element declared a negative length
    #[error("invalid length prefix: {0}")]
    InvalidLength(i32),

    /// Payload too large for an `int32` length prefix
    #[error("length {0} does not fit an int32 prefix")]
    LengthOverflow(usize),

    /// Bundles nested deeper than the decoder accepts
    #[error("bundle nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    /// Address component contains the path separator
    #[error("invalid address component: {0:?}")]
    InvalidComponent(String),

    /// Method name is empty
    #[error("method name must not be empty")]
    EmptyMethod,

    /// Address string could not be parsed
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Whether this error came from decoding wire data, as opposed to
    /// building an address in code.
    pub fn is_decode_error(&self) -> bool {
        !matches!(
            self,
            Error::InvalidComponent(_)
                | Error::EmptyMethod
                | Error::InvalidAddress(_)
                | Error::LengthOverflow(_)
        )
    }
}
