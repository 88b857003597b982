//! OSC packets
//!
//! A packet is either a message or a bundle of nested packets:
//! ```text
//! message: address | ",tags" | arguments...
//! bundle:  "#bundle" | time tag (u64) | (int32 size | packet)*
//! ```
//!
//! Decoding is all-or-nothing: an error anywhere inside a message or a
//! bundle element discards the whole packet.

use bytes::Bytes;

use crate::address::OscAddress;
use crate::stream::{length_prefix, string_len, OscReader, OscWriter};
use crate::value::{tag, OscValue};
use crate::{time, Error, Result};

/// Bundle header string
pub const BUNDLE_TAG: &str = "#bundle";

/// Deepest bundle nesting the decoder accepts
pub const MAX_BUNDLE_DEPTH: usize = 64;

/// An addressed list of arguments
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: OscAddress,
    pub arguments: Vec<OscValue>,
}

impl OscMessage {
    pub fn new(address: OscAddress) -> Self {
        Self {
            address,
            arguments: Vec::new(),
        }
    }

    /// Append an argument (builder form)
    pub fn with_arg(mut self, value: impl Into<OscValue>) -> Self {
        self.arguments.push(value.into());
        self
    }

    pub fn push_arg(&mut self, value: impl Into<OscValue>) {
        self.arguments.push(value.into());
    }

    /// Only messages with a concrete path may be sent
    pub fn is_sendable(&self) -> bool {
        self.address.is_valid_path()
    }

    /// Whether every argument survives encoding unchanged
    pub fn is_lossless(&self) -> bool {
        self.arguments.iter().all(OscValue::is_lossless)
    }

    /// Type-tag string including the leading comma
    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.arguments.len() + 1);
        tags.push(tag::PREFIX as char);
        tags.extend(self.arguments.iter().map(|arg| arg.type_tag() as char));
        tags
    }

    fn encoded_len(&self) -> usize {
        string_len(self.address.path().len())
            + string_len(self.arguments.len() + 1)
            + self.arguments.iter().map(OscValue::encoded_len).sum::<usize>()
    }

    fn encode_into(&self, w: &mut OscWriter) {
        w.write_string(self.address.path());
        w.write_string(&self.type_tags());
        for arg in &self.arguments {
            arg.encode(w);
        }
    }

    fn decode_from(r: &mut OscReader<'_>) -> Result<Self> {
        let address = OscAddress::from_wire(&r.read_string()?);

        // Pre-1.0 senders may omit the type-tag string entirely
        if r.is_empty() {
            return Ok(Self::new(address));
        }

        let tags = r.read_str_bytes()?;
        let Some((&first, tags)) = tags.split_first() else {
            return Err(Error::UnknownTypeTag(0));
        };
        if first != tag::PREFIX {
            return Err(Error::UnknownTypeTag(first));
        }

        let mut arguments = Vec::with_capacity(tags.len());
        for &t in tags {
            arguments.push(OscValue::decode(t, r)?);
        }

        Ok(Self { address, arguments })
    }
}

/// A time-tagged group of packets
#[derive(Debug, Clone, PartialEq)]
pub struct OscBundle {
    pub time_tag: u64,
    pub elements: Vec<OscPacket>,
}

impl OscBundle {
    pub fn new(time_tag: u64) -> Self {
        Self {
            time_tag,
            elements: Vec::new(),
        }
    }

    /// Bundle to be processed on receipt
    pub fn immediate() -> Self {
        Self::new(time::IMMEDIATE)
    }

    pub fn with_element(mut self, packet: impl Into<OscPacket>) -> Self {
        self.elements.push(packet.into());
        self
    }

    pub fn push(&mut self, packet: impl Into<OscPacket>) {
        self.elements.push(packet.into());
    }

    pub fn is_immediate(&self) -> bool {
        self.time_tag == time::IMMEDIATE
    }

    fn encoded_len(&self) -> usize {
        string_len(BUNDLE_TAG.len())
            + 8
            + self
                .elements
                .iter()
                .map(|e| 4 + e.encoded_len())
                .sum::<usize>()
    }

    fn encode_into(&self, w: &mut OscWriter) {
        w.write_string(BUNDLE_TAG);
        w.write_u64(self.time_tag);
        for element in &self.elements {
            // Encode first so the size prefix is exact
            let bytes = element.encode();
            w.write_length(bytes.len());
            w.write_bytes(&bytes);
        }
    }

    fn decode_from(r: &mut OscReader<'_>, depth: usize) -> Result<Self> {
        if r.read_str_bytes()? != BUNDLE_TAG.as_bytes() {
            return Err(Error::InvalidBundleHeader);
        }
        let time_tag = r.read_u64()?;

        let mut elements = Vec::new();
        while !r.is_empty() {
            let size = r.read_length()?;
            let element = r.read_bytes(size)?;
            elements.push(OscPacket::decode_at_depth(element, depth + 1)?);
        }

        Ok(Self { time_tag, elements })
    }
}

/// Any OSC packet
#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    /// Decode one packet occupying the whole of `buf`
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_at_depth(buf, 0)
    }

    fn decode_at_depth(buf: &[u8], depth: usize) -> Result<Self> {
        let mut r = OscReader::new(buf);
        match r.peek() {
            Some(b'/') => Ok(OscPacket::Message(OscMessage::decode_from(&mut r)?)),
            Some(b'#') => {
                if depth >= MAX_BUNDLE_DEPTH {
                    return Err(Error::NestingTooDeep(MAX_BUNDLE_DEPTH));
                }
                Ok(OscPacket::Bundle(OscBundle::decode_from(&mut r, depth)?))
            }
            Some(other) => Err(Error::UnrecognizedLeadByte(other)),
            None => Err(Error::TruncatedBuffer { needed: 1, have: 0 }),
        }
    }

    /// Encode to wire bytes. Identical packets always produce identical bytes.
    pub fn encode(&self) -> Bytes {
        let mut w = OscWriter::with_capacity(self.encoded_len());
        match self {
            OscPacket::Message(m) => m.encode_into(&mut w),
            OscPacket::Bundle(b) => b.encode_into(&mut w),
        }
        w.into_bytes()
    }

    /// Like [`encode`](Self::encode), but refuses packets too large for
    /// their `int32` length prefixes.
    pub fn try_encode(&self) -> Result<Bytes> {
        // Every prefix is bounded by the total size
        length_prefix(self.encoded_len())?;
        Ok(self.encode())
    }

    /// Exact size of [`encode`](Self::encode)'s output
    pub fn encoded_len(&self) -> usize {
        match self {
            OscPacket::Message(m) => m.encoded_len(),
            OscPacket::Bundle(b) => b.encoded_len(),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, OscPacket::Message(_))
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, OscPacket::Bundle(_))
    }

    /// Every message in the packet tree, depth-first in element order
    pub fn messages(&self) -> Vec<&OscMessage> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages<'a>(&'a self, out: &mut Vec<&'a OscMessage>) {
        match self {
            OscPacket::Message(m) => out.push(m),
            OscPacket::Bundle(b) => {
                for element in &b.elements {
                    element.collect_messages(out);
                }
            }
        }
    }

    /// Consume the packet into its messages, depth-first in element order
    pub fn into_messages(self) -> Vec<OscMessage> {
        let mut out = Vec::new();
        flatten(self, &mut out);
        out
    }
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(m) => out.push(m),
        OscPacket::Bundle(b) => {
            for element in b.elements {
                flatten(element, out);
            }
        }
    }
}

impl From<OscMessage> for OscPacket {
    fn from(m: OscMessage) -> Self {
        OscPacket::Message(m)
    }
}

impl From<OscBundle> for OscPacket {
    fn from(b: OscBundle) -> Self {
        OscPacket::Bundle(b)
    }
}
