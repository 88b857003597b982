//! OSC argument values
//!
//! Each variant owns its payload and maps to exactly one wire type tag.
//! `Bool`, `Nil` and `Infinitum` are carried by the tag alone.

use crate::stream::{OscReader, OscWriter};
use crate::{Error, Result};

/// Type tag bytes
pub mod tag {
    pub const INT32: u8 = b'i';
    pub const FLOAT32: u8 = b'f';
    pub const FLOAT64: u8 = b'd';
    pub const STRING: u8 = b's';
    pub const BLOB: u8 = b'b';
    pub const TIME_TAG: u8 = b't';
    pub const INT64: u8 = b'h';
    pub const CHAR: u8 = b'c';
    pub const TRUE: u8 = b'T';
    pub const FALSE: u8 = b'F';
    pub const NIL: u8 = b'N';
    pub const INFINITUM: u8 = b'I';
    pub const COLOR: u8 = b'r';

    /// Leading byte of every type-tag string
    pub const PREFIX: u8 = b',';
}

/// 32-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OscColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl OscColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as `r << 24 | g << 16 | b << 8 | a`
    pub const fn to_packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    pub const fn from_packed(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self { r, g, b, a }
    }
}

/// A single OSC argument
#[derive(Debug, Clone, PartialEq)]
pub enum OscValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// OSC strings are NUL terminated; anything from an interior NUL on is
    /// not transmitted
    String(String),
    Blob(Vec<u8>),
    Bool(bool),
    Nil,
    Infinitum,
    /// NTP-format time tag, see [`crate::time`]
    TimeTag(u64),
    Char(char),
    Color(OscColor),
}

impl OscValue {
    /// Wire type tag for this value
    #[inline]
    pub fn type_tag(&self) -> u8 {
        match self {
            OscValue::Int32(_) => tag::INT32,
            OscValue::Int64(_) => tag::INT64,
            OscValue::Float32(_) => tag::FLOAT32,
            OscValue::Float64(_) => tag::FLOAT64,
            OscValue::String(_) => tag::STRING,
            OscValue::Blob(_) => tag::BLOB,
            OscValue::Bool(true) => tag::TRUE,
            OscValue::Bool(false) => tag::FALSE,
            OscValue::Nil => tag::NIL,
            OscValue::Infinitum => tag::INFINITUM,
            OscValue::TimeTag(_) => tag::TIME_TAG,
            OscValue::Char(_) => tag::CHAR,
            OscValue::Color(_) => tag::COLOR,
        }
    }

    /// Whether `type_tag` names a supported type
    pub fn is_known_tag(type_tag: u8) -> bool {
        matches!(
            type_tag,
            tag::INT32
                | tag::INT64
                | tag::FLOAT32
                | tag::FLOAT64
                | tag::STRING
                | tag::BLOB
                | tag::TRUE
                | tag::FALSE
                | tag::NIL
                | tag::INFINITUM
                | tag::TIME_TAG
                | tag::CHAR
                | tag::COLOR
        )
    }

    /// Whether decoding this value's encoding gives the value back.
    ///
    /// Only strings with an interior NUL fail this.
    pub fn is_lossless(&self) -> bool {
        match self {
            OscValue::String(s) => !s.contains('\0'),
            _ => true,
        }
    }

    /// Encoded payload size in bytes (the tag itself lives in the type-tag string)
    pub fn encoded_len(&self) -> usize {
        use crate::stream::{padded_len, string_len, wire_str};

        match self {
            OscValue::Int32(_) | OscValue::Float32(_) | OscValue::Char(_) | OscValue::Color(_) => 4,
            OscValue::Int64(_) | OscValue::Float64(_) | OscValue::TimeTag(_) => 8,
            OscValue::String(s) => string_len(wire_str(s).len()),
            OscValue::Blob(b) => 4 + padded_len(b.len()),
            OscValue::Bool(_) | OscValue::Nil | OscValue::Infinitum => 0,
        }
    }

    /// Write this value's payload
    pub fn encode(&self, w: &mut OscWriter) {
        match self {
            OscValue::Int32(i) => w.write_i32(*i),
            OscValue::Int64(i) => w.write_i64(*i),
            OscValue::Float32(f) => w.write_f32(*f),
            OscValue::Float64(f) => w.write_f64(*f),
            OscValue::String(s) => w.write_string(s),
            OscValue::Blob(b) => w.write_blob(b),
            OscValue::TimeTag(t) => w.write_u64(*t),
            OscValue::Char(c) => w.write_u32(*c as u32),
            OscValue::Color(c) => w.write_u32(c.to_packed()),
            OscValue::Bool(_) | OscValue::Nil | OscValue::Infinitum => {}
        }
    }

    /// Read the payload for `type_tag`
    pub fn decode(type_tag: u8, r: &mut OscReader<'_>) -> Result<Self> {
        let value = match type_tag {
            tag::INT32 => OscValue::Int32(r.read_i32()?),
            tag::INT64 => OscValue::Int64(r.read_i64()?),
            tag::FLOAT32 => OscValue::Float32(r.read_f32()?),
            tag::FLOAT64 => OscValue::Float64(r.read_f64()?),
            tag::STRING => OscValue::String(r.read_string()?),
            tag::BLOB => OscValue::Blob(r.read_blob()?),
            tag::TIME_TAG => OscValue::TimeTag(r.read_u64()?),
            tag::CHAR => {
                let code = r.read_u32()?;
                OscValue::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            tag::COLOR => OscValue::Color(OscColor::from_packed(r.read_u32()?)),
            tag::TRUE => OscValue::Bool(true),
            tag::FALSE => OscValue::Bool(false),
            tag::NIL => OscValue::Nil,
            tag::INFINITUM => OscValue::Infinitum,
            other => return Err(Error::UnknownTypeTag(other)),
        };
        Ok(value)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            OscValue::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OscValue::Int64(i) => Some(*i),
            OscValue::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            OscValue::Float32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OscValue::Float64(f) => Some(*f),
            OscValue::Float32(f) => Some(*f as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OscValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            OscValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OscValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_time_tag(&self) -> Option<u64> {
        match self {
            OscValue::TimeTag(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            OscValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<OscColor> {
        match self {
            OscValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, OscValue::Nil)
    }
}

impl std::fmt::Display for OscValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OscValue::Int32(i) => write!(f, "{}", i),
            OscValue::Int64(i) => write!(f, "{}", i),
            OscValue::Float32(v) => write!(f, "{}", v),
            OscValue::Float64(v) => write!(f, "{}", v),
            OscValue::String(s) => write!(f, "{:?}", s),
            OscValue::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            OscValue::Bool(b) => write!(f, "{}", b),
            OscValue::Nil => write!(f, "nil"),
            OscValue::Infinitum => write!(f, "inf"),
            OscValue::TimeTag(t) => write!(f, "t:{:#018x}", t),
            OscValue::Char(c) => write!(f, "{:?}", c),
            OscValue::Color(c) => write!(f, "#{:08x}", c.to_packed()),
        }
    }
}

impl From<i32> for OscValue {
    fn from(v: i32) -> Self {
        OscValue::Int32(v)
    }
}

impl From<i64> for OscValue {
    fn from(v: i64) -> Self {
        OscValue::Int64(v)
    }
}

impl From<f32> for OscValue {
    fn from(v: f32) -> Self {
        OscValue::Float32(v)
    }
}

impl From<f64> for OscValue {
    fn from(v: f64) -> Self {
        OscValue::Float64(v)
    }
}

impl From<&str> for OscValue {
    fn from(v: &str) -> Self {
        OscValue::String(v.to_string())
    }
}

impl From<String> for OscValue {
    fn from(v: String) -> Self {
        OscValue::String(v)
    }
}

impl From<Vec<u8>> for OscValue {
    fn from(v: Vec<u8>) -> Self {
        OscValue::Blob(v)
    }
}

impl From<bool> for OscValue {
    fn from(v: bool) -> Self {
        OscValue::Bool(v)
    }
}

impl From<char> for OscValue {
    fn from(v: char) -> Self {
        OscValue::Char(v)
    }
}

impl From<OscColor> for OscValue {
    fn from(v: OscColor) -> Self {
        OscValue::Color(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &OscValue) -> OscValue {
        let mut w = OscWriter::new();
        value.encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), value.encoded_len());

        let mut r = OscReader::new(&bytes);
        let decoded = OscValue::decode(value.type_tag(), &mut r).unwrap();
        assert!(r.is_empty());
        decoded
    }

    #[test]
    fn test_value_roundtrip() {
        let values = vec![
            OscValue::Int32(-7),
            OscValue::Int64(i64::MIN),
            OscValue::Float32(0.25),
            OscValue::Float64(-1.0e300),
            OscValue::String("hello".to_string()),
            OscValue::String(String::new()),
            OscValue::Blob(vec![1, 2, 3]),
            OscValue::Blob(vec![]),
            OscValue::Bool(true),
            OscValue::Bool(false),
            OscValue::Nil,
            OscValue::Infinitum,
            OscValue::TimeTag(0xDEAD_BEEF_0000_0001),
            OscValue::Char('x'),
            OscValue::Color(OscColor::new(255, 128, 0, 64)),
        ];

        for value in &values {
            assert_eq!(&roundtrip(value), value);
        }
    }

    #[test]
    fn test_tag_only_values_have_no_payload() {
        for value in [OscValue::Bool(true), OscValue::Bool(false), OscValue::Nil, OscValue::Infinitum] {
            let mut w = OscWriter::new();
            value.encode(&mut w);
            assert_eq!(w.position(), 0);
        }
    }

    #[test]
    fn test_color_packing() {
        let color = OscColor::new(0x11, 0x22, 0x33, 0x44);
        assert_eq!(color.to_packed(), 0x1122_3344);
        assert_eq!(OscColor::from_packed(0x1122_3344), color);
    }

    #[test]
    fn test_unknown_tag() {
        let mut r = OscReader::new(&[0, 0, 0, 0]);
        assert_eq!(OscValue::decode(b'x', &mut r), Err(Error::UnknownTypeTag(b'x')));
        assert!(!OscValue::is_known_tag(b'['));
        assert!(OscValue::is_known_tag(b'r'));
    }

    #[test]
    fn test_invalid_char_code_is_replaced() {
        let mut r = OscReader::new(&[0x00, 0x11, 0x00, 0x00]);
        assert_eq!(
            OscValue::decode(tag::CHAR, &mut r).unwrap(),
            OscValue::Char(char::REPLACEMENT_CHARACTER)
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(OscValue::from(3).as_i32(), Some(3));
        assert_eq!(OscValue::from(3).as_i64(), Some(3));
        assert_eq!(OscValue::from(1.5f32).as_f64(), Some(1.5));
        assert_eq!(OscValue::from("hi").as_str(), Some("hi"));
        assert_eq!(OscValue::from(true).as_bool(), Some(true));
        assert_eq!(OscValue::from("hi").as_i32(), None);
    }
}
