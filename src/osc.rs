//! # OSC Message Codec
//!
//! The installation talks to its show-control rig in a small subset of
//! OSC 1.0 (Open Sound Control): one address, at most one argument. The
//! wire layout is the one bit-exact contract this crate has with the
//! outside world:
//!
//! ```text
//! <address> NUL, zero-padded to a 4-byte boundary
//! ',' <tag> NUL, zero-padded to 4        (omitted for address-only)
//! <value: 4 bytes big-endian, or NUL-terminated string padded to 4>
//! ```
//!
//! ## Policy
//! Parsing is lenient the way the rig expects: an unknown type tag yields an
//! address-only message rather than an error (logged at `debug!`), and only
//! the first tag of a tag string is honored — multi-argument messages are a
//! declared non-goal. Structural problems (no terminator, short value
//! bytes) are real errors.
//!
//! ## Ownership
//! String arguments live in the [`OscValue::Str`] variant; replacing or
//! dropping a message releases the buffer exactly once, by construction.

use thiserror::Error;
use tracing::debug;

/// Address field capacity, excluding the NUL terminator.
pub const MAX_ADDR_LEN: usize = 63;
/// Type-tag field capacity, excluding the NUL terminator.
pub const MAX_TAGS_LEN: usize = 7;
/// String argument capacity, excluding the NUL terminator.
pub const MAX_STR_LEN: usize = 255;

/// Ways a wire buffer or a message under construction can be malformed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OscError {
    /// The buffer ended before the named field was complete
    #[error("message buffer ended inside the {0} field")]
    Truncated(&'static str),

    /// No NUL terminator within the field's capacity
    #[error("{0} field is not NUL-terminated within its capacity")]
    Unterminated(&'static str),

    /// The named field holds bytes that are not valid UTF-8
    #[error("{0} field is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Address or string argument too long to encode
    #[error("{field} is {len} bytes, capacity is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Byte-oriented transport the serializer writes into.
///
/// The crate ships an implementation for `Vec<u8>`; the embedding
/// application implements this for its serial port or UDP socket.
pub trait ByteSink {
    type Error;
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl ByteSink for Vec<u8> {
    type Error = std::convert::Infallible;
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// The single typed argument of a message.
#[derive(Clone, Debug, PartialEq)]
pub enum OscValue {
    Int(i32),
    Float(f32),
    Str(String),
}

impl OscValue {
    /// The OSC type tag character for this value.
    pub fn type_tag(&self) -> char {
        match self {
            OscValue::Int(_) => 'i',
            OscValue::Float(_) => 'f',
            OscValue::Str(_) => 's',
        }
    }
}

/// One OSC message: an address and at most one argument.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct OscMessage {
    address: String,
    value: Option<OscValue>,
}

/// Round `n` up to the next multiple of 4.
fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// Read a NUL-terminated string of at most `max_len` bytes starting at
/// `pos`, returning it together with the position past the field's padding.
fn read_padded_str(
    buffer: &[u8],
    pos: usize,
    max_len: usize,
    field: &'static str,
) -> Result<(String, usize), OscError> {
    let slice = buffer.get(pos..).unwrap_or(&[]);
    let limit = slice.len().min(max_len + 1);
    let len = match slice[..limit].iter().position(|&b| b == 0) {
        Some(len) => len,
        None if slice.len() > max_len => return Err(OscError::Unterminated(field)),
        None => return Err(OscError::Truncated(field)),
    };
    let text = std::str::from_utf8(&slice[..len])
        .map_err(|_| OscError::InvalidUtf8(field))?
        .to_owned();
    Ok((text, pos + align4(len + 1)))
}

impl OscMessage {
    /// Address-only message.
    pub fn new(address: impl Into<String>) -> Result<Self, OscError> {
        let address = address.into();
        if address.len() > MAX_ADDR_LEN {
            return Err(OscError::TooLong {
                field: "address",
                len: address.len(),
                max: MAX_ADDR_LEN,
            });
        }
        Ok(Self {
            address,
            value: None,
        })
    }

    pub fn with_int(address: impl Into<String>, value: i32) -> Result<Self, OscError> {
        let mut msg = Self::new(address)?;
        msg.set_int(value);
        Ok(msg)
    }

    pub fn with_float(address: impl Into<String>, value: f32) -> Result<Self, OscError> {
        let mut msg = Self::new(address)?;
        msg.set_float(value);
        Ok(msg)
    }

    pub fn with_str(address: impl Into<String>, value: impl Into<String>) -> Result<Self, OscError> {
        let mut msg = Self::new(address)?;
        msg.set_str(value)?;
        Ok(msg)
    }

    /// Parse a wire buffer.
    ///
    /// Unknown type tags produce an address-only message (see module docs);
    /// structural damage produces an [`OscError`].
    pub fn parse(buffer: &[u8]) -> Result<Self, OscError> {
        let (address, pos) = read_padded_str(buffer, 0, MAX_ADDR_LEN, "address")?;
        let msg = Self {
            address,
            value: None,
        };
        if pos >= buffer.len() {
            // Address-only message: no type-tag field at all
            return Ok(msg);
        }

        let (tags, pos) = read_padded_str(buffer, pos, MAX_TAGS_LEN, "type tags")?;
        let tag = match tags.strip_prefix(',') {
            Some(rest) => {
                if rest.len() > 1 {
                    debug!(tags = %tags, "multiple type tags, honoring the first only");
                }
                rest.chars().next()
            }
            None => {
                debug!(tags = %tags, "type-tag field missing ',' prefix, parsing address only");
                None
            }
        };

        let value = match tag {
            Some('i') => {
                let bytes = Self::value_bytes(buffer, pos, "int32")?;
                Some(OscValue::Int(i32::from_be_bytes(bytes)))
            }
            Some('f') => {
                let bytes = Self::value_bytes(buffer, pos, "float32")?;
                Some(OscValue::Float(f32::from_bits(u32::from_be_bytes(bytes))))
            }
            Some('s') => {
                let (text, _) = read_padded_str(buffer, pos, MAX_STR_LEN, "string argument")?;
                Some(OscValue::Str(text))
            }
            Some(other) => {
                debug!(tag = %other, "unrecognized type tag, parsing address only");
                None
            }
            None => None,
        };

        Ok(Self { value, ..msg })
    }

    fn value_bytes(buffer: &[u8], pos: usize, field: &'static str) -> Result<[u8; 4], OscError> {
        buffer
            .get(pos..pos + 4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .ok_or(OscError::Truncated(field))
    }

    /// Serialize into `sink` in wire order.
    pub fn write_to<S: ByteSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        write_padded(sink, self.address.as_bytes())?;
        if let Some(value) = &self.value {
            let tags = [b',', value.type_tag() as u8];
            write_padded(sink, &tags)?;
            match value {
                OscValue::Int(v) => sink.write_all(&v.to_be_bytes())?,
                OscValue::Float(v) => sink.write_all(&v.to_bits().to_be_bytes())?,
                OscValue::Str(v) => write_padded(sink, v.as_bytes())?,
            }
        }
        Ok(())
    }

    /// Serialize to a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.encoded_len());
        match self.write_to(&mut buffer) {
            Ok(()) => buffer,
            Err(never) => match never {},
        }
    }

    /// Total wire length of the serialized message.
    pub fn encoded_len(&self) -> usize {
        let mut len = align4(self.address.len() + 1);
        if let Some(value) = &self.value {
            len += 4; // ",x" NUL pad
            len += match value {
                OscValue::Int(_) | OscValue::Float(_) => 4,
                OscValue::Str(s) => align4(s.len() + 1),
            };
        }
        len
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn value(&self) -> Option<&OscValue> {
        self.value.as_ref()
    }

    /// The active type tag, if the message carries a value.
    pub fn type_tag(&self) -> Option<char> {
        self.value.as_ref().map(OscValue::type_tag)
    }

    pub fn set_int(&mut self, value: i32) {
        self.value = Some(OscValue::Int(value));
    }

    pub fn set_float(&mut self, value: f32) {
        self.value = Some(OscValue::Float(value));
    }

    pub fn set_str(&mut self, value: impl Into<String>) -> Result<(), OscError> {
        let value = value.into();
        if value.len() > MAX_STR_LEN {
            return Err(OscError::TooLong {
                field: "string argument",
                len: value.len(),
                max: MAX_STR_LEN,
            });
        }
        self.value = Some(OscValue::Str(value));
        Ok(())
    }

    /// Drop any value, leaving an address-only message.
    pub fn clear(&mut self) {
        self.value = None;
    }
}

fn write_padded<S: ByteSink>(sink: &mut S, bytes: &[u8]) -> Result<(), S::Error> {
    const ZEROS: [u8; 4] = [0; 4];
    sink.write_all(bytes)?;
    // NUL terminator plus zero-fill to the 4-byte boundary
    let pad = align4(bytes.len() + 1) - bytes.len();
    sink.write_all(&ZEROS[..pad])
}

impl std::fmt::Display for OscMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            None => write!(f, "{}", self.address),
            Some(OscValue::Int(v)) => write!(f, "{} ,i {}", self.address, v),
            Some(OscValue::Float(v)) => write!(f, "{} ,f {}", self.address, v),
            Some(OscValue::Str(v)) => write!(f, "{} ,s {:?}", self.address, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_roundtrip() {
        let msg = OscMessage::with_int("/test", 42).unwrap();
        let bytes = msg.to_bytes();
        let parsed = OscMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.address(), "/test");
        assert_eq!(parsed.type_tag(), Some('i'));
        assert_eq!(parsed.value(), Some(&OscValue::Int(42)));
    }

    #[test]
    fn float_roundtrip() {
        // 3.25 is exactly representable
        let msg = OscMessage::with_float("/test", 3.25).unwrap();
        let parsed = OscMessage::parse(&msg.to_bytes()).unwrap();
        assert_eq!(parsed.value(), Some(&OscValue::Float(3.25)));
    }

    #[test]
    fn string_roundtrip() {
        let msg = OscMessage::with_str("/test", "ok").unwrap();
        let parsed = OscMessage::parse(&msg.to_bytes()).unwrap();
        assert_eq!(parsed.value(), Some(&OscValue::Str("ok".to_string())));
    }

    #[test]
    fn address_only_roundtrip() {
        let msg = OscMessage::new("/ping").unwrap();
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), 8);
        let parsed = OscMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.address(), "/ping");
        assert_eq!(parsed.value(), None);
    }

    #[test]
    fn known_wire_layout_for_int() {
        let bytes = OscMessage::with_int("/x", 1).unwrap().to_bytes();
        assert_eq!(
            bytes,
            vec![b'/', b'x', 0, 0, b',', b'i', 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn address_block_padding_lengths() {
        // Block length must be 4 * ceil((L + 1) / 4) for address length L
        for (addr, expected) in [("", 4), ("a", 4), ("abc", 4), ("abcd", 8), ("abcdefg", 8)] {
            let bytes = OscMessage::new(addr).unwrap().to_bytes();
            assert_eq!(bytes.len(), expected, "address {addr:?}");
            // Everything past the address itself is zero-fill
            assert!(bytes[addr.len()..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn string_value_padding() {
        // "abcd" needs NUL plus three pad bytes: an 8-byte value block
        let bytes = OscMessage::with_str("/s", "abcd").unwrap().to_bytes();
        assert_eq!(bytes.len(), 4 + 4 + 8);
        let parsed = OscMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.value(), Some(&OscValue::Str("abcd".to_string())));
    }

    #[test]
    fn unknown_tag_parses_as_address_only() {
        // ",b" (blob) is not supported; value bytes are ignored
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"/x\0\0");
        bytes.extend_from_slice(b",b\0\0");
        bytes.extend_from_slice(&[0, 0, 0, 9]);
        let parsed = OscMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.address(), "/x");
        assert_eq!(parsed.value(), None);
    }

    #[test]
    fn only_first_tag_is_honored() {
        // ",ii" with one int payload: single-argument subset
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"/x\0\0");
        bytes.extend_from_slice(b",ii\0");
        bytes.extend_from_slice(&7i32.to_be_bytes());
        let parsed = OscMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.value(), Some(&OscValue::Int(7)));
    }

    #[test]
    fn unterminated_address_is_an_error() {
        assert_eq!(
            OscMessage::parse(b"/test"),
            Err(OscError::Truncated("address"))
        );
        let long = [b'a'; 80];
        assert_eq!(
            OscMessage::parse(&long),
            Err(OscError::Unterminated("address"))
        );
    }

    #[test]
    fn short_value_bytes_are_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"/x\0\0");
        bytes.extend_from_slice(b",i\0\0");
        bytes.extend_from_slice(&[0, 1]); // two of four bytes
        assert_eq!(
            OscMessage::parse(&bytes),
            Err(OscError::Truncated("int32"))
        );
    }

    #[test]
    fn non_utf8_address_is_an_error() {
        let bytes = [0xFF, 0xFE, 0, 0];
        assert_eq!(
            OscMessage::parse(&bytes),
            Err(OscError::InvalidUtf8("address"))
        );
    }

    #[test]
    fn negative_int_roundtrip() {
        let msg = OscMessage::with_int("/score", -1).unwrap();
        let parsed = OscMessage::parse(&msg.to_bytes()).unwrap();
        assert_eq!(parsed.value(), Some(&OscValue::Int(-1)));
    }

    #[test]
    fn replacing_values_is_clean() {
        // The old string is dropped on reassignment; no manual release sites
        let mut msg = OscMessage::with_str("/x", "first").unwrap();
        msg.set_str("second").unwrap();
        msg.set_int(5);
        assert_eq!(msg.value(), Some(&OscValue::Int(5)));
        msg.clear();
        assert_eq!(msg.value(), None);
        assert_eq!(msg.encoded_len(), 4);
    }

    #[test]
    fn overlong_address_rejected_at_construction() {
        let addr = "/".repeat(MAX_ADDR_LEN + 1);
        assert!(matches!(
            OscMessage::new(addr),
            Err(OscError::TooLong { field: "address", .. })
        ));
    }

    #[test]
    fn encoded_len_matches_wire_bytes() {
        for msg in [
            OscMessage::new("/a").unwrap(),
            OscMessage::with_int("/abc", 9).unwrap(),
            OscMessage::with_float("/abcd", 1.5).unwrap(),
            OscMessage::with_str("/long/address", "payload").unwrap(),
        ] {
            assert_eq!(msg.encoded_len(), msg.to_bytes().len(), "{msg}");
        }
    }
}
