//! Wire codec for the Wayland protocol: the fixed 8-byte message header and
//! the 4-byte-aligned argument encodings. Pure functions, no I/O.
//!
//! The protocol carries no endianness tag; both peers are assumed to run on
//! the same host, so all words are native-endian.

use byteorder::{ByteOrder, NativeEndian};

use crate::error::{Result, WaylandClientError};
use crate::objects::ObjectId;

pub const HEADER_SIZE: usize = 8;

/// Upper bound on one encoded message. The protocol caps `size` at u16 in
/// any case; the tighter bound here matches the receive buffer and makes an
/// oversized encode a reportable error instead of silent truncation.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Rounds up to the next multiple of 4 (argument alignment).
pub const fn round_up_4(n: usize) -> usize {
    (n + 3) & !3
}

/// The 8-byte message header: object id, then opcode in the low 16 bits and
/// total message size (header included) in the high 16 bits of the second
/// word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub object_id: ObjectId,
    pub opcode: u16,
    pub size: u16,
}

impl MessageHeader {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        NativeEndian::write_u32(&mut bytes[0..4], self.object_id);
        NativeEndian::write_u32(
            &mut bytes[4..8],
            (u32::from(self.size) << 16) | u32::from(self.opcode),
        );
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(WaylandClientError::Malformed(format!(
                "need {} bytes for header, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        let object_id = NativeEndian::read_u32(&bytes[0..4]);
        let word = NativeEndian::read_u32(&bytes[4..8]);
        let opcode = (word & 0xffff) as u16;
        let size = (word >> 16) as u16;
        if (size as usize) < HEADER_SIZE || size % 4 != 0 {
            return Err(WaylandClientError::Malformed(format!(
                "header declares invalid message size {size}"
            )));
        }
        Ok(MessageHeader {
            object_id,
            opcode,
            size,
        })
    }
}

/// One request argument. File descriptors never appear here; they travel as
/// ancillary data on the socket, not in the byte stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Int(i32),
    Uint(u32),
    Object(ObjectId),
    NewId(ObjectId),
    Str(String),
}

impl Argument {
    fn encoded_len(&self) -> usize {
        match self {
            Argument::Int(_) | Argument::Uint(_) | Argument::Object(_) | Argument::NewId(_) => 4,
            // length word + bytes + NUL, padded
            Argument::Str(s) => 4 + round_up_4(s.len() + 1),
        }
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Argument::Int(v) => out.extend_from_slice(&v.to_ne_bytes()),
            Argument::Uint(v) | Argument::Object(v) | Argument::NewId(v) => {
                out.extend_from_slice(&v.to_ne_bytes())
            }
            Argument::Str(s) => {
                let len_with_nul = s.len() + 1;
                out.extend_from_slice(&(len_with_nul as u32).to_ne_bytes());
                out.extend_from_slice(s.as_bytes());
                out.push(0);
                for _ in len_with_nul..round_up_4(len_with_nul) {
                    out.push(0);
                }
            }
        }
    }
}

/// Encodes a complete request. Fails with `MessageTooLarge` instead of
/// overrunning the peer-visible u16 size field or the send buffer.
pub fn serialize_message(object_id: ObjectId, opcode: u16, args: &[Argument]) -> Result<Vec<u8>> {
    let payload_len: usize = args.iter().map(Argument::encoded_len).sum();
    let total = HEADER_SIZE + payload_len;
    if total > MAX_MESSAGE_SIZE {
        return Err(WaylandClientError::MessageTooLarge {
            size: total,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let header = MessageHeader {
        object_id,
        opcode,
        size: total as u16,
    };
    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&header.encode());
    for arg in args {
        arg.encode_into(&mut bytes);
    }
    debug_assert_eq!(bytes.len(), total);
    Ok(bytes)
}

// Argument readers for incoming events. Each advances the slice past the
// value it consumed, padding included.

pub fn read_u32(bytes: &mut &[u8]) -> Result<u32> {
    if bytes.len() < 4 {
        return Err(WaylandClientError::Malformed(
            "need 4 bytes for u32 argument".into(),
        ));
    }
    let val = NativeEndian::read_u32(bytes);
    *bytes = &bytes[4..];
    Ok(val)
}

pub fn read_i32(bytes: &mut &[u8]) -> Result<i32> {
    if bytes.len() < 4 {
        return Err(WaylandClientError::Malformed(
            "need 4 bytes for i32 argument".into(),
        ));
    }
    let val = NativeEndian::read_i32(bytes);
    *bytes = &bytes[4..];
    Ok(val)
}

pub fn read_string(bytes: &mut &[u8]) -> Result<String> {
    let len_with_nul = read_u32(bytes)? as usize;
    if len_with_nul == 0 {
        return Err(WaylandClientError::Malformed(
            "string argument with zero length".into(),
        ));
    }
    let padded = round_up_4(len_with_nul);
    if bytes.len() < padded {
        return Err(WaylandClientError::Malformed(format!(
            "need {} bytes for string argument, got {}",
            padded,
            bytes.len()
        )));
    }
    let text = std::str::from_utf8(&bytes[..len_with_nul - 1])
        .map_err(|e| WaylandClientError::Malformed(format!("string argument not UTF-8: {e}")))?
        .to_owned();
    *bytes = &bytes[padded..];
    Ok(text)
}
