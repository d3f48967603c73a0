// ── Bounds-checked wire readers ──
//
// Thin wrappers over `bytes::Buf` that turn the panicking accessors into
// `ProtocolError`s. Every length prefix is checked against the remaining
// buffer before anything is consumed.

use bytes::{Buf, Bytes};

use crate::error::ProtocolError;

pub(crate) fn read_u8(buf: &mut impl Buf, field: &'static str) -> Result<u8, ProtocolError> {
    if buf.remaining() < 1 {
        return Err(ProtocolError::BufferUnderflow { field });
    }
    Ok(buf.get_u8())
}

pub(crate) fn read_u16_le(buf: &mut impl Buf, field: &'static str) -> Result<u16, ProtocolError> {
    if buf.remaining() < 2 {
        return Err(ProtocolError::BufferUnderflow { field });
    }
    Ok(buf.get_u16_le())
}

/// Take exactly `len` bytes, failing if the buffer holds fewer.
pub(crate) fn read_bytes(buf: &mut impl Buf, len: usize) -> Result<Bytes, ProtocolError> {
    if len > buf.remaining() {
        return Err(ProtocolError::InvalidLength {
            declared: len,
            remaining: buf.remaining(),
        });
    }
    Ok(buf.copy_to_bytes(len))
}

/// Read a one-byte length prefix followed by that many bytes.
pub(crate) fn read_u8_prefixed(
    buf: &mut impl Buf,
    field: &'static str,
) -> Result<Bytes, ProtocolError> {
    let len = usize::from(read_u8(buf, field)?);
    read_bytes(buf, len)
}

/// Decode a string as UTF-8 or strict US-ASCII.
pub(crate) fn decode_string(
    raw: &[u8],
    utf8: bool,
    field: &'static str,
) -> Result<String, ProtocolError> {
    if !utf8 && !raw.is_ascii() {
        return Err(ProtocolError::InvalidEncoding {
            field,
            charset: "US-ASCII",
        });
    }
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidEncoding {
        field,
        charset: "UTF-8",
    })
}

/// Big-endian unsigned integer of up to eight bytes.
pub(crate) fn be_uint(raw: &[u8]) -> u64 {
    raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn read_bytes_rejects_overrun() {
        let mut buf: &[u8] = &[1, 2, 3];
        let err = read_bytes(&mut buf, 4).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidLength {
                declared: 4,
                remaining: 3
            }
        );
        // Nothing consumed on failure.
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn read_u16_is_little_endian() {
        let mut buf: &[u8] = &[0x34, 0x12];
        assert_eq!(read_u16_le(&mut buf, "len").unwrap(), 0x1234);
    }

    #[test]
    fn ascii_decoding_rejects_high_bytes() {
        assert!(decode_string("caf\u{e9}".as_bytes(), false, "realm").is_err());
        assert_eq!(
            decode_string("caf\u{e9}".as_bytes(), true, "realm").unwrap(),
            "caf\u{e9}"
        );
    }

    #[test]
    fn be_uint_folds_bytes() {
        assert_eq!(be_uint(&[0x50, 0x6f, 0x9a]), 0x0050_6f9a);
        assert_eq!(be_uint(&[]), 0);
    }
}
