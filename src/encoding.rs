//! Field codec primitives shared by every record type.
//!
//! All multi-byte integers are big-endian. Decoding reads from a
//! `Cursor<&[u8]>` so byte counts and record boundaries fall out of the
//! cursor position; encoding appends to a `Vec<u8>` and returns the number
//! of bytes written. Variable-length records bound their body with [`take`]
//! and scan element lists with [`decode_all`].

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read};

pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Short read/write: the stream ended before the expected byte count.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// A discriminator with no known variant, under [`UnknownPolicy::Reject`].
    #[error("unknown {kind} type: {code:#06x}")]
    UnknownVariant { kind: &'static str, code: u16 },
    /// A declared length that does not leave a clean record boundary.
    #[error("bad length: {0}")]
    BadLength(String),
}

/// How a list decoder treats a record whose discriminator has no known
/// variant. Every variant record in this protocol carries its own length
/// header, so a `Keep` scan steps over the body without desynchronizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Abort the list decode with [`WireError::UnknownVariant`].
    Reject,
    /// Capture the record as an opaque `Unknown` variant and continue.
    Keep,
}

/// Serialization into a byte sink. Fields are written strictly in wire
/// order; the return value is the number of bytes appended.
pub trait Encode {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// Append `n` zero bytes of alignment/reserved padding.
pub fn write_pad(w: &mut Vec<u8>, n: usize) -> usize {
    w.resize(w.len() + n, 0);
    n
}

/// Consume `n` padding bytes; their content is ignored.
pub fn read_pad(r: &mut Cursor<&[u8]>, mut n: usize) -> Result<()> {
    let mut buf = [0u8; 8];
    while n > 0 {
        let chunk = n.min(buf.len());
        r.read_exact(&mut buf[..chunk])?;
        n -= chunk;
    }
    Ok(())
}

/// Bytes left before the end of the (bounded) source.
pub fn remaining(r: &Cursor<&[u8]>) -> usize {
    r.get_ref().len().saturating_sub(r.position() as usize)
}

/// Read exactly `n` bytes into a fresh buffer.
pub fn read_bytes(r: &mut Cursor<&[u8]>, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Split off a bounded source over exactly the next `n` bytes, advancing
/// the outer cursor past them. A nested decode over the sub-cursor cannot
/// read beyond its record boundary.
pub fn take<'a>(r: &mut Cursor<&'a [u8]>, n: usize) -> Result<Cursor<&'a [u8]>> {
    let buf = *r.get_ref();
    let start = (r.position() as usize).min(buf.len());
    if buf.len() - start < n {
        return Err(WireError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("record body: need {} bytes, {} available", n, buf.len() - start),
        )));
    }
    r.set_position((start + n) as u64);
    Ok(Cursor::new(&buf[start..start + n]))
}

/// Body size of a length-prefixed record: `declared - header`, where the
/// header constant must match the literal header encoding byte for byte.
pub fn body_len(kind: &'static str, declared: usize, header: usize) -> Result<usize> {
    declared.checked_sub(header).ok_or_else(|| {
        WireError::BadLength(format!(
            "{kind}: declared length {declared} shorter than {header}-byte header"
        ))
    })
}

/// Declared length of a record being encoded. The total must fit the u16
/// length slot; a silently truncated length would corrupt every sibling
/// record behind it.
pub fn declared_len(kind: &'static str, total: usize) -> Result<u16> {
    u16::try_from(total).map_err(|_| {
        WireError::BadLength(format!(
            "{kind}: encoded length {total} does not fit the u16 length field"
        ))
    })
}

/// Read a `(type, length)` variant record header and bound a sub-cursor to
/// the declared body (`length - 4`). The discriminator is consumed here;
/// variant body decoders must not re-read it.
pub fn read_variant_header<'a>(
    r: &mut Cursor<&'a [u8]>,
    kind: &'static str,
) -> Result<(u16, u16, Cursor<&'a [u8]>)> {
    let code = r.read_u16::<BigEndian>()?;
    let length = r.read_u16::<BigEndian>()?;
    let body = take(r, body_len(kind, length as usize, 4)?)?;
    Ok((code, length, body))
}

/// Decode elements back to back until the bounded source is exhausted.
/// Zero bytes remaining between elements terminates the list cleanly;
/// running out mid-element surfaces the element decoder's error.
pub fn decode_all<T, F>(r: &mut Cursor<&[u8]>, mut element: F) -> Result<Vec<T>>
where
    F: FnMut(&mut Cursor<&[u8]>) -> Result<T>,
{
    let mut out = Vec::new();
    while remaining(r) > 0 {
        out.push(element(r)?);
    }
    Ok(out)
}

/// Concatenate element encodings with no separators or count prefix.
pub fn encode_list<T: Encode>(w: &mut Vec<u8>, items: &[T]) -> Result<usize> {
    let mut n = 0;
    for item in items {
        n += item.encode(w)?;
    }
    Ok(n)
}

/// Zero bytes needed to align `len` to the next 8-byte boundary.
pub fn pad_to_8(len: usize) -> usize {
    (8 - len % 8) % 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_bounds_sub_cursor() {
        let data = [1u8, 2, 3, 4, 5];
        let mut r = Cursor::new(&data[..]);
        let mut sub = take(&mut r, 3).expect("take");
        assert_eq!(read_bytes(&mut sub, 3).expect("read"), vec![1, 2, 3]);
        assert!(read_bytes(&mut sub, 1).is_err());
        assert_eq!(remaining(&r), 2);
    }

    #[test]
    fn take_past_end_is_short_read() {
        let data = [1u8, 2];
        let mut r = Cursor::new(&data[..]);
        match take(&mut r, 3) {
            Err(WireError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected short read, got {other:?}"),
        }
    }

    #[test]
    fn pad_roundtrip_ignores_content() {
        let mut w = Vec::new();
        assert_eq!(write_pad(&mut w, 6), 6);
        assert_eq!(w, vec![0; 6]);

        // Non-zero padding bytes are consumed without complaint.
        let data = [0xffu8; 6];
        let mut r = Cursor::new(&data[..]);
        read_pad(&mut r, 6).expect("read_pad");
        assert_eq!(remaining(&r), 0);
    }

    #[test]
    fn pad_to_8_alignment() {
        assert_eq!(pad_to_8(0), 0);
        assert_eq!(pad_to_8(7), 1);
        assert_eq!(pad_to_8(8), 0);
        assert_eq!(pad_to_8(12), 4);
    }

    #[test]
    fn decode_all_clean_eof_vs_mid_element() {
        // Two complete u16 elements: clean termination.
        let data = [0x00u8, 0x01, 0x00, 0x02];
        let mut r = Cursor::new(&data[..]);
        let out = decode_all(&mut r, |r| Ok(r.read_u16::<BigEndian>()?)).expect("decode_all");
        assert_eq!(out, vec![1, 2]);

        // A trailing odd byte fails mid-element.
        let data = [0x00u8, 0x01, 0x00];
        let mut r = Cursor::new(&data[..]);
        assert!(decode_all(&mut r, |r| Ok(r.read_u16::<BigEndian>()?)).is_err());
    }

    #[test]
    fn declared_len_rejects_overflow() {
        assert_eq!(declared_len("bucket", 40).expect("declared_len"), 40);
        assert_eq!(declared_len("bucket", 65535).expect("declared_len"), 65535);
        assert!(matches!(declared_len("bucket", 65536), Err(WireError::BadLength(_))));
    }

    #[test]
    fn body_len_rejects_undersized_declared_length() {
        assert_eq!(body_len("bucket", 40, 16).expect("body_len"), 24);
        assert!(matches!(body_len("bucket", 12, 16), Err(WireError::BadLength(_))));
    }
}
