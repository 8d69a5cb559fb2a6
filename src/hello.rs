//! Hello handshake elements.
//!
//! Hello elements are the one variant list where unrecognized type codes
//! are never an error: the handshake must tolerate elements from newer
//! protocol revisions, so unknown elements are always captured and kept.

use crate::encoding::{self, Encode, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

pub const HELLO_ELEM_VERSION_BITMAP: u16 = 1;

const HELLO_ELEM_HEADER_LEN: usize = 4;

/// One element of a hello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloElem {
    /// Bitmaps of protocol versions the sender supports. Bitmap `i` covers
    /// versions `32 * i` through `32 * i + 31`.
    VersionBitmap { bitmaps: Vec<u32> },
    /// An element of an unrecognized type, kept verbatim.
    Unknown { elem_type: u16, body: Vec<u8> },
}

impl HelloElem {
    /// The wire discriminator of this element.
    pub fn type_code(&self) -> u16 {
        match self {
            HelloElem::VersionBitmap { .. } => HELLO_ELEM_VERSION_BITMAP,
            HelloElem::Unknown { elem_type, .. } => *elem_type,
        }
    }

    /// Decode a single element and its trailing alignment padding. The
    /// declared length excludes the padding.
    pub fn decode_one(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let (code, length, mut body) = encoding::read_variant_header(r, "hello element")?;

        let elem = match code {
            HELLO_ELEM_VERSION_BITMAP => HelloElem::VersionBitmap {
                bitmaps: encoding::decode_all(&mut body, |r| Ok(r.read_u32::<BigEndian>()?))?,
            },
            code => {
                let rest = encoding::remaining(&body);
                HelloElem::Unknown { elem_type: code, body: encoding::read_bytes(&mut body, rest)? }
            }
        };

        encoding::read_pad(r, encoding::pad_to_8(length as usize))?;
        Ok(elem)
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>) -> Result<Vec<HelloElem>> {
        encoding::decode_all(r, HelloElem::decode_one)
    }
}

impl Encode for HelloElem {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        match self {
            HelloElem::VersionBitmap { bitmaps } => {
                for bitmap in bitmaps {
                    body.write_u32::<BigEndian>(*bitmap)?;
                }
            }
            HelloElem::Unknown { body: raw, .. } => body.extend_from_slice(raw),
        }

        let length = HELLO_ELEM_HEADER_LEN + body.len();
        let pad = encoding::pad_to_8(length);

        w.write_u16::<BigEndian>(self.type_code())?;
        w.write_u16::<BigEndian>(encoding::declared_len("hello element", length)?)?;
        w.extend_from_slice(&body);
        encoding::write_pad(w, pad);

        Ok(length + pad)
    }
}

/// The version negotiation message body: an element list running to the
/// end of the bounded message body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hello {
    pub elements: Vec<HelloElem>,
}

impl Hello {
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(Hello { elements: HelloElem::decode_list(r)? })
    }
}

impl Encode for Hello {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        encoding::encode_list(w, &self.elements)
    }
}
