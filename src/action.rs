//! OpenFlow 1.3 actions: a type-discriminated variant record set.
//!
//! Every action is encoded as a `(type, length)` header followed by a body
//! padded so the total length is a multiple of eight. The decode `match` on
//! the type code is the variant registry; unrecognized codes are either
//! rejected or captured as [`Action::Unknown`] depending on the caller's
//! [`UnknownPolicy`].

use crate::encoding::{self, Encode, Result, UnknownPolicy, WireError};
use crate::oxm::Oxm;
use crate::port::PortNo;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

pub const ACTION_OUTPUT: u16 = 0;
pub const ACTION_COPY_TTL_OUT: u16 = 11;
pub const ACTION_COPY_TTL_IN: u16 = 12;
pub const ACTION_SET_MPLS_TTL: u16 = 15;
pub const ACTION_DEC_MPLS_TTL: u16 = 16;
pub const ACTION_PUSH_VLAN: u16 = 17;
pub const ACTION_POP_VLAN: u16 = 18;
pub const ACTION_PUSH_MPLS: u16 = 19;
pub const ACTION_POP_MPLS: u16 = 20;
pub const ACTION_SET_QUEUE: u16 = 21;
pub const ACTION_GROUP: u16 = 22;
pub const ACTION_SET_NW_TTL: u16 = 23;
pub const ACTION_DEC_NW_TTL: u16 = 24;
pub const ACTION_SET_FIELD: u16 = 25;
pub const ACTION_PUSH_PBB: u16 = 26;
pub const ACTION_POP_PBB: u16 = 27;
pub const ACTION_EXPERIMENTER: u16 = 0xffff;

/// Maximum number of packet bytes an output action may send to the
/// controller.
pub const CONTENT_LEN_MAX: u16 = 0xffe5;
/// No buffering: the complete packet goes to the controller.
pub const CONTENT_LEN_NO_BUFFER: u16 = 0xffff;

const ACTION_HEADER_LEN: usize = 4;

/// A single flow action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Output the packet to a switch port. When the port is
    /// [`crate::port::PORT_CONTROLLER`], `max_len` bounds the bytes sent.
    Output { port: PortNo, max_len: u16 },
    /// Copy the TTL from the next-to-outermost header outwards.
    CopyTtlOut,
    /// Copy the TTL from the outermost header inwards.
    CopyTtlIn,
    /// Replace the MPLS TTL.
    SetMplsTtl { ttl: u8 },
    /// Decrement the MPLS TTL.
    DecMplsTtl,
    /// Push a new VLAN tag with the given Ethertype.
    PushVlan { ether_type: u16 },
    /// Pop the outermost VLAN tag.
    PopVlan,
    /// Push a new MPLS shim header.
    PushMpls { ether_type: u16 },
    /// Pop the outermost MPLS tag or shim header; `ether_type` is the type
    /// of the payload.
    PopMpls { ether_type: u16 },
    /// Queue the packet on an already-configured port queue.
    SetQueue { queue: u32 },
    /// Process the packet through a group table entry.
    Group { group: u32 },
    /// Replace the IPv4 TTL or IPv6 hop limit.
    SetNwTtl { ttl: u8 },
    /// Decrement the IPv4 TTL or IPv6 hop limit.
    DecNwTtl,
    /// Set a packet header field, described by a single OXM entry.
    SetField(Oxm),
    /// Push a new PBB service instance header.
    PushPbb { ether_type: u16 },
    /// Pop the outermost PBB service instance header.
    PopPbb,
    /// Experimenter action.
    Experimenter { experimenter: u32 },
    /// An action whose type code has no known variant; `body` holds the raw
    /// record body (declared length minus the 4-byte header).
    Unknown { action_type: u16, body: Vec<u8> },
}

impl Action {
    /// The wire discriminator of this action.
    pub fn type_code(&self) -> u16 {
        match self {
            Action::Output { .. } => ACTION_OUTPUT,
            Action::CopyTtlOut => ACTION_COPY_TTL_OUT,
            Action::CopyTtlIn => ACTION_COPY_TTL_IN,
            Action::SetMplsTtl { .. } => ACTION_SET_MPLS_TTL,
            Action::DecMplsTtl => ACTION_DEC_MPLS_TTL,
            Action::PushVlan { .. } => ACTION_PUSH_VLAN,
            Action::PopVlan => ACTION_POP_VLAN,
            Action::PushMpls { .. } => ACTION_PUSH_MPLS,
            Action::PopMpls { .. } => ACTION_POP_MPLS,
            Action::SetQueue { .. } => ACTION_SET_QUEUE,
            Action::Group { .. } => ACTION_GROUP,
            Action::SetNwTtl { .. } => ACTION_SET_NW_TTL,
            Action::DecNwTtl => ACTION_DEC_NW_TTL,
            Action::SetField(_) => ACTION_SET_FIELD,
            Action::PushPbb { .. } => ACTION_PUSH_PBB,
            Action::PopPbb => ACTION_POP_PBB,
            Action::Experimenter { .. } => ACTION_EXPERIMENTER,
            Action::Unknown { action_type, .. } => *action_type,
        }
    }

    /// Decode a single action record.
    pub fn decode_one(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let (code, _, mut body) = encoding::read_variant_header(r, "action")?;

        let action = match code {
            ACTION_OUTPUT => {
                let port = body.read_u32::<BigEndian>()?;
                let max_len = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 6)?;
                Action::Output { port, max_len }
            }
            ACTION_COPY_TTL_OUT => {
                encoding::read_pad(&mut body, 4)?;
                Action::CopyTtlOut
            }
            ACTION_COPY_TTL_IN => {
                encoding::read_pad(&mut body, 4)?;
                Action::CopyTtlIn
            }
            ACTION_SET_MPLS_TTL => {
                let ttl = body.read_u8()?;
                encoding::read_pad(&mut body, 3)?;
                Action::SetMplsTtl { ttl }
            }
            ACTION_DEC_MPLS_TTL => {
                encoding::read_pad(&mut body, 4)?;
                Action::DecMplsTtl
            }
            ACTION_PUSH_VLAN => {
                let ether_type = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 2)?;
                Action::PushVlan { ether_type }
            }
            ACTION_POP_VLAN => {
                encoding::read_pad(&mut body, 4)?;
                Action::PopVlan
            }
            ACTION_PUSH_MPLS => {
                let ether_type = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 2)?;
                Action::PushMpls { ether_type }
            }
            ACTION_POP_MPLS => {
                let ether_type = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 2)?;
                Action::PopMpls { ether_type }
            }
            ACTION_SET_QUEUE => Action::SetQueue { queue: body.read_u32::<BigEndian>()? },
            ACTION_GROUP => Action::Group { group: body.read_u32::<BigEndian>()? },
            ACTION_SET_NW_TTL => {
                let ttl = body.read_u8()?;
                encoding::read_pad(&mut body, 3)?;
                Action::SetNwTtl { ttl }
            }
            ACTION_DEC_NW_TTL => {
                encoding::read_pad(&mut body, 4)?;
                Action::DecNwTtl
            }
            ACTION_SET_FIELD => {
                let field = Oxm::decode(&mut body)?;
                // The rest of the body is alignment padding counted in the
                // action length.
                let rest = encoding::remaining(&body);
                encoding::read_pad(&mut body, rest)?;
                Action::SetField(field)
            }
            ACTION_PUSH_PBB => {
                let ether_type = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 2)?;
                Action::PushPbb { ether_type }
            }
            ACTION_POP_PBB => {
                encoding::read_pad(&mut body, 4)?;
                Action::PopPbb
            }
            ACTION_EXPERIMENTER => {
                Action::Experimenter { experimenter: body.read_u32::<BigEndian>()? }
            }
            code => match policy {
                UnknownPolicy::Reject => {
                    return Err(WireError::UnknownVariant { kind: "action", code })
                }
                UnknownPolicy::Keep => {
                    let rest = encoding::remaining(&body);
                    Action::Unknown { action_type: code, body: encoding::read_bytes(&mut body, rest)? }
                }
            },
        };

        Ok(action)
    }

    /// Decode actions back to back until the bounded source is exhausted.
    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<Action>> {
        encoding::decode_all(r, |r| Action::decode_one(r, policy))
    }
}

impl Encode for Action {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        match self {
            Action::Output { port, max_len } => {
                write_header(w, ACTION_OUTPUT, 16)?;
                w.write_u32::<BigEndian>(*port)?;
                w.write_u16::<BigEndian>(*max_len)?;
                encoding::write_pad(w, 6);
                Ok(16)
            }
            Action::CopyTtlOut => encode_empty(w, ACTION_COPY_TTL_OUT),
            Action::CopyTtlIn => encode_empty(w, ACTION_COPY_TTL_IN),
            Action::SetMplsTtl { ttl } => encode_ttl(w, ACTION_SET_MPLS_TTL, *ttl),
            Action::DecMplsTtl => encode_empty(w, ACTION_DEC_MPLS_TTL),
            Action::PushVlan { ether_type } => encode_ether(w, ACTION_PUSH_VLAN, *ether_type),
            Action::PopVlan => encode_empty(w, ACTION_POP_VLAN),
            Action::PushMpls { ether_type } => encode_ether(w, ACTION_PUSH_MPLS, *ether_type),
            Action::PopMpls { ether_type } => encode_ether(w, ACTION_POP_MPLS, *ether_type),
            Action::SetQueue { queue } => encode_word(w, ACTION_SET_QUEUE, *queue),
            Action::Group { group } => encode_word(w, ACTION_GROUP, *group),
            Action::SetNwTtl { ttl } => encode_ttl(w, ACTION_SET_NW_TTL, *ttl),
            Action::DecNwTtl => encode_empty(w, ACTION_DEC_NW_TTL),
            Action::SetField(field) => {
                let mut body = Vec::new();
                field.encode(&mut body)?;

                // The declared length of a set-field action includes the
                // padding that aligns it to 64 bits.
                let unpadded = ACTION_HEADER_LEN + body.len();
                let pad = encoding::pad_to_8(unpadded);
                let total = unpadded + pad;

                write_header(w, ACTION_SET_FIELD, encoding::declared_len("action", total)?)?;
                w.extend_from_slice(&body);
                encoding::write_pad(w, pad);
                Ok(total)
            }
            Action::PushPbb { ether_type } => encode_ether(w, ACTION_PUSH_PBB, *ether_type),
            Action::PopPbb => encode_empty(w, ACTION_POP_PBB),
            Action::Experimenter { experimenter } => {
                encode_word(w, ACTION_EXPERIMENTER, *experimenter)
            }
            Action::Unknown { action_type, body } => {
                let total = ACTION_HEADER_LEN + body.len();
                write_header(w, *action_type, encoding::declared_len("action", total)?)?;
                w.extend_from_slice(body);
                Ok(total)
            }
        }
    }
}

fn write_header(w: &mut Vec<u8>, code: u16, len: u16) -> Result<()> {
    w.write_u16::<BigEndian>(code)?;
    w.write_u16::<BigEndian>(len)?;
    Ok(())
}

fn encode_empty(w: &mut Vec<u8>, code: u16) -> Result<usize> {
    write_header(w, code, 8)?;
    encoding::write_pad(w, 4);
    Ok(8)
}

fn encode_ttl(w: &mut Vec<u8>, code: u16, ttl: u8) -> Result<usize> {
    write_header(w, code, 8)?;
    w.write_u8(ttl)?;
    encoding::write_pad(w, 3);
    Ok(8)
}

fn encode_ether(w: &mut Vec<u8>, code: u16, ether_type: u16) -> Result<usize> {
    write_header(w, code, 8)?;
    w.write_u16::<BigEndian>(ether_type)?;
    encoding::write_pad(w, 2);
    Ok(8)
}

fn encode_word(w: &mut Vec<u8>, code: u16, word: u32) -> Result<usize> {
    write_header(w, code, 8)?;
    w.write_u32::<BigEndian>(word)?;
    Ok(8)
}
