//! OpenFlow Extensible Match: the OXM TLV record and the `Match` container.
//!
//! An OXM entry is a compact class/field/length/value tuple where the low
//! bit of the raw field byte signals the presence of a wildcard mask. The
//! `Match` container wraps a list of entries in a length-prefixed header
//! padded to a 64-bit boundary.

use crate::encoding::{self, Encode, Result, WireError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Backward compatibility with NXM.
pub const XM_CLASS_NICIRA_0: u16 = 0x0000;
/// Backward compatibility with NXM.
pub const XM_CLASS_NICIRA_1: u16 = 0x0001;
/// The basic set of OpenFlow match fields.
pub const XM_CLASS_OPENFLOW_BASIC: u16 = 0x8000;
/// Experimenter matches.
pub const XM_CLASS_EXPERIMENTER: u16 = 0xffff;

/// OpenFlow 1.1 match type; deprecated.
pub const MATCH_TYPE_STANDARD: u16 = 0;
/// OpenFlow Extensible Match type.
pub const MATCH_TYPE_OXM: u16 = 1;

/// Match field codes of the OpenFlow-basic class (the 7-bit field id).
pub mod xm_field {
    /// Switch input port.
    pub const IN_PORT: u8 = 0;
    /// Switch physical input port.
    pub const IN_PHY_PORT: u8 = 1;
    /// Metadata passed between tables.
    pub const METADATA: u8 = 2;
    /// Ethernet destination address.
    pub const ETH_DST: u8 = 3;
    /// Ethernet source address.
    pub const ETH_SRC: u8 = 4;
    /// Ethernet frame type.
    pub const ETH_TYPE: u8 = 5;
    /// VLAN identifier.
    pub const VLAN_VID: u8 = 6;
    /// VLAN priority.
    pub const VLAN_PCP: u8 = 7;
    /// IP DSCP (6 bits in ToS field).
    pub const IP_DSCP: u8 = 8;
    /// IP ECN (2 bits in ToS field).
    pub const IP_ECN: u8 = 9;
    /// IP protocol.
    pub const IP_PROTO: u8 = 10;
    /// IPv4 source address.
    pub const IPV4_SRC: u8 = 11;
    /// IPv4 destination address.
    pub const IPV4_DST: u8 = 12;
    /// TCP source port.
    pub const TCP_SRC: u8 = 13;
    /// TCP destination port.
    pub const TCP_DST: u8 = 14;
    /// UDP source port.
    pub const UDP_SRC: u8 = 15;
    /// UDP destination port.
    pub const UDP_DST: u8 = 16;
    /// SCTP source port.
    pub const SCTP_SRC: u8 = 17;
    /// SCTP destination port.
    pub const SCTP_DST: u8 = 18;
    /// ICMPv4 type.
    pub const ICMPV4_TYPE: u8 = 19;
    /// ICMPv4 code.
    pub const ICMPV4_CODE: u8 = 20;
    /// ARP opcode.
    pub const ARP_OP: u8 = 21;
    /// ARP source IPv4 address.
    pub const ARP_SPA: u8 = 22;
    /// ARP target IPv4 address.
    pub const ARP_TPA: u8 = 23;
    /// ARP source hardware address.
    pub const ARP_SHA: u8 = 24;
    /// ARP target hardware address.
    pub const ARP_THA: u8 = 25;
    /// IPv6 source address.
    pub const IPV6_SRC: u8 = 26;
    /// IPv6 destination address.
    pub const IPV6_DST: u8 = 27;
    /// IPv6 flow label.
    pub const IPV6_FLABEL: u8 = 28;
    /// ICMPv6 type.
    pub const ICMPV6_TYPE: u8 = 29;
    /// ICMPv6 code.
    pub const ICMPV6_CODE: u8 = 30;
    /// Target address for neighbour discovery.
    pub const IPV6_ND_TARGET: u8 = 31;
    /// Source link-layer for neighbour discovery.
    pub const IPV6_ND_SLL: u8 = 32;
    /// Target link-layer for neighbour discovery.
    pub const IPV6_ND_TLL: u8 = 33;
    /// MPLS label.
    pub const MPLS_LABEL: u8 = 34;
    /// MPLS traffic class.
    pub const MPLS_TC: u8 = 35;
    /// MPLS bottom-of-stack bit.
    pub const MPLS_BOS: u8 = 36;
    /// PBB I-SID.
    pub const PBB_ISID: u8 = 37;
    /// Logical port metadata.
    pub const TUNNEL_ID: u8 = 38;
    /// IPv6 extension header pseudo-field.
    pub const IPV6_EXTHDR: u8 = 39;
}

/// A single OXM TLV entry.
///
/// `field` holds the 7-bit field code; the wire-level mask-presence bit is
/// derived from `mask` on encode and stripped on decode. When a mask is
/// present it has exactly the length of the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Oxm {
    pub class: u16,
    pub field: u8,
    pub value: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

impl Oxm {
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let class = r.read_u16::<BigEndian>()?;
        let raw_field = r.read_u8()?;
        let length = r.read_u8()? as usize;

        let has_mask = raw_field & 1 == 1;
        let field = raw_field >> 1;

        if has_mask && length % 2 != 0 {
            return Err(WireError::BadLength(format!(
                "oxm field {field:#04x}: masked payload length {length} is not even"
            )));
        }

        let mut value = encoding::read_bytes(r, length)?;
        let mask = if has_mask {
            Some(value.split_off(length / 2))
        } else {
            None
        };

        Ok(Oxm { class, field, value, mask })
    }

    /// Value as a big-endian u32, when it is exactly four bytes.
    pub fn value_u32(&self) -> Option<u32> {
        let v: &[u8; 4] = self.value.as_slice().try_into().ok()?;
        Some(u32::from_be_bytes(*v))
    }

    /// Value as a big-endian u16, when it is exactly two bytes.
    pub fn value_u16(&self) -> Option<u16> {
        let v: &[u8; 2] = self.value.as_slice().try_into().ok()?;
        Some(u16::from_be_bytes(*v))
    }

    /// Value as a single byte, when it is exactly one.
    pub fn value_u8(&self) -> Option<u8> {
        match self.value.as_slice() {
            [b] => Some(*b),
            _ => None,
        }
    }
}

impl Encode for Oxm {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mask = self.mask.as_deref().unwrap_or(&[]);
        let raw_field = (self.field << 1) | u8::from(!mask.is_empty());

        let payload = self.value.len() + mask.len();
        let payload = u8::try_from(payload).map_err(|_| {
            WireError::BadLength(format!(
                "oxm field {:#04x}: payload length {payload} does not fit the u8 length field",
                self.field
            ))
        })?;

        w.write_u16::<BigEndian>(self.class)?;
        w.write_u8(raw_field)?;
        w.write_u8(payload)?;
        w.extend_from_slice(&self.value);
        w.extend_from_slice(mask);

        Ok(4 + self.value.len() + mask.len())
    }
}

/// Decode OXM entries back to back while at least a minimum-size record
/// (8 bytes) remains in the bounded source.
pub fn decode_oxm_list(r: &mut Cursor<&[u8]>) -> Result<Vec<Oxm>> {
    let mut fields = Vec::new();
    while encoding::remaining(r) > 7 {
        fields.push(Oxm::decode(r)?);
    }
    Ok(fields)
}

/// Fields to match against flows: a length-prefixed container of OXM
/// entries, padded to a 64-bit boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub match_type: u16,
    pub fields: Vec<Oxm>,
}

impl Match {
    /// First entry with the given field code, if any.
    pub fn field(&self, code: u8) -> Option<&Oxm> {
        self.fields.iter().find(|xm| xm.field == code)
    }

    /// Reads the header and exactly `declared_length - 4` body bytes. The
    /// trailing alignment padding is not consumed here: the wire format
    /// excludes it from the declared length, and the enclosing record
    /// accounts for it through its own length header.
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let match_type = r.read_u16::<BigEndian>()?;
        let length = r.read_u16::<BigEndian>()? as usize;

        let mut body = encoding::take(r, encoding::body_len("match", length, 4)?)?;
        let fields = decode_oxm_list(&mut body)?;

        Ok(Match { match_type, fields })
    }
}

impl Encode for Match {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        encoding::encode_list(&mut body, &self.fields)?;

        // Declared length covers header and entries but not the padding.
        let length = 4 + body.len();
        let pad = encoding::pad_to_8(length);

        w.write_u16::<BigEndian>(self.match_type)?;
        w.write_u16::<BigEndian>(encoding::declared_len("match", length)?)?;
        w.extend_from_slice(&body);
        encoding::write_pad(w, pad);

        Ok(length + pad)
    }
}
