//! Port queue configuration records.

use crate::encoding::{self, Encode, Result, UnknownPolicy, WireError};
use crate::port::PortNo;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Queue identifier.
pub type QueueId = u32;

/// All queues configured at the given port.
pub const QUEUE_ALL: QueueId = 0xffffffff;

pub const QUEUE_PROP_MIN_RATE: u16 = 1;
pub const QUEUE_PROP_MAX_RATE: u16 = 2;
pub const QUEUE_PROP_EXPERIMENTER: u16 = 0xffff;

/// Rate value meaning the rate is not configured.
pub const QUEUE_RATE_UNCONFIGURED: u16 = 0xffff;

const QUEUE_PROP_HEADER_LEN: usize = 8;
const PACKET_QUEUE_HEADER_LEN: usize = 16;

/// A property of a packet queue. Rates are in units of 1/10 of a percent;
/// values above 1000 mean the rate is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueProp {
    /// Guaranteed minimum data rate.
    MinRate { rate: u16 },
    /// Maximum data rate.
    MaxRate { rate: u16 },
    /// Experimenter queue property.
    Experimenter { experimenter: u32, data: Vec<u8> },
    /// A property whose type code has no known variant.
    Unknown { prop_type: u16, body: Vec<u8> },
}

impl QueueProp {
    /// The wire discriminator of this property.
    pub fn type_code(&self) -> u16 {
        match self {
            QueueProp::MinRate { .. } => QUEUE_PROP_MIN_RATE,
            QueueProp::MaxRate { .. } => QUEUE_PROP_MAX_RATE,
            QueueProp::Experimenter { .. } => QUEUE_PROP_EXPERIMENTER,
            QueueProp::Unknown { prop_type, .. } => *prop_type,
        }
    }

    /// Decode a single property record. The queue property header is 8
    /// bytes (type, length, 4 reserved), unlike the common 4-byte variant
    /// header.
    pub fn decode_one(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let code = r.read_u16::<BigEndian>()?;
        let length = r.read_u16::<BigEndian>()? as usize;
        encoding::read_pad(r, 4)?;

        let mut body =
            encoding::take(r, encoding::body_len("queue property", length, QUEUE_PROP_HEADER_LEN)?)?;

        let prop = match code {
            QUEUE_PROP_MIN_RATE => {
                let rate = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 6)?;
                QueueProp::MinRate { rate }
            }
            QUEUE_PROP_MAX_RATE => {
                let rate = body.read_u16::<BigEndian>()?;
                encoding::read_pad(&mut body, 6)?;
                QueueProp::MaxRate { rate }
            }
            QUEUE_PROP_EXPERIMENTER => {
                let experimenter = body.read_u32::<BigEndian>()?;
                encoding::read_pad(&mut body, 4)?;
                let rest = encoding::remaining(&body);
                QueueProp::Experimenter { experimenter, data: encoding::read_bytes(&mut body, rest)? }
            }
            code => match policy {
                UnknownPolicy::Reject => {
                    return Err(WireError::UnknownVariant { kind: "queue property", code })
                }
                UnknownPolicy::Keep => {
                    let rest = encoding::remaining(&body);
                    QueueProp::Unknown { prop_type: code, body: encoding::read_bytes(&mut body, rest)? }
                }
            },
        };

        Ok(prop)
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<QueueProp>> {
        encoding::decode_all(r, |r| QueueProp::decode_one(r, policy))
    }
}

impl Encode for QueueProp {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        match self {
            QueueProp::MinRate { rate } | QueueProp::MaxRate { rate } => {
                write_header(w, self.type_code(), 16)?;
                w.write_u16::<BigEndian>(*rate)?;
                encoding::write_pad(w, 6);
                Ok(16)
            }
            QueueProp::Experimenter { experimenter, data } => {
                let total = 16 + data.len();
                write_header(w, QUEUE_PROP_EXPERIMENTER, encoding::declared_len("queue property", total)?)?;
                w.write_u32::<BigEndian>(*experimenter)?;
                encoding::write_pad(w, 4);
                w.extend_from_slice(data);
                Ok(total)
            }
            QueueProp::Unknown { prop_type, body } => {
                let total = QUEUE_PROP_HEADER_LEN + body.len();
                write_header(w, *prop_type, encoding::declared_len("queue property", total)?)?;
                w.extend_from_slice(body);
                Ok(total)
            }
        }
    }
}

fn write_header(w: &mut Vec<u8>, code: u16, len: u16) -> Result<()> {
    w.write_u16::<BigEndian>(code)?;
    w.write_u16::<BigEndian>(len)?;
    encoding::write_pad(w, 4);
    Ok(())
}

/// A single configured queue attached to a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketQueue {
    pub queue_id: QueueId,
    pub port: PortNo,
    pub properties: Vec<QueueProp>,
}

impl PacketQueue {
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let queue_id = r.read_u32::<BigEndian>()?;
        let port = r.read_u32::<BigEndian>()?;
        let length = r.read_u16::<BigEndian>()? as usize;
        encoding::read_pad(r, 6)?;

        let mut body =
            encoding::take(r, encoding::body_len("packet queue", length, PACKET_QUEUE_HEADER_LEN)?)?;
        let properties = QueueProp::decode_list(&mut body, policy)?;

        Ok(PacketQueue { queue_id, port, properties })
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<PacketQueue>> {
        encoding::decode_all(r, |r| PacketQueue::decode(r, policy))
    }
}

impl Encode for PacketQueue {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        encoding::encode_list(&mut body, &self.properties)?;

        let total = PACKET_QUEUE_HEADER_LEN + body.len();
        w.write_u32::<BigEndian>(self.queue_id)?;
        w.write_u32::<BigEndian>(self.port)?;
        w.write_u16::<BigEndian>(encoding::declared_len("packet queue", total)?)?;
        encoding::write_pad(w, 6);
        w.extend_from_slice(&body);

        Ok(total)
    }
}

/// Ask a switch for the queues configured at a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueGetConfigRequest {
    pub port: PortNo,
}

impl QueueGetConfigRequest {
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let port = r.read_u32::<BigEndian>()?;
        encoding::read_pad(r, 4)?;
        Ok(QueueGetConfigRequest { port })
    }
}

impl Encode for QueueGetConfigRequest {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        w.write_u32::<BigEndian>(self.port)?;
        encoding::write_pad(w, 4);
        Ok(8)
    }
}

/// The queue configuration of a port; the queue list runs to the end of
/// the bounded message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueGetConfigReply {
    pub port: PortNo,
    pub queues: Vec<PacketQueue>,
}

impl QueueGetConfigReply {
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let port = r.read_u32::<BigEndian>()?;
        encoding::read_pad(r, 4)?;
        let queues = PacketQueue::decode_list(r, policy)?;
        Ok(QueueGetConfigReply { port, queues })
    }
}

impl Encode for QueueGetConfigReply {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        w.write_u32::<BigEndian>(self.port)?;
        encoding::write_pad(w, 4);
        let n = encoding::encode_list(w, &self.queues)?;
        Ok(8 + n)
    }
}
