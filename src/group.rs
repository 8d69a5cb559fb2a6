//! Group table modification and statistics records.

use crate::action::Action;
use crate::encoding::{self, Encode, Result, UnknownPolicy};
use crate::port::PortNo;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

pub const GROUP_COMMAND_ADD: u16 = 0;
pub const GROUP_COMMAND_MODIFY: u16 = 1;
pub const GROUP_COMMAND_DELETE: u16 = 2;

pub const GROUP_TYPE_ALL: u8 = 0;
pub const GROUP_TYPE_SELECT: u8 = 1;
pub const GROUP_TYPE_INDIRECT: u8 = 2;
pub const GROUP_TYPE_FAST_FAILOVER: u8 = 3;

/// Group identifier.
pub type GroupId = u32;

/// Last usable group number.
pub const GROUP_MAX: GroupId = 0xffffff00;
/// All groups, for delete commands and stats requests.
pub const GROUP_ALL: GroupId = 0xfffffffc;
/// Wildcard group in flow stats requests and deletes.
pub const GROUP_ANY: GroupId = 0xffffffff;

const BUCKET_HEADER_LEN: usize = 16;
const GROUP_STATS_HEADER_LEN: usize = 40;
const GROUP_DESC_STATS_HEADER_LEN: usize = 8;

/// A weighted list of actions inside a group entry.
///
/// `weight` matters only for select groups; `watch_port` and `watch_group`
/// only for fast failover groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub weight: u16,
    pub watch_port: PortNo,
    pub watch_group: GroupId,
    pub actions: Vec<Action>,
}

impl Bucket {
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let length = r.read_u16::<BigEndian>()? as usize;
        let weight = r.read_u16::<BigEndian>()?;
        let watch_port = r.read_u32::<BigEndian>()?;
        let watch_group = r.read_u32::<BigEndian>()?;
        encoding::read_pad(r, 4)?;

        let mut body = encoding::take(r, encoding::body_len("bucket", length, BUCKET_HEADER_LEN)?)?;
        let actions = Action::decode_list(&mut body, policy)?;

        Ok(Bucket { weight, watch_port, watch_group, actions })
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<Bucket>> {
        encoding::decode_all(r, |r| Bucket::decode(r, policy))
    }
}

impl Encode for Bucket {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        encoding::encode_list(&mut body, &self.actions)?;

        let total = BUCKET_HEADER_LEN + body.len();
        w.write_u16::<BigEndian>(encoding::declared_len("bucket", total)?)?;
        w.write_u16::<BigEndian>(self.weight)?;
        w.write_u32::<BigEndian>(self.watch_port)?;
        w.write_u32::<BigEndian>(self.watch_group)?;
        encoding::write_pad(w, 4);
        w.extend_from_slice(&body);

        Ok(total)
    }
}

/// Add, modify or delete a group table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMod {
    pub command: u16,
    pub group_type: u8,
    pub group: GroupId,
    pub buckets: Vec<Bucket>,
}

impl GroupMod {
    /// Decode from a source bounded to the message body; the bucket list
    /// runs to its end.
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let command = r.read_u16::<BigEndian>()?;
        let group_type = r.read_u8()?;
        encoding::read_pad(r, 1)?;
        let group = r.read_u32::<BigEndian>()?;
        let buckets = Bucket::decode_list(r, policy)?;

        Ok(GroupMod { command, group_type, group, buckets })
    }
}

impl Encode for GroupMod {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        w.write_u16::<BigEndian>(self.command)?;
        w.write_u8(self.group_type)?;
        encoding::write_pad(w, 1);
        w.write_u32::<BigEndian>(self.group)?;
        let n = encoding::encode_list(w, &self.buckets)?;
        Ok(8 + n)
    }
}

/// Per-bucket packet and byte counters inside group statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketCounter {
    pub packet_count: u64,
    pub byte_count: u64,
}

impl BucketCounter {
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let packet_count = r.read_u64::<BigEndian>()?;
        let byte_count = r.read_u64::<BigEndian>()?;
        Ok(BucketCounter { packet_count, byte_count })
    }
}

impl Encode for BucketCounter {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        w.write_u64::<BigEndian>(self.packet_count)?;
        w.write_u64::<BigEndian>(self.byte_count)?;
        Ok(16)
    }
}

/// Statistics of a single group, one element of a group stats reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStats {
    pub group: GroupId,
    pub ref_count: u32,
    pub packet_count: u64,
    pub byte_count: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub bucket_stats: Vec<BucketCounter>,
}

impl GroupStats {
    pub fn decode(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let length = r.read_u16::<BigEndian>()? as usize;
        encoding::read_pad(r, 2)?;
        let group = r.read_u32::<BigEndian>()?;
        let ref_count = r.read_u32::<BigEndian>()?;
        encoding::read_pad(r, 4)?;
        let packet_count = r.read_u64::<BigEndian>()?;
        let byte_count = r.read_u64::<BigEndian>()?;
        let duration_sec = r.read_u32::<BigEndian>()?;
        let duration_nsec = r.read_u32::<BigEndian>()?;

        let mut body =
            encoding::take(r, encoding::body_len("group stats", length, GROUP_STATS_HEADER_LEN)?)?;
        let bucket_stats = encoding::decode_all(&mut body, BucketCounter::decode)?;

        Ok(GroupStats {
            group,
            ref_count,
            packet_count,
            byte_count,
            duration_sec,
            duration_nsec,
            bucket_stats,
        })
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>) -> Result<Vec<GroupStats>> {
        encoding::decode_all(r, GroupStats::decode)
    }
}

impl Encode for GroupStats {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let total = GROUP_STATS_HEADER_LEN + 16 * self.bucket_stats.len();
        w.write_u16::<BigEndian>(encoding::declared_len("group stats", total)?)?;
        encoding::write_pad(w, 2);
        w.write_u32::<BigEndian>(self.group)?;
        w.write_u32::<BigEndian>(self.ref_count)?;
        encoding::write_pad(w, 4);
        w.write_u64::<BigEndian>(self.packet_count)?;
        w.write_u64::<BigEndian>(self.byte_count)?;
        w.write_u32::<BigEndian>(self.duration_sec)?;
        w.write_u32::<BigEndian>(self.duration_nsec)?;
        encoding::encode_list(w, &self.bucket_stats)?;
        Ok(total)
    }
}

/// Configuration of a single group, one element of a group description
/// stats reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescStats {
    pub group_type: u8,
    pub group: GroupId,
    pub buckets: Vec<Bucket>,
}

impl GroupDescStats {
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let length = r.read_u16::<BigEndian>()? as usize;
        let group_type = r.read_u8()?;
        encoding::read_pad(r, 1)?;
        let group = r.read_u32::<BigEndian>()?;

        let mut body = encoding::take(
            r,
            encoding::body_len("group description", length, GROUP_DESC_STATS_HEADER_LEN)?,
        )?;
        let buckets = Bucket::decode_list(&mut body, policy)?;

        Ok(GroupDescStats { group_type, group, buckets })
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<GroupDescStats>> {
        encoding::decode_all(r, |r| GroupDescStats::decode(r, policy))
    }
}

impl Encode for GroupDescStats {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        encoding::encode_list(&mut body, &self.buckets)?;

        let total = GROUP_DESC_STATS_HEADER_LEN + body.len();
        w.write_u16::<BigEndian>(encoding::declared_len("group description", total)?)?;
        w.write_u8(self.group_type)?;
        encoding::write_pad(w, 1);
        w.write_u32::<BigEndian>(self.group)?;
        w.extend_from_slice(&body);

        Ok(total)
    }
}
