//! # ofwire — OpenFlow 1.3 wire-format codec
//!
//! Byte-exact encoding and decoding of OpenFlow 1.3 protocol structures:
//! actions, instructions, the OXM extensible match, group and table
//! records, queue configuration and the hello handshake.
//!
//! ## Model
//!
//! - Every structure encodes by appending big-endian fields to a `Vec<u8>`
//!   through the [`Encode`] trait, and decodes from a `Cursor<&[u8]>`.
//! - Variable-length records carry a `(type, length)` header; decoding
//!   bounds the body to the declared length so a malformed nested record
//!   cannot read past its boundary.
//! - Type-discriminated lists (actions, instructions, table and queue
//!   properties) take an [`UnknownPolicy`]: reject unrecognized type codes,
//!   or keep them as opaque `Unknown` variants and continue. Hello elements
//!   always keep them, as the handshake requires.
//!
//! ## Example
//!
//! ```
//! use ofwire::{Encode, Match, Oxm};
//! use ofwire::oxm::{xm_field, MATCH_TYPE_OXM, XM_CLASS_OPENFLOW_BASIC};
//! use std::io::Cursor;
//!
//! let m = Match {
//!     match_type: MATCH_TYPE_OXM,
//!     fields: vec![Oxm {
//!         class: XM_CLASS_OPENFLOW_BASIC,
//!         field: xm_field::IN_PORT,
//!         value: 3u32.to_be_bytes().to_vec(),
//!         mask: None,
//!     }],
//! };
//! let bytes = m.to_bytes()?;
//! assert_eq!(bytes.len() % 8, 0);
//!
//! let decoded = Match::decode(&mut Cursor::new(&bytes[..]))?;
//! assert_eq!(decoded.field(xm_field::IN_PORT).and_then(|f| f.value_u32()), Some(3));
//! # Ok::<(), ofwire::WireError>(())
//! ```

pub mod action;
pub mod encoding;
pub mod group;
pub mod hello;
pub mod instruction;
pub mod oxm;
pub mod port;
pub mod queue;
pub mod table;

pub use action::Action;
pub use encoding::{Encode, Result, UnknownPolicy, WireError};
pub use group::{Bucket, BucketCounter, GroupDescStats, GroupMod, GroupStats};
pub use hello::{Hello, HelloElem};
pub use instruction::Instruction;
pub use oxm::{Match, Oxm};
pub use queue::{PacketQueue, QueueGetConfigReply, QueueGetConfigRequest, QueueProp};
pub use table::{TableFeatures, TableProp};
