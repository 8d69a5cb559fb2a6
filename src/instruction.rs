//! Flow instructions attached to flow table entries.
//!
//! Instructions share the `(type, length)` variant record shape with
//! actions; the action-carrying variants nest an action list inside their
//! own bounded body.

use crate::action::Action;
use crate::encoding::{self, Encode, Result, UnknownPolicy, WireError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

pub const INSTRUCTION_GOTO_TABLE: u16 = 1;
pub const INSTRUCTION_WRITE_METADATA: u16 = 2;
pub const INSTRUCTION_WRITE_ACTIONS: u16 = 3;
pub const INSTRUCTION_APPLY_ACTIONS: u16 = 4;
pub const INSTRUCTION_CLEAR_ACTIONS: u16 = 5;
pub const INSTRUCTION_METER: u16 = 6;

const INSTRUCTION_HEADER_LEN: usize = 4;

/// A single flow instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Continue pipeline processing at the given table.
    GotoTable { table: u8 },
    /// Update the metadata register: `metadata` under `metadata_mask`.
    WriteMetadata { metadata: u64, metadata_mask: u64 },
    /// Merge the actions into the packet's action set.
    WriteActions { actions: Vec<Action> },
    /// Apply the actions immediately, in order.
    ApplyActions { actions: Vec<Action> },
    /// Clear the packet's action set.
    ClearActions,
    /// Direct the packet to the given meter.
    Meter { meter: u32 },
    /// An instruction whose type code has no known variant.
    Unknown { instruction_type: u16, body: Vec<u8> },
}

impl Instruction {
    /// The wire discriminator of this instruction.
    pub fn type_code(&self) -> u16 {
        match self {
            Instruction::GotoTable { .. } => INSTRUCTION_GOTO_TABLE,
            Instruction::WriteMetadata { .. } => INSTRUCTION_WRITE_METADATA,
            Instruction::WriteActions { .. } => INSTRUCTION_WRITE_ACTIONS,
            Instruction::ApplyActions { .. } => INSTRUCTION_APPLY_ACTIONS,
            Instruction::ClearActions => INSTRUCTION_CLEAR_ACTIONS,
            Instruction::Meter { .. } => INSTRUCTION_METER,
            Instruction::Unknown { instruction_type, .. } => *instruction_type,
        }
    }

    /// Decode a single instruction record. The policy applies to this
    /// record's discriminator and to any nested action list.
    pub fn decode_one(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let (code, _, mut body) = encoding::read_variant_header(r, "instruction")?;

        let instruction = match code {
            INSTRUCTION_GOTO_TABLE => {
                let table = body.read_u8()?;
                encoding::read_pad(&mut body, 3)?;
                Instruction::GotoTable { table }
            }
            INSTRUCTION_WRITE_METADATA => {
                encoding::read_pad(&mut body, 4)?;
                let metadata = body.read_u64::<BigEndian>()?;
                let metadata_mask = body.read_u64::<BigEndian>()?;
                Instruction::WriteMetadata { metadata, metadata_mask }
            }
            INSTRUCTION_WRITE_ACTIONS => {
                encoding::read_pad(&mut body, 4)?;
                Instruction::WriteActions { actions: Action::decode_list(&mut body, policy)? }
            }
            INSTRUCTION_APPLY_ACTIONS => {
                encoding::read_pad(&mut body, 4)?;
                Instruction::ApplyActions { actions: Action::decode_list(&mut body, policy)? }
            }
            INSTRUCTION_CLEAR_ACTIONS => {
                encoding::read_pad(&mut body, 4)?;
                Instruction::ClearActions
            }
            INSTRUCTION_METER => Instruction::Meter { meter: body.read_u32::<BigEndian>()? },
            code => match policy {
                UnknownPolicy::Reject => {
                    return Err(WireError::UnknownVariant { kind: "instruction", code })
                }
                UnknownPolicy::Keep => {
                    let rest = encoding::remaining(&body);
                    Instruction::Unknown {
                        instruction_type: code,
                        body: encoding::read_bytes(&mut body, rest)?,
                    }
                }
            },
        };

        Ok(instruction)
    }

    /// Decode instructions back to back until the bounded source is
    /// exhausted.
    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<Instruction>> {
        encoding::decode_all(r, |r| Instruction::decode_one(r, policy))
    }
}

impl Encode for Instruction {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        match self {
            Instruction::GotoTable { table } => {
                write_header(w, INSTRUCTION_GOTO_TABLE, 8)?;
                w.write_u8(*table)?;
                encoding::write_pad(w, 3);
                Ok(8)
            }
            Instruction::WriteMetadata { metadata, metadata_mask } => {
                write_header(w, INSTRUCTION_WRITE_METADATA, 24)?;
                encoding::write_pad(w, 4);
                w.write_u64::<BigEndian>(*metadata)?;
                w.write_u64::<BigEndian>(*metadata_mask)?;
                Ok(24)
            }
            Instruction::WriteActions { actions } => {
                encode_actions(w, INSTRUCTION_WRITE_ACTIONS, actions)
            }
            Instruction::ApplyActions { actions } => {
                encode_actions(w, INSTRUCTION_APPLY_ACTIONS, actions)
            }
            Instruction::ClearActions => {
                write_header(w, INSTRUCTION_CLEAR_ACTIONS, 8)?;
                encoding::write_pad(w, 4);
                Ok(8)
            }
            Instruction::Meter { meter } => {
                write_header(w, INSTRUCTION_METER, 8)?;
                w.write_u32::<BigEndian>(*meter)?;
                Ok(8)
            }
            Instruction::Unknown { instruction_type, body } => {
                let total = INSTRUCTION_HEADER_LEN + body.len();
                write_header(w, *instruction_type, encoding::declared_len("instruction", total)?)?;
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

fn encode_actions(w: &mut Vec<u8>, code: u16, actions: &[Action]) -> Result<usize> {
    let mut body = Vec::new();
    encoding::encode_list(&mut body, actions)?;

    let total = INSTRUCTION_HEADER_LEN + 4 + body.len();
    write_header(w, code, encoding::declared_len("instruction", total)?)?;
    encoding::write_pad(w, 4);
    w.extend_from_slice(&body);
    Ok(total)
}
