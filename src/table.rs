//! Table features: per-table capability records and their property list.

use crate::action::Action;
use crate::encoding::{self, Encode, Result, UnknownPolicy, WireError};
use crate::instruction::Instruction;
use crate::oxm::{self, Oxm};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Last usable table number.
pub const TABLE_MAX: u8 = 0xfe;
/// Wildcard table in flow mods and stats requests.
pub const TABLE_ALL: u8 = 0xff;

pub const MAX_TABLE_NAME_LEN: usize = 32;

pub const TABLE_PROP_INSTRUCTIONS: u16 = 0;
pub const TABLE_PROP_INSTRUCTIONS_MISS: u16 = 1;
pub const TABLE_PROP_NEXT_TABLES: u16 = 2;
pub const TABLE_PROP_NEXT_TABLES_MISS: u16 = 3;
pub const TABLE_PROP_WRITE_ACTIONS: u16 = 4;
pub const TABLE_PROP_WRITE_ACTIONS_MISS: u16 = 5;
pub const TABLE_PROP_APPLY_ACTIONS: u16 = 6;
pub const TABLE_PROP_APPLY_ACTIONS_MISS: u16 = 7;
pub const TABLE_PROP_MATCH: u16 = 8;
pub const TABLE_PROP_WILDCARDS: u16 = 9;
pub const TABLE_PROP_WRITE_SETFIELD: u16 = 10;
pub const TABLE_PROP_WRITE_SETFIELD_MISS: u16 = 11;
pub const TABLE_PROP_APPLY_SETFIELD: u16 = 12;
pub const TABLE_PROP_APPLY_SETFIELD_MISS: u16 = 13;
pub const TABLE_PROP_EXPERIMENTER: u16 = 0xfffe;
pub const TABLE_PROP_EXPERIMENTER_MISS: u16 = 0xffff;

const TABLE_FEATURES_HEADER_LEN: usize = 64;
const TABLE_PROP_HEADER_LEN: usize = 4;

/// One capability property of a flow table.
///
/// `miss` selects the table-miss flavour of the property, a distinct wire
/// type code with the same payload. The declared length covers the header
/// and body but not the trailing alignment padding; properties carrying
/// OXM lists are, per the wire format, not padded at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableProp {
    /// Instructions supported by the table.
    Instructions { miss: bool, instructions: Vec<Instruction> },
    /// Tables reachable directly from this one.
    NextTables { miss: bool, tables: Vec<u8> },
    /// Actions supported in the write-actions instruction.
    WriteActions { miss: bool, actions: Vec<Action> },
    /// Actions supported in the apply-actions instruction.
    ApplyActions { miss: bool, actions: Vec<Action> },
    /// Fields the table can match on.
    Match { fields: Vec<Oxm> },
    /// Fields the table can wildcard.
    Wildcards { fields: Vec<Oxm> },
    /// Fields settable through write-actions.
    WriteSetField { miss: bool, fields: Vec<Oxm> },
    /// Fields settable through apply-actions.
    ApplySetField { miss: bool, fields: Vec<Oxm> },
    /// Experimenter property.
    Experimenter { miss: bool, experimenter: u32, exp_type: u32, data: Vec<u8> },
    /// A property whose type code has no known variant.
    Unknown { prop_type: u16, body: Vec<u8> },
}

impl TableProp {
    /// The wire discriminator of this property.
    pub fn type_code(&self) -> u16 {
        match self {
            TableProp::Instructions { miss, .. } => miss_code(TABLE_PROP_INSTRUCTIONS, *miss),
            TableProp::NextTables { miss, .. } => miss_code(TABLE_PROP_NEXT_TABLES, *miss),
            TableProp::WriteActions { miss, .. } => miss_code(TABLE_PROP_WRITE_ACTIONS, *miss),
            TableProp::ApplyActions { miss, .. } => miss_code(TABLE_PROP_APPLY_ACTIONS, *miss),
            TableProp::Match { .. } => TABLE_PROP_MATCH,
            TableProp::Wildcards { .. } => TABLE_PROP_WILDCARDS,
            TableProp::WriteSetField { miss, .. } => miss_code(TABLE_PROP_WRITE_SETFIELD, *miss),
            TableProp::ApplySetField { miss, .. } => miss_code(TABLE_PROP_APPLY_SETFIELD, *miss),
            TableProp::Experimenter { miss, .. } => miss_code(TABLE_PROP_EXPERIMENTER, *miss),
            TableProp::Unknown { prop_type, .. } => *prop_type,
        }
    }

    fn is_padded(&self) -> bool {
        !matches!(
            self,
            TableProp::Match { .. }
                | TableProp::Wildcards { .. }
                | TableProp::WriteSetField { .. }
                | TableProp::ApplySetField { .. }
        )
    }

    /// Decode a single property record and, for the padded kinds, its
    /// trailing alignment padding.
    pub fn decode_one(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let (code, length, mut body) = encoding::read_variant_header(r, "table property")?;

        let prop = match code {
            TABLE_PROP_INSTRUCTIONS | TABLE_PROP_INSTRUCTIONS_MISS => TableProp::Instructions {
                miss: code == TABLE_PROP_INSTRUCTIONS_MISS,
                instructions: Instruction::decode_list(&mut body, policy)?,
            },
            TABLE_PROP_NEXT_TABLES | TABLE_PROP_NEXT_TABLES_MISS => TableProp::NextTables {
                miss: code == TABLE_PROP_NEXT_TABLES_MISS,
                tables: {
                    let n = encoding::remaining(&body);
                    encoding::read_bytes(&mut body, n)?
                },
            },
            TABLE_PROP_WRITE_ACTIONS | TABLE_PROP_WRITE_ACTIONS_MISS => TableProp::WriteActions {
                miss: code == TABLE_PROP_WRITE_ACTIONS_MISS,
                actions: Action::decode_list(&mut body, policy)?,
            },
            TABLE_PROP_APPLY_ACTIONS | TABLE_PROP_APPLY_ACTIONS_MISS => TableProp::ApplyActions {
                miss: code == TABLE_PROP_APPLY_ACTIONS_MISS,
                actions: Action::decode_list(&mut body, policy)?,
            },
            TABLE_PROP_MATCH => TableProp::Match { fields: oxm::decode_oxm_list(&mut body)? },
            TABLE_PROP_WILDCARDS => {
                TableProp::Wildcards { fields: oxm::decode_oxm_list(&mut body)? }
            }
            TABLE_PROP_WRITE_SETFIELD | TABLE_PROP_WRITE_SETFIELD_MISS => TableProp::WriteSetField {
                miss: code == TABLE_PROP_WRITE_SETFIELD_MISS,
                fields: oxm::decode_oxm_list(&mut body)?,
            },
            TABLE_PROP_APPLY_SETFIELD | TABLE_PROP_APPLY_SETFIELD_MISS => TableProp::ApplySetField {
                miss: code == TABLE_PROP_APPLY_SETFIELD_MISS,
                fields: oxm::decode_oxm_list(&mut body)?,
            },
            TABLE_PROP_EXPERIMENTER | TABLE_PROP_EXPERIMENTER_MISS => {
                let experimenter = body.read_u32::<BigEndian>()?;
                let exp_type = body.read_u32::<BigEndian>()?;
                let rest = encoding::remaining(&body);
                TableProp::Experimenter {
                    miss: code == TABLE_PROP_EXPERIMENTER_MISS,
                    experimenter,
                    exp_type,
                    data: encoding::read_bytes(&mut body, rest)?,
                }
            }
            code => match policy {
                UnknownPolicy::Reject => {
                    return Err(WireError::UnknownVariant { kind: "table property", code })
                }
                UnknownPolicy::Keep => {
                    let rest = encoding::remaining(&body);
                    TableProp::Unknown { prop_type: code, body: encoding::read_bytes(&mut body, rest)? }
                }
            },
        };

        if prop.is_padded() {
            encoding::read_pad(r, encoding::pad_to_8(length as usize))?;
        }

        Ok(prop)
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<TableProp>> {
        encoding::decode_all(r, |r| TableProp::decode_one(r, policy))
    }
}

impl Encode for TableProp {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        match self {
            TableProp::Instructions { instructions, .. } => {
                encoding::encode_list(&mut body, instructions)?;
            }
            TableProp::NextTables { tables, .. } => body.extend_from_slice(tables),
            TableProp::WriteActions { actions, .. } | TableProp::ApplyActions { actions, .. } => {
                encoding::encode_list(&mut body, actions)?;
            }
            TableProp::Match { fields }
            | TableProp::Wildcards { fields }
            | TableProp::WriteSetField { fields, .. }
            | TableProp::ApplySetField { fields, .. } => {
                encoding::encode_list(&mut body, fields)?;
            }
            TableProp::Experimenter { experimenter, exp_type, data, .. } => {
                body.write_u32::<BigEndian>(*experimenter)?;
                body.write_u32::<BigEndian>(*exp_type)?;
                body.extend_from_slice(data);
            }
            TableProp::Unknown { body: raw, .. } => body.extend_from_slice(raw),
        }

        // Declared length never counts the padding.
        let length = TABLE_PROP_HEADER_LEN + body.len();
        let pad = if self.is_padded() { encoding::pad_to_8(length) } else { 0 };

        w.write_u16::<BigEndian>(self.type_code())?;
        w.write_u16::<BigEndian>(encoding::declared_len("table property", length)?)?;
        w.extend_from_slice(&body);
        encoding::write_pad(w, pad);

        Ok(length + pad)
    }
}

fn miss_code(regular: u16, miss: bool) -> u16 {
    if miss {
        regular | 1
    } else {
        regular
    }
}

/// Capabilities of a single flow table, one element of a table features
/// request or reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFeatures {
    pub table: u8,
    pub name: String,
    pub metadata_match: u64,
    pub metadata_write: u64,
    pub config: u32,
    pub max_entries: u32,
    pub properties: Vec<TableProp>,
}

impl TableFeatures {
    pub fn decode(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Self> {
        let length = r.read_u16::<BigEndian>()? as usize;
        let table = r.read_u8()?;
        encoding::read_pad(r, 5)?;

        let raw_name = encoding::read_bytes(r, MAX_TABLE_NAME_LEN)?;
        let end = raw_name.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

        let metadata_match = r.read_u64::<BigEndian>()?;
        let metadata_write = r.read_u64::<BigEndian>()?;
        let config = r.read_u32::<BigEndian>()?;
        let max_entries = r.read_u32::<BigEndian>()?;

        let mut body = encoding::take(
            r,
            encoding::body_len("table features", length, TABLE_FEATURES_HEADER_LEN)?,
        )?;
        let properties = TableProp::decode_list(&mut body, policy)?;

        Ok(TableFeatures {
            table,
            name,
            metadata_match,
            metadata_write,
            config,
            max_entries,
            properties,
        })
    }

    pub fn decode_list(r: &mut Cursor<&[u8]>, policy: UnknownPolicy) -> Result<Vec<TableFeatures>> {
        encoding::decode_all(r, |r| TableFeatures::decode(r, policy))
    }
}

impl Encode for TableFeatures {
    fn encode(&self, w: &mut Vec<u8>) -> Result<usize> {
        let mut body = Vec::new();
        encoding::encode_list(&mut body, &self.properties)?;

        let mut name = [0u8; MAX_TABLE_NAME_LEN];
        let n = self.name.len().min(MAX_TABLE_NAME_LEN);
        name[..n].copy_from_slice(&self.name.as_bytes()[..n]);

        let total = TABLE_FEATURES_HEADER_LEN + body.len();
        w.write_u16::<BigEndian>(encoding::declared_len("table features", total)?)?;
        w.write_u8(self.table)?;
        encoding::write_pad(w, 5);
        w.extend_from_slice(&name);
        w.write_u64::<BigEndian>(self.metadata_match)?;
        w.write_u64::<BigEndian>(self.metadata_write)?;
        w.write_u32::<BigEndian>(self.config)?;
        w.write_u32::<BigEndian>(self.max_entries)?;
        w.extend_from_slice(&body);

        Ok(total)
    }
}
