//! Port numbering shared by actions and group buckets.

/// Switch port number. Physical ports start at 1; the values below are
/// reserved by the protocol.
pub type PortNo = u32;

/// Last usable port number.
pub const PORT_MAX: PortNo = 0xffffff00;
/// The packet input port; valid only as an output port.
pub const PORT_IN: PortNo = 0xfffffff8;
/// Submit the packet to the first flow table.
pub const PORT_TABLE: PortNo = 0xfffffff9;
/// Forward using the non-OpenFlow pipeline of the switch.
pub const PORT_NORMAL: PortNo = 0xfffffffa;
/// Flood using the non-OpenFlow pipeline of the switch.
pub const PORT_FLOOD: PortNo = 0xfffffffb;
/// All standard ports except the input port.
pub const PORT_ALL: PortNo = 0xfffffffc;
/// Send to the controller.
pub const PORT_CONTROLLER: PortNo = 0xfffffffd;
/// Local OpenFlow port.
pub const PORT_LOCAL: PortNo = 0xfffffffe;
/// Wildcard used in flow deletes and stats requests.
pub const PORT_ANY: PortNo = 0xffffffff;
