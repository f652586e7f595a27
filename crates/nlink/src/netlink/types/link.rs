//! Link (RTM_*LINK) netlink message types and constants.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// IFF_* interface flag bits used when building RTM_SETLINK requests.
pub mod iff {
    /// Interface is administratively up.
    pub const UP: u32 = 0x1;
}

/// ifinfomsg structure, the fixed-size header of every RTM_*LINK message.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    /// Address family, normally AF_UNSPEC.
    pub ifi_family: u8,
    /// Padding byte, always zero.
    pub ifi_pad: u8,
    /// Device type (ARPHRD_*).
    pub ifi_type: u16,
    /// Interface index.
    pub ifi_index: i32,
    /// Interface flags (IFF_*).
    pub ifi_flags: u32,
    /// Flags that are being changed by this message.
    pub ifi_change: u32,
}

impl IfInfoMsg {
    /// Wire size of the header.
    pub const SIZE: usize = 16;

    /// Create a new header with AF_UNSPEC family and no flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interface index.
    pub fn with_index(mut self, index: i32) -> Self {
        self.ifi_index = index;
        self
    }

    /// Convert to bytes for netlink message building.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Option<&Self> {
        Self::ref_from_prefix(data).map(|(r, _)| r).ok()
    }
}

/// Top-level IFLA_* attribute identifiers used when building link messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum IflaAttr {
    /// Hardware address.
    Address = 1,
    /// Broadcast address.
    Broadcast = 2,
    /// Interface name.
    Ifname = 3,
    /// MTU.
    Mtu = 4,
    /// Index of the underlying real device for stacked links.
    Link = 5,
    /// Qdisc name.
    Qdisc = 6,
    /// Master (bridge/bond) device index.
    Master = 10,
    /// Transmit queue length.
    TxqLen = 13,
    /// Operational state.
    Operstate = 16,
    /// Nested link-type information.
    Linkinfo = 18,
    /// 64-bit statistics.
    Stats64 = 23,
    /// Network namespace file descriptor to move the interface into.
    NetNsFd = 28,
    /// Group.
    Group = 27,
    /// Promiscuity count.
    Promiscuity = 30,
    /// Number of TX queues.
    NumTxQueues = 31,
    /// Number of RX queues.
    NumRxQueues = 32,
    /// Carrier state.
    Carrier = 33,
    /// Minimum MTU.
    MinMtu = 50,
    /// Maximum MTU.
    MaxMtu = 51,
    /// Permanent hardware address.
    PermAddress = 54,
    /// PID of the network namespace to move the interface into.
    NetNsPid = 19,
}

/// Nested IFLA_INFO_* attribute identifiers carried inside IFLA_LINKINFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum IflaInfo {
    /// Link kind string (e.g. "vlan", "bridge").
    Kind = 1,
    /// Kind-specific nested attributes.
    Data = 2,
    /// Slave kind string.
    SlaveKind = 4,
    /// Slave-specific nested attributes.
    SlaveData = 5,
}

/// 64-bit link statistics (IFLA_STATS64), counters as reported by the kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct LinkStats64 {
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_dropped: u64,
    pub tx_dropped: u64,
    pub multicast: u64,
    pub collisions: u64,
}

impl LinkStats64 {
    /// Parse a statistics block out of an IFLA_STATS64 attribute payload.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::ref_from_prefix(data).map(|(r, _)| *r).ok()
    }
}

/// Operational state (IFLA_OPERSTATE), per RFC 2863.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperState {
    #[default]
    Unknown,
    NotPresent,
    Down,
    LowerLayerDown,
    Testing,
    Dormant,
    Up,
}

impl From<u8> for OperState {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::NotPresent,
            2 => Self::Down,
            3 => Self::LowerLayerDown,
            4 => Self::Testing,
            5 => Self::Dormant,
            6 => Self::Up,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ifinfomsg_roundtrip() {
        let hdr = IfInfoMsg::new().with_index(7);
        let bytes = hdr.as_bytes();
        assert_eq!(bytes.len(), IfInfoMsg::SIZE);
        let parsed = IfInfoMsg::from_bytes(bytes).unwrap();
        assert_eq!(parsed.ifi_index, 7);
    }

    #[test]
    fn operstate_from_u8() {
        assert_eq!(OperState::from(6), OperState::Up);
        assert_eq!(OperState::from(2), OperState::Down);
        assert_eq!(OperState::from(200), OperState::Unknown);
    }

    #[test]
    fn link_stats64_from_bytes() {
        let mut raw = [0u8; 80];
        raw[0..8].copy_from_slice(&42u64.to_ne_bytes());
        let stats = LinkStats64::from_bytes(&raw).unwrap();
        assert_eq!(stats.rx_packets, 42);
    }
}
