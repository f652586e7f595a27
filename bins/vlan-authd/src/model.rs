//! Core data types shared by the registry, topology manager, and bindings table.

use bitflags::bitflags;
use std::fmt;

/// Wildcard sentinel: a binding with this VID is a template, not a concrete
/// station assignment, and is skipped by anything that walks concrete VLANs.
pub const VLAN_ID_WILDCARD: u16 = 0;

/// Largest VID the 802.1Q header can carry, minus the two reserved values
/// (0 and 4095).
pub const MAX_VLAN_ID: u16 = 4094;

/// A validated 802.1Q VLAN identifier, or the wildcard sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VlanId(u16);

impl VlanId {
    pub const WILDCARD: VlanId = VlanId(VLAN_ID_WILDCARD);

    /// Validates `id` against the 1..=MAX_VLAN_ID range used for real VIDs.
    ///
    /// Returns `None` for 0 and for anything above `MAX_VLAN_ID`, mirroring
    /// the bounds check the original code repeats at every call site
    /// (`untagged > 0 && untagged <= MAX_VLAN_ID`). The wildcard sentinel is
    /// never produced by this constructor; use [`VlanId::WILDCARD`].
    pub fn new(id: u16) -> Option<Self> {
        if id != VLAN_ID_WILDCARD && id <= MAX_VLAN_ID {
            Some(VlanId(id))
        } else {
            None
        }
    }

    pub const fn is_wildcard(self) -> bool {
        self.0 == VLAN_ID_WILDCARD
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The VLAN membership a station interface should carry: at most one
/// untagged VID plus a set of tagged VIDs, deduplicated lazily at iteration
/// time rather than at insertion (matches the adjacent-duplicate skip in
/// the original `tagged[i] == tagged[i-1]` check, which only catches
/// duplicates that are already sorted next to each other).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanDesc {
    pub untagged: Option<VlanId>,
    pub tagged: Vec<VlanId>,
}

impl VlanDesc {
    pub fn is_empty(&self) -> bool {
        self.untagged.is_none() && self.tagged.is_empty()
    }

    /// Tagged VIDs to actually act on: skips the untagged VID (it's handled
    /// separately) and collapses runs of adjacent duplicates.
    pub fn distinct_tagged(&self) -> impl Iterator<Item = VlanId> + '_ {
        self.tagged
            .iter()
            .copied()
            .enumerate()
            .filter(move |&(i, vid)| {
                if Some(vid) == self.untagged {
                    return false;
                }
                if i > 0 && self.tagged[i - 1] == vid {
                    return false;
                }
                true
            })
            .map(|(_, vid)| vid)
    }
}

bitflags! {
    /// Tracks which resources a binding is actually responsible for tearing
    /// down, so removal only undoes what addition actually created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CleanFlags: u8 {
        const BR         = 0x1;
        const VLAN       = 0x2;
        const VLAN_PORT  = 0x4;
        const WLAN_PORT  = 0x8;
    }
}

/// One entry of the per-station-group VLAN table (`hostapd_vlan` in the
/// original). A binding is either a static entry read from configuration or
/// a dynamically materialized clone of the wildcard template.
#[derive(Debug, Clone)]
pub struct VlanBinding {
    pub ifname: String,
    pub vlan_id: VlanId,
    pub vlan_desc: VlanDesc,
    /// Set once `on_new_link` has processed the NEWLINK event for this
    /// interface; guards against double-processing and lets removal skip
    /// bridge bookkeeping it never did.
    pub configured: bool,
    /// Resources this specific binding is responsible for releasing.
    pub clean: CleanFlags,
    /// Reference count for dynamically created bindings sharing one VID;
    /// zero for statically configured bindings, which are never refcounted.
    pub dynamic_vlan: u32,
    /// Whether RSN pre-authentication snooping has been started for this
    /// binding's interface, so repeated calls (once from station setup,
    /// once from link-appearance handling) don't double-init.
    pub preauth_active: bool,
}

impl VlanBinding {
    pub fn new_static(ifname: impl Into<String>, vlan_id: VlanId, vlan_desc: VlanDesc) -> Self {
        VlanBinding {
            ifname: ifname.into(),
            vlan_id,
            vlan_desc,
            configured: false,
            clean: CleanFlags::empty(),
            dynamic_vlan: 0,
            preauth_active: false,
        }
    }

    pub fn wildcard(ifname: impl Into<String>) -> Self {
        VlanBinding {
            ifname: ifname.into(),
            vlan_id: VlanId::WILDCARD,
            vlan_desc: VlanDesc::default(),
            configured: false,
            clean: CleanFlags::empty(),
            dynamic_vlan: 0,
            preauth_active: false,
        }
    }
}

/// An entry in the shared-resource registry: a bridge or VLAN interface
/// that more than one binding may reference, kept alive by refcount.
#[derive(Debug, Clone)]
pub struct SharedResourceEntry {
    pub name: String,
    pub usage: u32,
    pub clean: CleanFlags,
}

impl SharedResourceEntry {
    pub fn new(name: impl Into<String>, clean: CleanFlags) -> Self {
        SharedResourceEntry {
            name: name.into(),
            usage: 1,
            clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vlan_id_rejects_out_of_range() {
        assert!(VlanId::new(4095).is_none());
        assert!(VlanId::new(5000).is_none());
    }

    #[test]
    fn vlan_id_rejects_zero_but_accepts_boundary() {
        assert!(VlanId::new(0).is_none());
        assert_eq!(VlanId::WILDCARD.get(), 0);
        assert!(VlanId::new(1).is_some());
        assert!(VlanId::new(MAX_VLAN_ID).is_some());
    }

    #[test]
    fn distinct_tagged_skips_untagged_and_adjacent_duplicates() {
        let desc = VlanDesc {
            untagged: VlanId::new(10),
            tagged: vec![
                VlanId::new(10).unwrap(),
                VlanId::new(20).unwrap(),
                VlanId::new(20).unwrap(),
                VlanId::new(30).unwrap(),
            ],
        };
        let got: Vec<u16> = desc.distinct_tagged().map(VlanId::get).collect();
        assert_eq!(got, vec![20, 30]);
    }
}
