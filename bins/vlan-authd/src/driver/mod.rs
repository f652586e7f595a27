//! OS interface driver abstraction.
//!
//! [`TopologyDriver`] is the seam between the topology manager and the
//! mechanism actually used to reconfigure the kernel: direct netlink/ioctl
//! calls ([`kernel::KernelDriver`]) or an external helper script
//! ([`script::ScriptDriver`]). Grounded on the dual code paths in the
//! original (`#ifndef CONFIG_VLAN_NETLINK` vs. `if (script)` branches
//! scattered through `vlan_newlink`/`vlan_dellink`), collapsed here into
//! one trait with two implementations instead of branching at every call
//! site.

pub mod kernel;
pub mod script;

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of [`TopologyDriver::vlan_add`]. Mirrors `vlan_add`'s
/// tri-state return convention (-1 error / 1 exists / 0 created) without
/// overloading the error channel for the "already exists" case, which
/// callers treat as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlanAddOutcome {
    Created,
    AlreadyExists,
}

/// What a port being added to (or removed from) a bridge represents, so
/// the helper-script protocol can pass it through as `"tagged" <vid>` /
/// `"untagged" <vid>` / nothing, matching `br_addif`'s three call shapes
/// in the original (plain for a non-VLAN station, `"untagged"` for the
/// station's own VLAN, `"tagged"` for a trunk child).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Plain,
    Untagged(u16),
    Tagged(u16),
}

/// Everything the topology manager needs from the underlying OS, whether
/// that's the kernel directly or a helper script standing in for it.
#[async_trait]
pub trait TopologyDriver: Send + Sync {
    /// Brings `ifname` up (`ifconfig_up`).
    async fn ifup(&self, ifname: &str) -> Result<()>;

    /// Brings `ifname` down (`ifconfig_down`).
    async fn ifdown(&self, ifname: &str) -> Result<()>;

    /// Returns whether `ifname` currently exists (`if_nametoindex`).
    async fn link_exists(&self, ifname: &str) -> Result<bool>;

    /// Creates an 802.1Q VLAN interface `vlan_ifname` with tag `vid` over
    /// `trunk`, or confirms one matching that description already exists.
    /// Only meaningful for the kernel driver: under the script path VLAN
    /// creation is folded into the `br_addif` call, so the script
    /// implementation is a no-op that always reports success.
    async fn vlan_add(&self, trunk: &str, vid: u16, vlan_ifname: &str) -> Result<VlanAddOutcome>;

    /// Destroys a VLAN interface created by `vlan_add`. No-op under the
    /// script driver for the same reason as `vlan_add`.
    async fn vlan_rem(&self, vlan_ifname: &str) -> Result<()>;

    /// Sets the kernel's VLAN interface naming convention
    /// (`SET_VLAN_NAME_TYPE_CMD`). Only meaningful for the kernel driver;
    /// the script driver treats this as a no-op since naming is up to the
    /// script.
    async fn vlan_set_name_type(&self, with_device: bool) -> Result<()>;

    /// Computes the bridge name for `vid`, if this driver has an opinion.
    /// The script driver queries the `br_name` verb and returns `Some`
    /// only when the script exits successfully; the kernel driver has no
    /// equivalent and always returns `None`, leaving the static
    /// prefix/trunk/fallback naming in [`crate::topology`] to decide.
    async fn br_name(&self, prefix: &str, trunk: Option<&str>, vid: u16) -> Result<Option<String>> {
        let _ = (prefix, trunk, vid);
        Ok(None)
    }

    /// Creates a bridge device, or confirms one named `br_name` already
    /// exists. Mirrors [`Self::vlan_add`]'s created-vs-existed convention
    /// so callers only mark the bridge as theirs to tear down when they
    /// actually created it.
    async fn br_addbr(&self, br_name: &str, vid: u16) -> Result<VlanAddOutcome>;

    /// Destroys a bridge device.
    async fn br_delbr(&self, br_name: &str, vid: u16) -> Result<()>;

    /// Enslaves `ifname` to bridge `br_name`.
    async fn br_addif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()>;

    /// Releases `ifname` from bridge `br_name`.
    async fn br_delif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()>;

    /// Counts the ports currently enslaved to `br_name`. The script driver
    /// has no way to answer this and the topology manager skips the check
    /// entirely when a script is configured, mirroring
    /// `if (!script && br_getnumports(br_name) != 0)`.
    async fn br_getnumports(&self, br_name: &str) -> Result<u32>;

    /// Creates the concrete per-station interface for a dynamic VLAN
    /// binding (`hostapd_vlan_if_add`).
    async fn station_if_add(&self, ifname: &str) -> Result<()>;

    /// Removes a per-station interface (`hostapd_vlan_if_remove`).
    async fn station_if_remove(&self, ifname: &str) -> Result<()>;
}
