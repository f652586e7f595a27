//! The per-SSID VLAN binding list (`hapd->conf->vlan` in the original): a
//! head-insertion ordered collection of [`VlanBinding`]s, plus the
//! wildcard template used to mint new dynamic bindings.
//!
//! This module owns list bookkeeping only. Driver-coupled orchestration
//! (creating/destroying the interface a binding names, reacting to
//! netlink events) lives in [`crate::topology`], the same split the
//! original draws between `vlan_add_dynamic`/`vlan_remove_dynamic` (list
//! surgery) and `vlan_if_add`/`vlan_newlink`/`vlan_dellink` (the actual
//! OS-facing work), except here the orchestration methods call back into
//! this table instead of walking a linked list inline.

use crate::config::VlanConfig;
use crate::error::Result;
use crate::model::{VlanBinding, VlanDesc, VlanId};

#[derive(Debug, Default)]
pub struct BindingTable {
    /// Head-insertion ordered: new entries go to the front, mirroring the
    /// original's `n->next = hapd->conf->vlan; hapd->conf->vlan = n;` so
    /// that whichever binding was added last is found first — the most
    /// recently (re)configured binding for an ifname wins ties.
    bindings: Vec<VlanBinding>,
}

impl BindingTable {
    /// Builds the table from static configuration, inserting a wildcard
    /// template binding when dynamic VLANs are enabled and no static
    /// entries were configured. Tolerates `per_sta_vif` being set even
    /// when `dynamic_vlan` is `DISABLED` (the original does too — the
    /// wildcard guard is `dynamic_vlan != DISABLED || per_sta_vif`).
    pub fn init(config: &VlanConfig) -> Result<Self> {
        Ok(BindingTable {
            bindings: config.initial_bindings()?,
        })
    }

    pub fn deinit(&mut self) -> Vec<VlanBinding> {
        std::mem::take(&mut self.bindings)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VlanBinding> {
        self.bindings.iter()
    }

    pub fn find_by_ifname(&self, ifname: &str) -> Option<&VlanBinding> {
        self.bindings.iter().find(|b| b.ifname == ifname)
    }

    pub fn find_by_ifname_mut(&mut self, ifname: &str) -> Option<&mut VlanBinding> {
        self.bindings.iter_mut().find(|b| b.ifname == ifname)
    }

    /// Finds a concrete (non-wildcard) binding already assigned to `vid`,
    /// so a second station landing on the same VID can share it instead
    /// of minting a duplicate.
    pub fn find_by_vlan_id(&self, vid: VlanId) -> Option<&VlanBinding> {
        self.bindings
            .iter()
            .find(|b| !b.vlan_id.is_wildcard() && b.vlan_id == vid)
    }

    pub fn find_by_vlan_id_mut(&mut self, vid: VlanId) -> Option<&mut VlanBinding> {
        self.bindings
            .iter_mut()
            .find(|b| !b.vlan_id.is_wildcard() && b.vlan_id == vid)
    }

    /// The wildcard template binding, if one was configured.
    pub fn wildcard(&self) -> Option<&VlanBinding> {
        self.bindings.iter().find(|b| b.vlan_id.is_wildcard())
    }

    /// Derives the concrete interface name for a new dynamic binding from
    /// the wildcard template (`"<prefix>.#<suffix>"` → `"<prefix>.<vid><suffix>"`),
    /// mirroring the `'#'` substitution in `vlan_add_dynamic`.
    pub fn dynamic_ifname(&self, vid: VlanId) -> Option<String> {
        let template = &self.wildcard()?.ifname;
        let pos = template.find('#')?;
        let (prefix, rest) = template.split_at(pos);
        let suffix = &rest[1..];
        Some(format!("{prefix}{vid}{suffix}"))
    }

    /// Inserts a new dynamic binding at the head of the list. Caller is
    /// responsible for having confirmed no concrete binding already
    /// claims `vid` (the original pushes this check onto its own caller
    /// too).
    pub fn insert_dynamic(&mut self, ifname: String, vid: VlanId, desc: VlanDesc) -> usize {
        self.bindings.insert(
            0,
            VlanBinding {
                ifname,
                vlan_id: vid,
                vlan_desc: desc,
                configured: false,
                clean: crate::model::CleanFlags::empty(),
                dynamic_vlan: 1,
                preauth_active: false,
            },
        );
        0
    }

    pub fn remove_at(&mut self, index: usize) -> VlanBinding {
        self.bindings.remove(index)
    }

    pub fn index_of_ifname(&self, ifname: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.ifname == ifname)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut VlanBinding> {
        self.bindings.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DynamicVlan, VlanNaming};

    fn base_config() -> VlanConfig {
        VlanConfig {
            iface: "wlan0".into(),
            vlan_naming: VlanNaming::WithoutDevice,
            vlan_tagged_interface: None,
            vlan_bridge: String::new(),
            vlan_script: None,
            bridge: String::new(),
            per_sta_vif: false,
            dynamic_vlan: DynamicVlan::Required,
            vlan_bindings: Vec::new(),
            wep_configured: false,
        }
    }

    #[test]
    fn dynamic_ifname_substitutes_hash() {
        let table = BindingTable::init(&base_config()).unwrap();
        let vid = VlanId::new(7).unwrap();
        assert_eq!(table.dynamic_ifname(vid).as_deref(), Some("wlan0.7"));
    }

    #[test]
    fn insert_dynamic_goes_to_head() {
        let mut table = BindingTable::init(&base_config()).unwrap();
        let vid = VlanId::new(7).unwrap();
        table.insert_dynamic("wlan0.7".into(), vid, VlanDesc::default());
        assert_eq!(table.bindings[0].ifname, "wlan0.7");
        assert_eq!(table.bindings[1].ifname, "wlan0.#");
    }

    #[test]
    fn find_by_vlan_id_skips_wildcard() {
        let table = BindingTable::init(&base_config()).unwrap();
        assert!(table.find_by_vlan_id(VlanId::WILDCARD).is_none());
    }
}
