//! Runtime configuration for the VLAN topology daemon.
//!
//! Deserializable from whatever configuration format the embedding daemon
//! uses; the file format itself is out of scope here, this module only
//! defines the shape the rest of the crate consumes.

use serde::Deserialize;

use crate::model::{VlanBinding, VlanDesc, VlanId};

/// How dynamic VLAN interface names are derived from the trunk device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VlanNaming {
    /// `vlan<VID>`
    WithoutDevice,
    /// `<trunk>.<VID>`
    WithDevice,
}

/// Whether dynamic VLAN assignment from RADIUS/PSK lookups is enabled, and
/// whether a per-station interface is created even for stations with no
/// VLAN tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicVlan {
    Disabled,
    Optional,
    Required,
}

impl DynamicVlan {
    pub fn is_enabled(self) -> bool {
        !matches!(self, DynamicVlan::Disabled)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VlanConfig {
    /// Primary bound interface this daemon is running against (e.g. the
    /// wireless trunk). Used to name the wildcard template binding.
    pub iface: String,

    pub vlan_naming: VlanNaming,

    /// Physical/trunk interface tagged VLAN interfaces are stacked on top
    /// of. `None` means the driver already delivers per-VLAN traffic on
    /// distinct interfaces and no tagged child needs to be created.
    #[serde(default)]
    pub vlan_tagged_interface: Option<String>,

    /// Prefix used to name per-VID bridges (`<prefix><VID>`). Empty means
    /// fall back to the tagged-interface or `brvlan<VID>` naming.
    #[serde(default)]
    pub vlan_bridge: String,

    /// Optional external helper script; when set, all bridge/VLAN/port
    /// mutations are delegated to it instead of issued directly against
    /// the kernel.
    #[serde(default)]
    pub vlan_script: Option<String>,

    /// Bridge every untagged, non-VLAN station is added to.
    #[serde(default)]
    pub bridge: String,

    #[serde(default)]
    pub per_sta_vif: bool,

    pub dynamic_vlan: DynamicVlan,

    /// Statically configured bindings, equivalent to the contents of the
    /// original `vlan_file`.
    #[serde(default)]
    pub vlan_bindings: Vec<ConfiguredBinding>,

    /// Whether this SSID has static WEP keys configured. Dynamic VLAN
    /// setups refuse to run against a WEP SSID.
    #[serde(default)]
    pub wep_configured: bool,
}

/// One line of the statically configured VLAN binding list.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfiguredBinding {
    pub ifname: String,
    pub vlan_id: u16,
    #[serde(default)]
    pub untagged: Option<u16>,
    #[serde(default)]
    pub tagged: Vec<u16>,
}

impl VlanConfig {
    /// Builds the initial binding table contents from the static
    /// configuration, mirroring `vlan_init`'s handling of `hapd->conf->vlan`.
    pub fn initial_bindings(&self) -> crate::error::Result<Vec<VlanBinding>> {
        let mut bindings = Vec::with_capacity(self.vlan_bindings.len());
        for entry in &self.vlan_bindings {
            let vlan_id = VlanId::new(entry.vlan_id)
                .ok_or_else(|| crate::error::Error::NameTooLong(entry.ifname.clone()))?;
            let untagged = entry.untagged.and_then(VlanId::new);
            let tagged = entry
                .tagged
                .iter()
                .filter_map(|&v| VlanId::new(v))
                .collect();
            bindings.push(VlanBinding::new_static(
                &entry.ifname,
                vlan_id,
                VlanDesc { untagged, tagged },
            ));
        }
        if bindings.is_empty() && (self.dynamic_vlan.is_enabled() || self.per_sta_vif) {
            bindings.push(VlanBinding::wildcard(format!("{}.#", self.iface)));
        }
        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_with_dynamic_vlan_gets_wildcard_binding() {
        let cfg = VlanConfig {
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
        };
        let bindings = cfg.initial_bindings().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].ifname, "wlan0.#");
        assert!(bindings[0].vlan_id.is_wildcard());
    }

    #[test]
    fn disabled_dynamic_vlan_with_no_static_entries_stays_empty() {
        let cfg = VlanConfig {
            iface: "wlan0".into(),
            vlan_naming: VlanNaming::WithoutDevice,
            vlan_tagged_interface: None,
            vlan_bridge: String::new(),
            vlan_script: None,
            bridge: "br0".into(),
            per_sta_vif: false,
            dynamic_vlan: DynamicVlan::Disabled,
            vlan_bindings: Vec::new(),
            wep_configured: false,
        };
        assert!(cfg.initial_bindings().unwrap().is_empty());
    }
}
