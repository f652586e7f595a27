//! Drives VLAN topology changes in response to configuration and link
//! events.
//!
//! Grounded on `vlan_newlink`/`vlan_dellink` (link-appearance handling),
//! `vlan_newlink_tagged`/`vlan_dellink_tagged` (tagged-child creation),
//! `vlan_get_bridge`/`vlan_put_bridge`/`vlan_bridge_name` (refcounted bridge
//! lifecycle) and `vlan_if_add`/`vlan_if_remove` (per-station interface plus
//! WPA group / pre-auth snoop coupling) in the original. The race-condition
//! guard the original applies before dispatching a DELLINK event (skip if
//! the interface still resolves by index) is deliberately kept out of this
//! module and left to the netlink event dispatcher, since `remove_dynamic`
//! needs to tear an interface down through the exact same path without
//! being shadowed by that guard.

use tracing::{debug, warn};

use crate::bindings::BindingTable;
use crate::config::{VlanConfig, VlanNaming};
use crate::driver::{PortKind, TopologyDriver, VlanAddOutcome};
use crate::error::Result;
use crate::hooks::{PreauthSnoopHook, WpaGroupHook};
use crate::model::{CleanFlags, VlanDesc, VlanId};
use crate::registry::ResourceRegistry;

pub struct TopologyManager {
    driver: Box<dyn TopologyDriver>,
    wpa_hook: Box<dyn WpaGroupHook>,
    preauth_hook: Box<dyn PreauthSnoopHook>,
    registry: ResourceRegistry,
    bindings: BindingTable,
    config: VlanConfig,
}

impl TopologyManager {
    pub fn new(
        config: VlanConfig,
        driver: Box<dyn TopologyDriver>,
        wpa_hook: Box<dyn WpaGroupHook>,
        preauth_hook: Box<dyn PreauthSnoopHook>,
    ) -> Result<Self> {
        let bindings = BindingTable::init(&config)?;
        Ok(TopologyManager {
            driver,
            wpa_hook,
            preauth_hook,
            registry: ResourceRegistry::new(),
            bindings,
            config,
        })
    }

    /// Brings every statically configured (non-wildcard) binding up:
    /// creates the per-station interface and, for interfaces that already
    /// exist at startup, runs them straight through the same logic a
    /// NEWLINK event would (`vlan_dynamic_add`).
    pub async fn init(&mut self) -> Result<()> {
        self.driver
            .vlan_set_name_type(self.config.vlan_naming == VlanNaming::WithDevice)
            .await?;

        let concrete: Vec<usize> = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.vlan_id.is_wildcard())
            .map(|(i, _)| i)
            .collect();

        for idx in concrete {
            self.vlan_if_add(idx, true).await?;
            let ifname = self.bindings.get_mut(idx).unwrap().ifname.clone();
            self.newlink(&ifname).await?;
        }
        Ok(())
    }

    /// Tears down every remaining concrete binding (`vlan_dynamic_remove`).
    pub async fn deinit(&mut self) -> Result<()> {
        loop {
            let next = self
                .bindings
                .iter()
                .position(|b| !b.vlan_id.is_wildcard());
            let Some(idx) = next else { break };
            let ifname = self.bindings.get_mut(idx).unwrap().ifname.clone();
            self.dellink(&ifname).await?;
        }
        Ok(())
    }

    /// Handles a NEWLINK event for `ifname` (`vlan_newlink`).
    pub async fn handle_new_link(&mut self, ifname: &str) -> Result<()> {
        self.newlink(ifname).await
    }

    /// Handles a DELLINK event for `ifname`. The caller is responsible for
    /// the "interface still resolves, discard as a race" check; by the
    /// time this is called the interface is assumed gone.
    pub async fn handle_del_link(&mut self, ifname: &str) -> Result<()> {
        self.dellink(ifname).await
    }

    /// Returns whether `ifname` still resolves in the kernel, for the
    /// netlink dispatcher's race-condition guard on DELLINK events.
    pub async fn link_exists(&self, ifname: &str) -> Result<bool> {
        self.driver.link_exists(ifname).await
    }

    /// Materializes a new dynamic binding for `vlan_id` (`vlan_add_dynamic`
    /// plus the `vlan_if_add` call `vlan_dynamic_add` makes for it), or
    /// bumps the refcount of an existing one sharing the same VID.
    pub async fn add_dynamic(&mut self, vlan_id: u16, desc: VlanDesc) -> Result<Option<String>> {
        let Some(vid) = VlanId::new(vlan_id) else {
            return Ok(None);
        };
        if vid.is_wildcard() {
            return Ok(None);
        }

        if let Some(existing) = self.bindings.find_by_vlan_id_mut(vid) {
            existing.dynamic_vlan += 1;
            return Ok(Some(existing.ifname.clone()));
        }

        let Some(ifname) = self.bindings.dynamic_ifname(vid) else {
            return Ok(None);
        };
        let idx = self.bindings.insert_dynamic(ifname.clone(), vid, desc);
        if let Err(e) = self.vlan_if_add(idx, false).await {
            self.bindings.remove_at(idx);
            return Err(e);
        }
        Ok(Some(ifname))
    }

    /// Releases one reference to the dynamic binding assigned `vlan_id`,
    /// tearing it down once the last reference drops (`vlan_remove_dynamic`).
    pub async fn remove_dynamic(&mut self, vlan_id: u16) -> Result<()> {
        let Some(vid) = VlanId::new(vlan_id) else {
            return Ok(());
        };
        if vid.is_wildcard() {
            return Ok(());
        }
        let Some(binding) = self.bindings.find_by_vlan_id_mut(vid) else {
            return Ok(());
        };
        if binding.dynamic_vlan == 0 {
            return Ok(());
        }
        binding.dynamic_vlan -= 1;
        if binding.dynamic_vlan > 0 {
            return Ok(());
        }
        let ifname = binding.ifname.clone();
        self.dellink(&ifname).await
    }

    /// Creates (if missing) and brings up the per-station interface, then
    /// couples it to RSN pre-auth snooping and the WPA group state machine
    /// (`vlan_if_add`). WEP SSIDs refuse this outright.
    async fn vlan_if_add(&mut self, idx: usize, existsok: bool) -> Result<()> {
        let (ifname, vid) = {
            let b = self.bindings.get_mut(idx).expect("valid index");
            (b.ifname.clone(), b.vlan_id)
        };

        if self.config.wep_configured {
            return Err(crate::error::Error::WepVlanRejected { ifname });
        }

        if self.driver.link_exists(&ifname).await? {
            if !existsok {
                return Err(crate::error::Error::Kernel(nlink::Error::Kernel {
                    errno: libc::EEXIST,
                    message: format!("{ifname} already exists"),
                }));
            }
        } else {
            self.driver.station_if_add(&ifname).await?;
        }
        self.driver.ifup(&ifname).await?;

        let already_preauth = self.bindings.get_mut(idx).expect("valid index").preauth_active;
        if !already_preauth {
            self.preauth_hook.init(&ifname).await?;
            self.bindings.get_mut(idx).expect("valid index").preauth_active = true;
        }

        if let Err(e) = self.wpa_hook.ensure_group(vid.get()).await {
            warn!("WPA group setup for VLAN {vid} on {ifname} failed: {e}");
            if let Err(e2) = self.wpa_hook.release_group(vid.get()).await {
                warn!("releasing WPA group for VLAN {vid} failed: {e2}");
            }
            self.preauth_hook.deinit(&ifname).await.ok();
            if let Err(e3) = self.driver.station_if_remove(&ifname).await {
                warn!("removing station interface {ifname} failed: {e3}");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Releases the WPA group, stops pre-auth snooping, and removes the
    /// per-station interface (`vlan_if_remove`). Failures are logged, not
    /// escalated, matching the original.
    async fn vlan_if_remove(&mut self, idx: usize) {
        let (ifname, vid) = {
            let b = self.bindings.get_mut(idx).expect("valid index");
            (b.ifname.clone(), b.vlan_id)
        };
        if !vid.is_wildcard() {
            if let Err(e) = self.wpa_hook.release_group(vid.get()).await {
                warn!("releasing WPA group for VLAN {vid} failed: {e}");
            }
        }
        if let Err(e) = self.preauth_hook.deinit(&ifname).await {
            warn!("stopping pre-auth snoop on {ifname} failed: {e}");
        }
        if let Err(e) = self.driver.station_if_remove(&ifname).await {
            warn!("removing station interface {ifname} failed: {e}");
        }
    }

    /// Resolves the bridge name for `vid`: a script's `br_name` verb, then
    /// `<vlan_bridge><vid>`, then `br<trunk>.<vid>`, then `brvlan<vid>`
    /// (`vlan_bridge_name`).
    async fn resolve_br_name(&self, vid: u16) -> Result<String> {
        if let Some(name) = self
            .driver
            .br_name(
                &self.config.vlan_bridge,
                self.config.vlan_tagged_interface.as_deref(),
                vid,
            )
            .await?
        {
            return Ok(name);
        }
        if !self.config.vlan_bridge.is_empty() {
            return Ok(format!("{}{vid}", self.config.vlan_bridge));
        }
        if let Some(trunk) = &self.config.vlan_tagged_interface {
            return Ok(format!("br{trunk}.{vid}"));
        }
        Ok(format!("brvlan{vid}"))
    }

    /// Ensures the bridge for `vid` exists, creating it and (if a global
    /// tagged trunk is configured) its single tagged child on first use
    /// (`vlan_get_bridge`).
    async fn ensure_bridge(&mut self, vid: u16) -> Result<String> {
        let br_name = self.resolve_br_name(vid).await?;
        let created = matches!(
            self.driver.br_addbr(&br_name, vid).await,
            Ok(VlanAddOutcome::Created)
        );
        self.registry.get(
            &br_name,
            if created { CleanFlags::BR } else { CleanFlags::empty() },
        );
        self.driver.ifup(&br_name).await.ok();

        if let Some(trunk) = self.config.vlan_tagged_interface.clone() {
            self.newlink_tagged(self.config.vlan_naming, &trunk, &br_name, vid)
                .await?;
        }
        Ok(br_name)
    }

    /// Releases one reference on the bridge for `vid`, tearing down its
    /// global tagged child first and, once the last reference drops,
    /// removing the bridge itself -- skipping the `br_getnumports` guard
    /// entirely when a helper script is configured, since a script-backed
    /// bridge's port count isn't something this daemon can observe
    /// (`vlan_put_bridge`).
    async fn release_bridge(&mut self, br_name: &str, vid: u16) -> Result<()> {
        if let Some(trunk) = self.config.vlan_tagged_interface.clone() {
            self.dellink_tagged(self.config.vlan_naming, &trunk, br_name, vid)
                .await?;
        }

        let clean = self.registry.put(br_name);
        if !clean.contains(CleanFlags::BR) {
            return Ok(());
        }

        if self.config.vlan_script.is_none() {
            let ports = self.driver.br_getnumports(br_name).await?;
            if ports != 0 {
                debug!("bridge {br_name} still has {ports} ports, leaving it up");
                return Ok(());
            }
        }

        self.driver.ifdown(br_name).await.ok();
        if let Err(e) = self.driver.br_delbr(br_name, vid).await {
            warn!("deleting bridge {br_name} failed: {e}");
        }
        Ok(())
    }

    fn child_ifname(naming: VlanNaming, tagged_interface: &str, vid: u16) -> String {
        match naming {
            VlanNaming::WithDevice => format!("{tagged_interface}.{vid}"),
            VlanNaming::WithoutDevice => format!("vlan{vid}"),
        }
    }

    /// Creates the tagged VLAN child of `tagged_interface` for `vid` and
    /// adds it to `br_name`. Under a helper script the script itself is
    /// responsible for materializing the child interface, so `br_addif`
    /// is handed the trunk name plus the tag instead of a concrete child
    /// name (`vlan_newlink_tagged`).
    async fn newlink_tagged(
        &mut self,
        naming: VlanNaming,
        tagged_interface: &str,
        br_name: &str,
        vid: u16,
    ) -> Result<()> {
        let vlan_ifname = Self::child_ifname(naming, tagged_interface, vid);
        self.driver.ifup(tagged_interface).await.ok();

        let mut clean = CleanFlags::empty();
        if self.config.vlan_script.is_some() {
            if self
                .driver
                .br_addif(br_name, tagged_interface, PortKind::Tagged(vid))
                .await
                .is_ok()
            {
                clean |= CleanFlags::VLAN_PORT;
            }
        } else {
            if matches!(
                self.driver.vlan_add(tagged_interface, vid, &vlan_ifname).await,
                Ok(VlanAddOutcome::Created)
            ) {
                clean |= CleanFlags::VLAN;
            }
            if self
                .driver
                .br_addif(br_name, &vlan_ifname, PortKind::Tagged(vid))
                .await
                .is_ok()
            {
                clean |= CleanFlags::VLAN_PORT;
            }
        }
        self.registry.get(&vlan_ifname, clean);
        self.driver.ifup(&vlan_ifname).await.ok();
        Ok(())
    }

    /// Mirror of [`Self::newlink_tagged`] (`vlan_dellink_tagged`).
    async fn dellink_tagged(
        &mut self,
        naming: VlanNaming,
        tagged_interface: &str,
        br_name: &str,
        vid: u16,
    ) -> Result<()> {
        let vlan_ifname = Self::child_ifname(naming, tagged_interface, vid);
        let clean = self.registry.put(&vlan_ifname);

        if self.config.vlan_script.is_some() {
            if clean.contains(CleanFlags::VLAN_PORT) {
                if let Err(e) = self
                    .driver
                    .br_delif(br_name, tagged_interface, PortKind::Tagged(vid))
                    .await
                {
                    warn!("removing tagged port {tagged_interface} from {br_name} failed: {e}");
                }
            }
        } else {
            if clean.contains(CleanFlags::VLAN_PORT) {
                if let Err(e) = self
                    .driver
                    .br_delif(br_name, &vlan_ifname, PortKind::Tagged(vid))
                    .await
                {
                    warn!("removing tagged port {vlan_ifname} from {br_name} failed: {e}");
                }
            }
            if clean.contains(CleanFlags::VLAN) {
                self.driver.ifdown(&vlan_ifname).await.ok();
                if let Err(e) = self.driver.vlan_rem(&vlan_ifname).await {
                    warn!("removing VLAN interface {vlan_ifname} failed: {e}");
                }
            }
        }
        Ok(())
    }

    /// The core NEWLINK handler: finds the first unconfigured binding
    /// matching `ifname`, wires it into its untagged/tagged bridges (or
    /// the flat bridge, for non-VLAN stations), and brings it up
    /// (`vlan_newlink`).
    async fn newlink(&mut self, ifname: &str) -> Result<()> {
        let Some(idx) = self
            .bindings
            .iter()
            .position(|b| b.ifname == ifname && !b.configured)
        else {
            debug!("NEWLINK for {ifname}: no unconfigured binding, dropping");
            return Ok(());
        };

        self.bindings.get_mut(idx).expect("valid index").configured = true;
        let desc = self.bindings.get_mut(idx).expect("valid index").vlan_desc.clone();

        let mut clean = CleanFlags::empty();
        if desc.is_empty() {
            if !self.config.bridge.is_empty() {
                if self
                    .driver
                    .br_addif(&self.config.bridge, ifname, PortKind::Plain)
                    .await
                    .is_ok()
                {
                    clean |= CleanFlags::WLAN_PORT;
                }
            }
        } else if let Some(untagged) = desc.untagged {
            let br_name = self.ensure_bridge(untagged.get()).await?;
            if self
                .driver
                .br_addif(&br_name, ifname, PortKind::Untagged(untagged.get()))
                .await
                .is_ok()
            {
                clean |= CleanFlags::WLAN_PORT;
            }
        }
        self.bindings.get_mut(idx).expect("valid index").clean |= clean;

        for vid in desc.distinct_tagged() {
            let br_name = self.ensure_bridge(vid.get()).await?;
            self.newlink_tagged(VlanNaming::WithDevice, ifname, &br_name, vid.get())
                .await?;
        }

        self.driver.ifup(ifname).await.ok();

        let already_preauth = self.bindings.get_mut(idx).expect("valid index").preauth_active;
        if !already_preauth {
            self.preauth_hook.init(ifname).await?;
            self.bindings.get_mut(idx).expect("valid index").preauth_active = true;
        }
        Ok(())
    }

    /// The core DELLINK handler: undoes whatever [`Self::newlink`] set up
    /// for `ifname`, then removes the station interface and unlinks the
    /// binding from the table regardless of whether it was ever configured
    /// (`vlan_dellink`, including its `skip_counting` path for a binding
    /// that never saw a NEWLINK).
    async fn dellink(&mut self, ifname: &str) -> Result<()> {
        let Some(idx) = self.bindings.index_of_ifname(ifname) else {
            debug!("DELLINK for {ifname}: no matching binding");
            return Ok(());
        };

        let binding = self.bindings.get_mut(idx).expect("valid index");
        let configured = binding.configured;
        let desc = binding.vlan_desc.clone();
        let clean = binding.clean;

        if configured {
            for vid in desc.distinct_tagged() {
                let br_name = self.resolve_br_name(vid.get()).await?;
                self.dellink_tagged(VlanNaming::WithDevice, ifname, &br_name, vid.get())
                    .await?;
                self.release_bridge(&br_name, vid.get()).await?;
            }

            if desc.is_empty() {
                if !self.config.bridge.is_empty() && clean.contains(CleanFlags::WLAN_PORT) {
                    if let Err(e) = self
                        .driver
                        .br_delif(&self.config.bridge, ifname, PortKind::Plain)
                        .await
                    {
                        warn!("removing {ifname} from {} failed: {e}", self.config.bridge);
                    }
                }
            } else if let Some(untagged) = desc.untagged {
                let br_name = self.resolve_br_name(untagged.get()).await?;
                if clean.contains(CleanFlags::WLAN_PORT) {
                    if let Err(e) = self
                        .driver
                        .br_delif(&br_name, ifname, PortKind::Untagged(untagged.get()))
                        .await
                    {
                        warn!("removing {ifname} from {br_name} failed: {e}");
                    }
                }
                self.release_bridge(&br_name, untagged.get()).await?;
            }
        }

        self.vlan_if_remove(idx).await;
        self.bindings.remove_at(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{ConfiguredBinding, DynamicVlan, VlanNaming};
    use crate::hooks::{NullPreauthHook, NullWpaHook};

    /// A [`TopologyDriver`] double that records every call it receives
    /// (in order) instead of touching the kernel, so tests can assert on
    /// the sequence `TopologyManager` issues calls in. The log is kept
    /// behind a shared handle so it's still readable after the driver
    /// itself has been moved into a `Box<dyn TopologyDriver>`.
    struct RecordingDriver {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingDriver {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            (RecordingDriver { log: log.clone() }, log)
        }

        fn record(&self, call: impl Into<String>) {
            self.log.lock().unwrap().push(call.into());
        }
    }

    fn calls(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn position(log: &Arc<Mutex<Vec<String>>>, needle: &str) -> Option<usize> {
        calls(log).iter().position(|c| c.starts_with(needle))
    }

    #[async_trait]
    impl TopologyDriver for RecordingDriver {
        async fn ifup(&self, ifname: &str) -> Result<()> {
            self.record(format!("ifup {ifname}"));
            Ok(())
        }

        async fn ifdown(&self, ifname: &str) -> Result<()> {
            self.record(format!("ifdown {ifname}"));
            Ok(())
        }

        async fn link_exists(&self, ifname: &str) -> Result<bool> {
            self.record(format!("link_exists {ifname}"));
            Ok(false)
        }

        async fn vlan_add(&self, trunk: &str, vid: u16, vlan_ifname: &str) -> Result<VlanAddOutcome> {
            self.record(format!("vlan_add {trunk} {vid} {vlan_ifname}"));
            Ok(VlanAddOutcome::Created)
        }

        async fn vlan_rem(&self, vlan_ifname: &str) -> Result<()> {
            self.record(format!("vlan_rem {vlan_ifname}"));
            Ok(())
        }

        async fn vlan_set_name_type(&self, with_device: bool) -> Result<()> {
            self.record(format!("vlan_set_name_type {with_device}"));
            Ok(())
        }

        async fn br_addbr(&self, br_name: &str, vid: u16) -> Result<VlanAddOutcome> {
            self.record(format!("br_addbr {br_name} {vid}"));
            Ok(VlanAddOutcome::Created)
        }

        async fn br_delbr(&self, br_name: &str, vid: u16) -> Result<()> {
            self.record(format!("br_delbr {br_name} {vid}"));
            Ok(())
        }

        async fn br_addif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()> {
            self.record(format!("br_addif {br_name} {ifname} {kind:?}"));
            Ok(())
        }

        async fn br_delif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()> {
            self.record(format!("br_delif {br_name} {ifname} {kind:?}"));
            Ok(())
        }

        async fn br_getnumports(&self, br_name: &str) -> Result<u32> {
            self.record(format!("br_getnumports {br_name}"));
            Ok(0)
        }

        async fn station_if_add(&self, ifname: &str) -> Result<()> {
            self.record(format!("station_if_add {ifname}"));
            Ok(())
        }

        async fn station_if_remove(&self, ifname: &str) -> Result<()> {
            self.record(format!("station_if_remove {ifname}"));
            Ok(())
        }
    }

    fn config_with(bindings: Vec<ConfiguredBinding>, wep_configured: bool) -> VlanConfig {
        VlanConfig {
            iface: "wlan0".into(),
            vlan_naming: VlanNaming::WithoutDevice,
            vlan_tagged_interface: None,
            vlan_bridge: "br".into(),
            vlan_script: None,
            bridge: String::new(),
            per_sta_vif: false,
            dynamic_vlan: DynamicVlan::Required,
            vlan_bindings: bindings,
            wep_configured,
        }
    }

    fn manager_with(driver: RecordingDriver, config: VlanConfig) -> TopologyManager {
        TopologyManager::new(
            config,
            Box::new(driver),
            Box::new(NullWpaHook),
            Box::new(NullPreauthHook),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn new_link_brings_bridge_up_before_enslaving_the_port() {
        let binding = ConfiguredBinding {
            ifname: "wlan0.5".into(),
            vlan_id: 5,
            untagged: Some(5),
            tagged: Vec::new(),
        };
        let (driver, log) = RecordingDriver::new();
        let mut manager = manager_with(driver, config_with(vec![binding], false));

        manager.handle_new_link("wlan0.5").await.unwrap();

        let addbr = position(&log, "br_addbr").expect("br_addbr called");
        let addif = position(&log, "br_addif").expect("br_addif called");
        assert!(addbr < addif, "bridge must be created before enrolling the port");
    }

    #[tokio::test]
    async fn new_link_for_unknown_ifname_is_a_silent_noop() {
        let (driver, _log) = RecordingDriver::new();
        let mut manager = manager_with(driver, config_with(Vec::new(), false));
        manager.handle_new_link("ghost0").await.unwrap();
    }

    #[tokio::test]
    async fn wep_configured_rejects_dynamic_vlan_setup() {
        let (driver, _log) = RecordingDriver::new();
        let mut manager = manager_with(driver, config_with(Vec::new(), true));
        let err = manager.add_dynamic(7, VlanDesc::default()).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::WepVlanRejected { .. }));
    }

    #[tokio::test]
    async fn add_dynamic_shares_binding_for_repeated_vlan_id() {
        let (driver, _log) = RecordingDriver::new();
        let mut manager = manager_with(driver, config_with(Vec::new(), false));

        let first = manager.add_dynamic(9, VlanDesc::default()).await.unwrap();
        let second = manager.add_dynamic(9, VlanDesc::default()).await.unwrap();
        assert_eq!(first, second);

        let vid = VlanId::new(9).unwrap();
        assert_eq!(manager.bindings.find_by_vlan_id(vid).unwrap().dynamic_vlan, 2);
    }

    #[tokio::test]
    async fn remove_dynamic_only_tears_down_on_last_reference() {
        let (driver, _log) = RecordingDriver::new();
        let mut manager = manager_with(driver, config_with(Vec::new(), false));

        manager.add_dynamic(3, VlanDesc::default()).await.unwrap();
        manager.add_dynamic(3, VlanDesc::default()).await.unwrap();

        let vid = VlanId::new(3).unwrap();
        manager.remove_dynamic(3).await.unwrap();
        assert!(manager.bindings.find_by_vlan_id(vid).is_some());

        manager.remove_dynamic(3).await.unwrap();
        assert!(manager.bindings.find_by_vlan_id(vid).is_none());
    }
}
