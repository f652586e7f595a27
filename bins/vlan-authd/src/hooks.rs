//! Hooks into the two subsystems the original couples to VLAN interface
//! lifecycle but that live outside this daemon's scope: the WPA
//! authenticator's per-VID group state machine (`wpa_auth_ensure_group`/
//! `wpa_auth_release_group`) and RSN pre-authentication snooping
//! (`rsn_preauth_snoop_init`/`_deinit`, compiled in only under
//! `CONFIG_RSN_PREAUTH_COPY`).
//!
//! Kept as traits so the topology manager can be exercised without a real
//! 802.1X/WPA stack attached.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait WpaGroupHook: Send + Sync {
    /// Ensures the WPA group state machine for `vid` exists, creating it
    /// if necessary (`wpa_auth_ensure_group`).
    async fn ensure_group(&self, vid: u16) -> Result<()>;

    /// Releases the WPA group state machine for `vid`
    /// (`wpa_auth_release_group`). Failure is logged by the caller, never
    /// escalated — matching the original, which only logs on non-zero
    /// return.
    async fn release_group(&self, vid: u16) -> Result<()>;
}

#[async_trait]
pub trait PreauthSnoopHook: Send + Sync {
    /// Starts snooping `ifname` for RSN pre-authentication frames
    /// (`rsn_preauth_snoop_init`).
    async fn init(&self, ifname: &str) -> Result<()>;

    /// Stops snooping `ifname` (`rsn_preauth_snoop_deinit`).
    async fn deinit(&self, ifname: &str) -> Result<()>;
}

/// No-op [`WpaGroupHook`] for configurations or tests with no WPA
/// authenticator attached.
pub struct NullWpaHook;

#[async_trait]
impl WpaGroupHook for NullWpaHook {
    async fn ensure_group(&self, _vid: u16) -> Result<()> {
        Ok(())
    }

    async fn release_group(&self, _vid: u16) -> Result<()> {
        Ok(())
    }
}

/// No-op [`PreauthSnoopHook`] for configurations with pre-auth snooping
/// disabled (the common case; the original compiles it out entirely
/// unless `CONFIG_RSN_PREAUTH_COPY` is set).
pub struct NullPreauthHook;

#[async_trait]
impl PreauthSnoopHook for NullPreauthHook {
    async fn init(&self, _ifname: &str) -> Result<()> {
        Ok(())
    }

    async fn deinit(&self, _ifname: &str) -> Result<()> {
        Ok(())
    }
}
