//! Helper-script-backed [`TopologyDriver`].
//!
//! Grounded on `run_script` in the original: fork/exec with an optional
//! pipe on stdout, `waitid(..., WEXITED)`, and a hard distinction between
//! a clean non-zero exit (soft failure) and death by signal (hard
//! failure). `tokio::process::Command` plus `ExitStatus::code()` /
//! `ExitStatus::signal()` gives the same distinction without hand-rolling
//! the wait loop.

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

use super::{PortKind, TopologyDriver, VlanAddOutcome};

pub struct ScriptDriver {
    script: String,
}

impl ScriptDriver {
    pub fn new(script: impl Into<String>) -> Self {
        ScriptDriver {
            script: script.into(),
        }
    }

    /// Runs the script with `verb` and `args`, discarding stdout.
    /// Returns `Ok(())` on a clean zero exit, `Err(ScriptFailed)` on a
    /// clean non-zero exit, and `Err(ScriptSignalDeath)` on signal death.
    async fn run(&self, verb: &str, args: &[&str]) -> Result<()> {
        let status = Command::new(&self.script)
            .arg(verb)
            .args(args)
            .status()
            .await?;
        self.judge(status)
    }

    /// Runs the script capturing stdout, returning the first line
    /// (trimmed) on success.
    async fn run_capturing(&self, verb: &str, args: &[&str]) -> Result<Option<String>> {
        let output = Command::new(&self.script)
            .arg(verb)
            .args(args)
            .output()
            .await?;
        if self.judge(output.status).is_err() {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        Ok((!line.is_empty()).then_some(line))
    }

    fn judge(&self, status: std::process::ExitStatus) -> Result<()> {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(Error::ScriptSignalDeath { signal });
        }
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(Error::ScriptFailed { exit_code: code }),
            None => Ok(()),
        }
    }
}

fn kind_args(vid_buf: &mut String, kind: PortKind) -> Vec<&'static str> {
    match kind {
        PortKind::Plain => Vec::new(),
        PortKind::Untagged(vid) => {
            *vid_buf = vid.to_string();
            vec!["untagged"]
        }
        PortKind::Tagged(vid) => {
            *vid_buf = vid.to_string();
            vec!["tagged"]
        }
    }
}

#[async_trait]
impl TopologyDriver for ScriptDriver {
    async fn ifup(&self, ifname: &str) -> Result<()> {
        // The script protocol has no verb for this; the helper script is
        // expected to bring interfaces up itself as part of br_addif.
        let _ = ifname;
        Ok(())
    }

    async fn ifdown(&self, ifname: &str) -> Result<()> {
        let _ = ifname;
        Ok(())
    }

    async fn link_exists(&self, ifname: &str) -> Result<bool> {
        let cname = std::ffi::CString::new(ifname).map_err(|_| Error::NameTooLong(ifname.into()))?;
        Ok(unsafe { libc::if_nametoindex(cname.as_ptr()) } != 0)
    }

    async fn vlan_add(&self, _trunk: &str, _vid: u16, _vlan_ifname: &str) -> Result<VlanAddOutcome> {
        // VLAN child creation is folded into `br_addif` under the script
        // path; there is no standalone verb for it.
        Ok(VlanAddOutcome::Created)
    }

    async fn vlan_rem(&self, _vlan_ifname: &str) -> Result<()> {
        Ok(())
    }

    async fn vlan_set_name_type(&self, _with_device: bool) -> Result<()> {
        Ok(())
    }

    async fn br_name(&self, prefix: &str, trunk: Option<&str>, vid: u16) -> Result<Option<String>> {
        let vid_str = vid.to_string();
        let trunk_arg = trunk.unwrap_or("");
        self.run_capturing("br_name", &[prefix, trunk_arg, &vid_str])
            .await
    }

    async fn br_addbr(&self, br_name: &str, vid: u16) -> Result<VlanAddOutcome> {
        // The script protocol has no verb to report "already existed"
        // separately from "created"; a clean exit always counts as
        // created, matching the original's script-mode handling of
        // `br_addbr`'s return value.
        let vid_str = vid.to_string();
        self.run("br_addbr", &[br_name, &vid_str]).await?;
        Ok(VlanAddOutcome::Created)
    }

    async fn br_delbr(&self, br_name: &str, vid: u16) -> Result<()> {
        let vid_str = vid.to_string();
        self.run("br_delbr", &[br_name, &vid_str]).await
    }

    async fn br_addif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()> {
        let mut vid_buf = String::new();
        let tail = kind_args(&mut vid_buf, kind);
        let mut args = vec![br_name, ifname];
        args.extend(tail);
        if !vid_buf.is_empty() {
            args.push(&vid_buf);
        }
        self.run("br_addif", &args).await
    }

    async fn br_delif(&self, br_name: &str, ifname: &str, kind: PortKind) -> Result<()> {
        let mut vid_buf = String::new();
        let tail = kind_args(&mut vid_buf, kind);
        let mut args = vec![br_name, ifname];
        args.extend(tail);
        if !vid_buf.is_empty() {
            args.push(&vid_buf);
        }
        self.run("br_delif", &args).await
    }

    async fn br_getnumports(&self, br_name: &str) -> Result<u32> {
        // No verb exists for this; the topology manager never asks a
        // script-backed driver to answer it (see `br_delbr`'s teardown
        // guard, which is skipped entirely when a script is configured).
        let _ = br_name;
        Ok(0)
    }

    async fn station_if_add(&self, ifname: &str) -> Result<()> {
        let _ = ifname;
        Ok(())
    }

    async fn station_if_remove(&self, ifname: &str) -> Result<()> {
        let _ = ifname;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_args_plain_has_no_tail() {
        let mut buf = String::new();
        assert!(kind_args(&mut buf, PortKind::Plain).is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn kind_args_tagged_carries_vid() {
        let mut buf = String::new();
        let tail = kind_args(&mut buf, PortKind::Tagged(42));
        assert_eq!(tail, vec!["tagged"]);
        assert_eq!(buf, "42");
    }
}
