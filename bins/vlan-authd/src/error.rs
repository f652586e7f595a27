//! Error types for the VLAN topology daemon.

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An interface name built from a trunk/VID pair exceeded `IFNAMSIZ`.
    #[error("interface name too long: '{0}'")]
    NameTooLong(String),

    /// Propagated from the netlink layer (link/bridge/VLAN kernel calls).
    #[error(transparent)]
    Kernel(#[from] nlink::Error),

    /// A configured helper script exited with a non-zero status.
    #[error("helper script exited with status {exit_code}")]
    ScriptFailed { exit_code: i32 },

    /// A configured helper script was killed by a signal.
    #[error("helper script killed by signal {signal}")]
    ScriptSignalDeath { signal: i32 },

    /// A station's SSID has static WEP keys configured; dynamic VLANs
    /// plus WEP group rekeying don't mix and are refused outright.
    #[error("refusing to set up VLAN interface {ifname}: WEP is configured")]
    WepVlanRejected { ifname: String },

    /// An I/O error unrelated to a specific kernel errno (e.g. spawning a
    /// helper script).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file failed to parse.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kernel(e) if e.is_not_found())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Kernel(e) if e.is_busy())
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::Kernel(e) if e.is_already_exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_too_long_message() {
        let err = Error::NameTooLong("eth0.999999".into());
        assert!(err.to_string().contains("eth0.999999"));
    }

    #[test]
    fn script_signal_death_message() {
        let err = Error::ScriptSignalDeath { signal: 9 };
        assert!(err.to_string().contains('9'));
    }
}
