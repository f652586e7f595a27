//! Interface name validation shared by both driver backends.
//!
//! Grounded on the `(os_strlen(if_name) + 1) > sizeof(if_request.device1)`
//! checks repeated throughout `vlan_init.c`'s ioctl paths; `IFNAMSIZ` is 16
//! bytes including the NUL terminator, so 15 usable characters.

use crate::error::{Error, Result};

pub const IFNAMSIZ: usize = 16;

pub fn validate_ifname(name: &str) -> Result<()> {
    if name.is_empty() || name.len() >= IFNAMSIZ {
        return Err(Error::NameTooLong(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_names_at_or_over_the_limit() {
        assert!(validate_ifname(&"a".repeat(15)).is_ok());
        assert!(validate_ifname(&"a".repeat(16)).is_err());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_ifname("").is_err());
    }
}
