//! Shared-resource registry: reference-counts bridges and VLAN interfaces
//! that more than one station binding may depend on.
//!
//! Grounded on `dyn_iface_get`/`dyn_iface_put` in the original, which track
//! a singly linked list of `dynamic_iface` entries keyed by interface name.
//! A `HashMap` replaces the list; the get/put semantics are unchanged.

use std::collections::HashMap;

use crate::model::{CleanFlags, SharedResourceEntry};

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<String, SharedResourceEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        ResourceRegistry::default()
    }

    /// Increments the refcount for `name`, OR-ing in `clean`. If `name`
    /// isn't tracked yet, a new entry is created only when `clean` is
    /// non-empty — an untracked resource with nothing to clean up is not
    /// worth remembering, matching the original's early return when
    /// `!clean`.
    pub fn get(&mut self, name: &str, clean: CleanFlags) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.usage += 1;
            entry.clean |= clean;
            return;
        }
        if clean.is_empty() {
            return;
        }
        self.entries
            .insert(name.to_string(), SharedResourceEntry::new(name, clean));
    }

    /// Decrements the refcount for `name`. Returns the accumulated clean
    /// flags iff this was the last reference (the entry is then removed);
    /// returns `CleanFlags::empty()` if `name` isn't tracked or references
    /// remain.
    pub fn put(&mut self, name: &str) -> CleanFlags {
        let Some(entry) = self.entries.get_mut(name) else {
            return CleanFlags::empty();
        };
        entry.usage -= 1;
        if entry.usage > 0 {
            return CleanFlags::empty();
        }
        let clean = entry.clean;
        self.entries.remove(name);
        clean
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[cfg(test)]
    pub fn usage(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|e| e.usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_get_without_clean_bits_is_a_noop() {
        let mut reg = ResourceRegistry::new();
        reg.get("br0", CleanFlags::empty());
        assert!(!reg.contains("br0"));
    }

    #[test]
    fn get_then_get_accumulates_usage_and_clean_bits() {
        let mut reg = ResourceRegistry::new();
        reg.get("br0", CleanFlags::BR);
        reg.get("br0", CleanFlags::VLAN_PORT);
        assert_eq!(reg.usage("br0"), Some(2));
    }

    #[test]
    fn put_only_returns_clean_bits_on_last_reference() {
        let mut reg = ResourceRegistry::new();
        reg.get("br0", CleanFlags::BR);
        reg.get("br0", CleanFlags::empty());
        assert_eq!(reg.put("br0"), CleanFlags::empty());
        assert_eq!(reg.put("br0"), CleanFlags::BR);
        assert!(!reg.contains("br0"));
    }

    #[test]
    fn put_on_untracked_name_is_empty() {
        let mut reg = ResourceRegistry::new();
        assert_eq!(reg.put("ghost0"), CleanFlags::empty());
    }
}
