//! Typed netlink message headers and constants, grouped by message family.

pub mod link;
