//! Strongly-typed netlink message structures.
//!
//! # Example
//!
//! ```ignore
//! use nlink::netlink::messages::LinkMessage;
//! use nlink::netlink::parse::FromNetlink;
//!
//! // Parse from raw netlink data
//! let msg = LinkMessage::from_bytes(&data)?;
//! println!("Interface: {}", msg.name.as_deref().unwrap_or("?"));
//! ```

mod link;

pub use link::*;
