//! Async netlink protocol implementation for Linux.
//!
//! This crate implements the slice of RTNetlink needed to observe and
//! reconfigure link topology: bringing interfaces up and down, creating
//! bridge and 802.1Q VLAN interfaces, and enslaving/releasing them to a
//! bridge master.
//!
//! # Strongly-Typed API
//!
//! The `parse` module provides traits for zero-copy parsing and serialization:
//!
//! ```ignore
//! use nlink::netlink::parse::{FromNetlink, ToNetlink};
//! use nlink::netlink::messages::LinkMessage;
//!
//! // Parse a netlink message
//! let msg = LinkMessage::from_bytes(&data)?;
//!
//! // Serialize back to bytes
//! let bytes = msg.to_bytes()?;
//! ```
//!
//! # Event Monitoring
//!
//! The `events` module provides a high-level API for monitoring link changes:
//!
//! ```ignore
//! use nlink::netlink::events::{EventStream, NetworkEvent};
//!
//! let mut stream = EventStream::builder().links(true).build()?;
//!
//! while let Some(event) = stream.next().await? {
//!     match event {
//!         NetworkEvent::NewLink(link) => println!("New link: {:?}", link.name),
//!         NetworkEvent::DelLink(link) => println!("Deleted link: {:?}", link.name),
//!     }
//! }
//! ```

pub mod attr;
mod builder;
pub mod connection;
mod error;
pub mod events;
pub mod link;
pub mod message;
pub mod messages;
pub mod parse;
mod protocol;
mod socket;
pub mod types;

pub use attr::{AttrIter, NlAttr};
pub use builder::{MessageBuilder, NestToken};
pub use connection::Connection;
pub use error::{Error, Result};
pub use link::{BridgeLink, LinkConfig, VlanLink};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use parse::{FromNetlink, ToNetlink};
pub use protocol::{ProtocolState, Route};
pub use socket::{NetlinkSocket, Protocol, rtnetlink_groups};
