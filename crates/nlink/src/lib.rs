//! Async netlink library for Linux network configuration.
//!
//! This crate implements the slice of RTNetlink needed to observe and
//! reconfigure link topology on behalf of a dynamic VLAN subsystem:
//! creating 802.1Q VLAN interfaces, creating bridges, enslaving/releasing
//! interfaces to a bridge master, and bringing interfaces up or down.
//!
//! # Example
//!
//! ```ignore
//! use nlink::netlink::{Connection, Route};
//!
//! #[tokio::main]
//! async fn main() -> nlink::netlink::Result<()> {
//!     let conn = Connection::<Route>::new()?;
//!
//!     let links = conn.get_links().await?;
//!     for link in &links {
//!         println!("{}: {}", link.ifindex(), link.name.as_deref().unwrap_or("?"));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Link State and Topology Management
//!
//! ```ignore
//! use nlink::netlink::{Connection, Route};
//! use nlink::netlink::link::{BridgeLink, VlanLink};
//!
//! let conn = Connection::<Route>::new()?;
//!
//! conn.add_link(BridgeLink::new("brvlan100")).await?;
//! conn.add_link(VlanLink::new("eth0.100", "eth0", 100)).await?;
//! conn.set_link_master("eth0.100", "brvlan100").await?;
//! conn.set_link_up("brvlan100").await?;
//! ```
//!
//! # Event Monitoring
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

pub mod netlink;
pub mod util;

pub use netlink::{Connection, Error, Protocol, Result, Route};
pub use netlink::{EventStream, EventStreamBuilder, NetworkEvent};
pub use netlink::{BridgeLink, LinkConfig, VlanLink};
pub use netlink::messages::LinkMessage;
