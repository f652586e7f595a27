//! High-level event stream API for link (interface) monitoring.
//!
//! # Example
//!
//! ```ignore
//! use nlink::netlink::events::{EventStream, NetworkEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stream = EventStream::builder().links(true).build()?;
//!
//!     while let Some(event) = stream.next().await? {
//!         match event {
//!             NetworkEvent::NewLink(link) => {
//!                 println!("New link: {}", link.name.as_deref().unwrap_or("?"));
//!             }
//!             NetworkEvent::DelLink(link) => {
//!                 println!("Deleted link: {}", link.name.as_deref().unwrap_or("?"));
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use super::connection::Connection;
use super::message::{MessageIter, NlMsgType};
use super::messages::LinkMessage;
use super::parse::FromNetlink;
use super::protocol::Route;
use super::socket::rtnetlink_groups::*;
use super::Result;

/// Link events received from the kernel.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A new link was created or an existing link changed.
    NewLink(LinkMessage),
    /// A link was deleted.
    DelLink(LinkMessage),
}

impl NetworkEvent {
    /// Returns true if this is a "new" event (add or change).
    pub fn is_new(&self) -> bool {
        matches!(self, NetworkEvent::NewLink(_))
    }

    /// Returns true if this is a "delete" event.
    pub fn is_del(&self) -> bool {
        !self.is_new()
    }

    /// Returns the interface index associated with this event.
    pub fn ifindex(&self) -> i32 {
        match self {
            NetworkEvent::NewLink(m) | NetworkEvent::DelLink(m) => m.ifindex(),
        }
    }

    /// Returns the link message carried by this event.
    pub fn link(&self) -> &LinkMessage {
        match self {
            NetworkEvent::NewLink(m) | NetworkEvent::DelLink(m) => m,
        }
    }
}

/// Builder for configuring a link event stream.
#[derive(Debug, Default)]
pub struct EventStreamBuilder {
    links: bool,
}

impl EventStreamBuilder {
    /// Create a new builder with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to link (interface) events.
    pub fn links(mut self, enabled: bool) -> Self {
        self.links = enabled;
        self
    }

    /// Subscribe to all event types this stream supports.
    pub fn all(self) -> Self {
        self.links(true)
    }

    /// Build the event stream.
    pub fn build(self) -> Result<EventStream> {
        let mut conn = Connection::<Route>::new()?;

        if self.links {
            conn.subscribe(RTNLGRP_LINK)?;
        }

        Ok(EventStream {
            conn,
            buffer: Vec::new(),
            pending_events: Vec::new(),
        })
    }
}

/// A stream of link events.
///
/// Use [`EventStream::builder()`] to configure which events to receive.
pub struct EventStream {
    conn: Connection<Route>,
    buffer: Vec<u8>,
    pending_events: Vec<NetworkEvent>,
}

impl EventStream {
    /// Create a builder for configuring the event stream.
    pub fn builder() -> EventStreamBuilder {
        EventStreamBuilder::new()
    }

    /// Receive the next event.
    ///
    /// This method blocks until an event is received. Returns `None` if
    /// the connection is closed.
    pub async fn next(&mut self) -> Result<Option<NetworkEvent>> {
        if let Some(event) = self.pending_events.pop() {
            return Ok(Some(event));
        }

        self.buffer = self.conn.recv_event().await?;

        for result in MessageIter::new(&self.buffer) {
            let (header, payload) = result?;

            if let Some(event) = parse_event(header.nlmsg_type, payload) {
                self.pending_events.push(event);
            }
        }

        self.pending_events.reverse();
        Ok(self.pending_events.pop())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection<Route> {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection.
    pub fn connection_mut(&mut self) -> &mut Connection<Route> {
        &mut self.conn
    }
}

/// Parse a netlink message into a link event. Any message type other than
/// RTM_NEWLINK/RTM_DELLINK is ignored.
fn parse_event(msg_type: u16, payload: &[u8]) -> Option<NetworkEvent> {
    match msg_type {
        t if t == NlMsgType::RTM_NEWLINK => LinkMessage::from_bytes(payload)
            .ok()
            .map(NetworkEvent::NewLink),
        t if t == NlMsgType::RTM_DELLINK => LinkMessage::from_bytes(payload)
            .ok()
            .map(NetworkEvent::DelLink),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = EventStreamBuilder::new();
        assert!(!builder.links);
    }

    #[test]
    fn test_builder_chaining() {
        let builder = EventStreamBuilder::new().links(true);
        assert!(builder.links);
    }

    #[test]
    fn test_builder_all() {
        let builder = EventStreamBuilder::new().all();
        assert!(builder.links);
    }
}
