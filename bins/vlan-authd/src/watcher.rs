//! Feeds `RTM_NEWLINK`/`RTM_DELLINK` events into the [`TopologyManager`].
//!
//! Grounded on `full_dynamic_vlan_init`/`vlan_event_receive` in the
//! original, which open a raw `NETLINK_ROUTE` socket bound to
//! `RTMGRP_LINK` and dispatch each message to `vlan_newlink`/`vlan_dellink`.
//! `nlink`'s [`EventStream`] replaces the raw socket plumbing; the
//! DELLINK race guard (`if (del && if_nametoindex(ifname)) return;`) is
//! reproduced here rather than inside the topology manager, since
//! `TopologyManager::remove_dynamic` needs the same teardown path without
//! that guard.

use nlink::netlink::events::{EventStream, NetworkEvent};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::topology::TopologyManager;

pub struct Watcher {
    stream: EventStream,
}

impl Watcher {
    pub fn new() -> Result<Self> {
        let stream = EventStream::builder()
            .links(true)
            .build()
            .map_err(crate::error::Error::Kernel)?;
        Ok(Watcher { stream })
    }

    /// Runs the event loop until the stream ends or a fatal error occurs.
    /// Per-event errors are logged and do not stop the loop, matching the
    /// original's habit of logging and continuing on a single failed
    /// bridge/port operation rather than tearing down the whole daemon.
    pub async fn run(&mut self, topology: &mut TopologyManager) -> Result<()> {
        loop {
            let event = match self.stream.next().await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    info!("netlink event stream closed");
                    return Ok(());
                }
                Err(e) => return Err(crate::error::Error::Kernel(e)),
            };

            let Some(ifname) = event.link().name.clone() else {
                continue;
            };

            match event {
                NetworkEvent::NewLink(_) => {
                    debug!("NEWLINK {ifname}");
                    if let Err(e) = topology.handle_new_link(&ifname).await {
                        warn!("handling NEWLINK for {ifname} failed: {e}");
                    }
                }
                NetworkEvent::DelLink(_) => {
                    match topology.link_exists(&ifname).await {
                        Ok(true) => {
                            debug!("DELLINK {ifname}: still resolves, discarding as a race");
                        }
                        Ok(false) => {
                            debug!("DELLINK {ifname}");
                            if let Err(e) = topology.handle_del_link(&ifname).await {
                                warn!("handling DELLINK for {ifname} failed: {e}");
                            }
                        }
                        Err(e) => {
                            warn!("checking existence of {ifname} before DELLINK failed: {e}");
                        }
                    }
                }
            }
        }
    }
}
