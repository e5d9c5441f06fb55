use std::{default::Default, net::SocketAddr, time::Duration};

use modbox_shared::MarshalConfig;

/// Contains Config properties which will be used by the ModuleServer
#[derive(Clone)]
pub struct ServerConfig {
    /// Address the acceptor binds to
    pub listen_addr: SocketAddr,
    /// Wire encoding shared by every module session
    pub marshal: MarshalConfig,
    /// Closes a session whose module stays silent for this long. `None`
    /// waits forever, which is what modules that idle between calls need.
    pub read_timeout: Option<Duration>,
    /// Disables Nagle's algorithm on accepted connections
    pub nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 7777)),
            marshal: MarshalConfig::default(),
            read_timeout: None,
            nodelay: true,
        }
    }
}
