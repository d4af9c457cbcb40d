use huddle_core::utils::{
    DEFAULT_HEARTBEAT_MS, DEFAULT_MAX_ICE_RESTARTS, DEFAULT_RECONNECT_MS, DEFAULT_STUN_ADDR,
};
use std::time::Duration;

use crate::link::LinkConfig;

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub signaling_url: String,
    pub ice_servers: Vec<String>,
    /// Delay before a lost control channel is reopened.
    pub reconnect_delay: Duration,
    pub heartbeat_interval: Duration,
    /// ICE restarts a link attempts after `failed` before it gives up.
    pub max_ice_restarts: u32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://localhost:8080".to_string(),
            ice_servers: vec![DEFAULT_STUN_ADDR.to_string()],
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_MS),
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            max_ice_restarts: DEFAULT_MAX_ICE_RESTARTS,
        }
    }
}

impl ConnectorConfig {
    pub fn new(signaling_url: impl Into<String>) -> Self {
        Self {
            signaling_url: signaling_url.into(),
            ..Default::default()
        }
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<String>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_max_ice_restarts(mut self, max: u32) -> Self {
        self.max_ice_restarts = max;
        self
    }

    pub(crate) fn link_config(&self) -> LinkConfig {
        LinkConfig {
            ice_servers: self.ice_servers.clone(),
            max_ice_restarts: self.max_ice_restarts,
        }
    }
}
