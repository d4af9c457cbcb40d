pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Keeps the control channel alive behind proxies that drop idle connections after a minute.
pub const DEFAULT_HEARTBEAT_MS: u64 = 50_000;

pub const DEFAULT_RECONNECT_MS: u64 = 3_000;

pub const DEFAULT_MAX_ICE_RESTARTS: u32 = 3;
