use sha2::{Digest, Sha256};

use crate::types::{LiveMonitor, LiveMonitors};

/// Source of the outputs currently known to the compositor.
pub trait Backend {
    fn get_live_monitors(&self) -> anyhow::Result<Vec<LiveMonitor>>;
}

mod hyprctl;
pub use hyprctl::HyprctlBackend;
mod wlr_randr;
pub use wlr_randr::WlrRandrBackend;

/// Stable identity of a physical monitor.
///
/// Monitors that report no serial number are told apart by the connector
/// they are plugged into.
pub fn monitor_uuid(make: &str, model: &str, serial: &str, output: &str) -> String {
    let mut hasher = Sha256::new();
    let mut fields = vec![make, model, serial];
    if serial.is_empty() {
        fields.push(output);
    }
    for s in fields {
        let bytes = s.as_bytes();
        hasher.update(bytes.len().to_le_bytes());
        hasher.update(bytes);
    }
    hex::encode(hasher.finalize())
}

/// Identity of the set of connected monitors, independent of their order.
pub fn screen_id(monitors: &[LiveMonitor]) -> String {
    let mut uuids: Vec<&str> = monitors.iter().map(|m| m.uuid.as_str()).collect();
    uuids.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(uuids.len().to_le_bytes());
    for uuid in uuids {
        hasher.update(uuid.len().to_le_bytes());
        hasher.update(uuid.as_bytes());
    }
    hex::encode(hasher.finalize())
}

pub fn live_monitor_map(monitors: Vec<LiveMonitor>) -> LiveMonitors {
    monitors.into_iter().map(|m| (m.name.clone(), m)).collect()
}
