//! Bridge configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SandboxError;

/// How far a newer state-sync snapshot reaches when superseding older ones
/// still waiting in the network queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoalesceScope {
    /// Only snapshots from the same socket are superseded.
    #[default]
    PerSocket,
    /// Any queued snapshot is superseded, whichever socket it came from.
    Global,
    /// Every message is delivered.
    Disabled,
}

/// Configuration for the guest bridge.
///
/// Controls memory limits, optional fuel metering and the behaviour of the
/// window, network and file services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 1024 pages = 64 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel granted to each entry-point call. `None` disables
    /// metering; guests are long-lived and mostly idle between calls.
    pub fuel_limit: Option<u64>,

    /// Aspect ratio used until the guest calls `init_window`.
    pub aspect_ratio: f32,

    /// Maximum distance between press and release for a synthesized click.
    pub click_distance_threshold: f32,

    pub coalescing: CoalesceScope,

    /// Sends buffered per connecting socket; extra sends are dropped.
    pub max_pending_sends: usize,

    /// Root directory of the file service. Guest paths resolve under it.
    pub file_root: PathBuf,

    /// Try a secure listener first, falling back to plain on failure.
    pub secure_listen: bool,

    /// Interval between `update_server` calls in the server loop.
    #[serde(with = "millis")]
    pub server_tick: Duration,

    /// Guest log lines kept in memory for inspection. Older lines are dropped.
    pub max_guest_log_lines: usize,

    /// Page URL reported by `get_href`, `get_hostname` and `get_protocol`.
    pub location: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 1024, // 64 MiB
            fuel_limit: None,
            aspect_ratio: 16.0 / 9.0,
            click_distance_threshold: 5.0,
            coalescing: CoalesceScope::PerSocket,
            max_pending_sends: 64,
            file_root: PathBuf::from("."),
            secure_listen: false,
            server_tick: Duration::from_millis(10),
            max_guest_log_lines: 1000,
            location: "http://localhost/".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parse a (possibly partial) JSON document. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, SandboxError> {
        Ok(serde_json::from_str(json)?)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
