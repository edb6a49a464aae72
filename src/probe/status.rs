//! The three-flag health record reported to the orchestrator.

use serde::Serialize;

/// Health flags for the startup, liveness and readiness probes.
///
/// Every combination is legal; `live = false, ready = true` is an odd but valid
/// transient state. All flags start healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeStatus {
    pub started: bool,
    pub live: bool,
    pub ready: bool,
}

impl Default for ProbeStatus {
    fn default() -> Self {
        Self {
            started: true,
            live: true,
            ready: true,
        }
    }
}

/// Selects one of the three probe flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Startup,
    Liveness,
    Readiness,
}

impl Probe {
    /// Read the flag this probe reports on.
    pub fn get(self, status: &ProbeStatus) -> bool {
        match self {
            Probe::Startup => status.started,
            Probe::Liveness => status.live,
            Probe::Readiness => status.ready,
        }
    }

    /// Overwrite the flag this probe reports on.
    pub fn set(self, status: &mut ProbeStatus, value: bool) {
        match self {
            Probe::Startup => status.started = value,
            Probe::Liveness => status.live = value,
            Probe::Readiness => status.ready = value,
        }
    }

    /// Flip the flag and return the new value.
    pub fn toggle(self, status: &mut ProbeStatus) -> bool {
        let value = !self.get(status);
        self.set(status, value);
        value
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probe::Startup => write!(f, "startup"),
            Probe::Liveness => write!(f, "liveness"),
            Probe::Readiness => write!(f, "readiness"),
        }
    }
}
