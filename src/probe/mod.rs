//! Probe state machine with timed auto-recovery.
//!
//! `ProbeMachine` owns the startup/liveness/readiness flags and the two restore
//! timers behind a single `RwLock`. Every flag write and every timer arm or cancel
//! happens while holding the write lock, and a firing timer re-acquires the same
//! lock before applying its effect, so concurrent requests and timer callbacks are
//! linearized.
//!
//! Recovery rules:
//! - Readiness switched off arms a fixed-delay restore; switching it back on
//!   cancels the pending restore.
//! - A liveness test forces `live = false` and arms a restore after a random
//!   number of seconds. Any manual liveness toggle cancels that restore.
//! - Startup has no timer.

mod status;
mod timers;

pub use status::{Probe, ProbeStatus};
pub use timers::{TimerRegistry, TimerSlot, TimerToken};

use std::sync::{Arc, Weak};
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::instrument;

use crate::config::{
    DEFAULT_LIVENESS_RESTORE_MAX_SECS, DEFAULT_LIVENESS_RESTORE_MIN_SECS,
    DEFAULT_READINESS_RESTORE_SECS,
};

/// Delays used by the restore timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimings {
    /// Fixed delay before readiness is restored
    pub readiness_restore: Duration,
    /// Lower bound (inclusive) of the liveness restore draw, in seconds
    pub liveness_restore_min_secs: u64,
    /// Upper bound (inclusive) of the liveness restore draw, in seconds
    pub liveness_restore_max_secs: u64,
}

impl Default for ProbeTimings {
    fn default() -> Self {
        Self {
            readiness_restore: Duration::from_secs(DEFAULT_READINESS_RESTORE_SECS),
            liveness_restore_min_secs: DEFAULT_LIVENESS_RESTORE_MIN_SECS,
            liveness_restore_max_secs: DEFAULT_LIVENESS_RESTORE_MAX_SECS,
        }
    }
}

impl ProbeTimings {
    /// Draw a liveness restore delay uniformly from the configured inclusive range.
    pub fn draw_liveness_restore_secs(&self) -> u64 {
        rand::rng().random_range(self.liveness_restore_min_secs..=self.liveness_restore_max_secs)
    }
}

/// Time left on each restore timer, `None` when the slot is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTimers {
    pub readiness_restore: Option<u64>,
    pub liveness_restore: Option<u64>,
}

/// Point-in-time view of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub status: ProbeStatus,
    pub uptime: Duration,
    pub pending: PendingTimers,
}

struct Guarded {
    status: ProbeStatus,
    timers: TimerRegistry,
}

struct Shared {
    state: RwLock<Guarded>,
    timings: ProbeTimings,
    started_at: Instant,
}

/// Cloneable handle to the process-wide probe state.
#[derive(Clone)]
pub struct ProbeMachine {
    inner: Arc<Shared>,
}

impl ProbeMachine {
    /// Create a machine with all flags healthy and no pending timers.
    pub fn new(timings: ProbeTimings) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(Guarded {
                    status: ProbeStatus::default(),
                    timers: TimerRegistry::new(),
                }),
                timings,
                started_at: Instant::now(),
            }),
        }
    }

    /// Flip `started`. No timer interaction.
    #[instrument(name = "probe::toggle_started", skip(self))]
    pub async fn toggle_started(&self) -> bool {
        let mut guard = self.inner.state.write().await;
        let started = Probe::Startup.toggle(&mut guard.status);
        tracing::info!(started, "Startup flag toggled");
        started
    }

    /// Flip `live` and cancel any pending liveness restore.
    ///
    /// The restore is cancelled even when the new value is `false`, so a manual
    /// failure stays in place until toggled again.
    #[instrument(name = "probe::toggle_liveness", skip(self))]
    pub async fn toggle_liveness(&self) -> bool {
        let mut guard = self.inner.state.write().await;
        let live = Probe::Liveness.toggle(&mut guard.status);
        let cancelled = guard.timers.cancel(TimerSlot::LivenessRestore);
        tracing::info!(live, cancelled_test = cancelled, "Liveness flag toggled");
        live
    }

    /// Flip `ready`. Switching off arms the readiness restore, switching on
    /// cancels it.
    #[instrument(name = "probe::toggle_readiness", skip(self))]
    pub async fn toggle_readiness(&self) -> bool {
        let mut guard = self.inner.state.write().await;
        let ready = Probe::Readiness.toggle(&mut guard.status);
        if ready {
            guard.timers.cancel(TimerSlot::ReadinessRestore);
            tracing::info!(ready, "Readiness flag toggled");
        } else {
            let delay = self.inner.timings.readiness_restore;
            self.arm_restore(&mut guard.timers, TimerSlot::ReadinessRestore, delay);
            tracing::info!(
                ready,
                restore_in_secs = delay.as_secs(),
                "Readiness flag toggled, auto-restore armed"
            );
        }
        ready
    }

    /// Force `live = false` and arm a liveness restore after a random delay.
    ///
    /// Re-triggering while a test is running restarts the countdown with a new
    /// draw. Returns the drawn delay in seconds.
    #[instrument(name = "probe::trigger_liveness_failure", skip(self))]
    pub async fn trigger_liveness_failure(&self) -> u64 {
        let secs = self.inner.timings.draw_liveness_restore_secs();
        let mut guard = self.inner.state.write().await;
        Probe::Liveness.set(&mut guard.status, false);
        self.arm_restore(
            &mut guard.timers,
            TimerSlot::LivenessRestore,
            Duration::from_secs(secs),
        );
        tracing::warn!(restore_in_secs = secs, "Liveness test started");
        secs
    }

    /// Read all flags, uptime and pending timers.
    pub async fn snapshot(&self) -> Snapshot {
        let guard = self.inner.state.read().await;
        Snapshot {
            status: guard.status,
            uptime: self.uptime(),
            pending: PendingTimers {
                readiness_restore: guard
                    .timers
                    .remaining(TimerSlot::ReadinessRestore)
                    .map(|d| d.as_secs()),
                liveness_restore: guard
                    .timers
                    .remaining(TimerSlot::LivenessRestore)
                    .map(|d| d.as_secs()),
            },
        }
    }

    /// Read the flag a single probe reports on.
    pub async fn check(&self, probe: Probe) -> bool {
        let guard = self.inner.state.read().await;
        probe.get(&guard.status)
    }

    pub async fn is_started(&self) -> bool {
        self.check(Probe::Startup).await
    }

    pub async fn is_live(&self) -> bool {
        self.check(Probe::Liveness).await
    }

    pub async fn is_ready(&self) -> bool {
        self.check(Probe::Readiness).await
    }

    /// Elapsed time since the machine was created.
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Abort all pending restore timers. Used on shutdown.
    pub async fn cancel_timers(&self) {
        let mut guard = self.inner.state.write().await;
        guard.timers.cancel_all();
    }

    /// Arm `slot` so that it sets its flag back to `true` after `delay`.
    /// Caller must hold the write lock.
    fn arm_restore(&self, timers: &mut TimerRegistry, slot: TimerSlot, delay: Duration) {
        let shared = Arc::downgrade(&self.inner);
        timers.arm(slot, delay, move |token| restore(shared, slot, token));
    }
}

/// Body of a fired restore timer. Holds only a weak reference so pending timers
/// never keep the machine alive.
async fn restore(shared: Weak<Shared>, slot: TimerSlot, token: TimerToken) {
    let Some(shared) = shared.upgrade() else {
        return;
    };

    let mut guard = shared.state.write().await;
    if !guard.timers.claim(slot, token) {
        tracing::debug!(%slot, "Stale restore timer ignored");
        return;
    }

    let probe = slot.probe();
    probe.set(&mut guard.status, true);
    tracing::info!(%probe, "Auto-restore fired, probe healthy again");
}
