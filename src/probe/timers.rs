//! Replaceable one-shot restore timers.
//!
//! Each slot holds at most one pending timer. Arming an occupied slot aborts the
//! previous occupant first. A firing timer must `claim` its slot with the token it
//! was armed with; a timer whose token no longer matches has been cancelled or
//! replaced and must not apply its effect.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::status::Probe;

/// Deadline used when `now + delay` does not fit in an `Instant` (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The two named timer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    /// Sets `ready = true` after the fixed readiness delay.
    ReadinessRestore,
    /// Sets `live = true` after a randomized delay.
    LivenessRestore,
}

impl TimerSlot {
    /// The probe flag this slot restores when it fires.
    pub fn probe(self) -> Probe {
        match self {
            TimerSlot::ReadinessRestore => Probe::Readiness,
            TimerSlot::LivenessRestore => Probe::Liveness,
        }
    }
}

impl std::fmt::Display for TimerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerSlot::ReadinessRestore => write!(f, "readiness_restore"),
            TimerSlot::LivenessRestore => write!(f, "liveness_restore"),
        }
    }
}

/// Identifies one arming of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

struct PendingTimer {
    token: TimerToken,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Owner of the restore timers. Not synchronized on its own: callers hold the
/// same lock that guards the probe flags.
#[derive(Default)]
pub struct TimerRegistry {
    readiness_restore: Option<PendingTimer>,
    liveness_restore: Option<PendingTimer>,
    next_token: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: TimerSlot) -> &mut Option<PendingTimer> {
        match slot {
            TimerSlot::ReadinessRestore => &mut self.readiness_restore,
            TimerSlot::LivenessRestore => &mut self.liveness_restore,
        }
    }

    fn slot_ref(&self, slot: TimerSlot) -> &Option<PendingTimer> {
        match slot {
            TimerSlot::ReadinessRestore => &self.readiness_restore,
            TimerSlot::LivenessRestore => &self.liveness_restore,
        }
    }

    /// Schedule `action` to run once after `delay`, replacing any timer already in
    /// `slot`. The action is built from the token it must later pass to `claim`.
    ///
    /// Returns immediately; the action runs on its own tokio task.
    pub fn arm<F, Fut>(&mut self, slot: TimerSlot, delay: Duration, action: F) -> TimerToken
    where
        F: FnOnce(TimerToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(slot);

        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let fire = action(token);

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            fire.await;
        });

        *self.slot_mut(slot) = Some(PendingTimer {
            token,
            deadline,
            handle,
        });

        tracing::debug!(%slot, delay_secs = delay.as_secs(), "Timer armed");
        token
    }

    /// Abort the pending timer in `slot`, if any. Returns whether one was pending.
    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        match self.slot_mut(slot).take() {
            Some(pending) => {
                pending.handle.abort();
                tracing::debug!(%slot, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Called by a firing timer. Clears the slot and returns `true` only if `token`
    /// is still the slot's occupant.
    pub fn claim(&mut self, slot: TimerSlot, token: TimerToken) -> bool {
        let entry = self.slot_mut(slot);
        if entry.as_ref().is_some_and(|pending| pending.token == token) {
            *entry = None;
            true
        } else {
            false
        }
    }

    /// Time left before the timer in `slot` fires, if one is pending.
    pub fn remaining(&self, slot: TimerSlot) -> Option<Duration> {
        self.slot_ref(slot)
            .as_ref()
            .map(|pending| pending.deadline.saturating_duration_since(Instant::now()))
    }

    /// Abort every pending timer.
    pub fn cancel_all(&mut self) {
        self.cancel(TimerSlot::ReadinessRestore);
        self.cancel(TimerSlot::LivenessRestore);
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_slot_probe_mapping() {
        assert_eq!(TimerSlot::ReadinessRestore.probe(), Probe::Readiness);
        assert_eq!(TimerSlot::LivenessRestore.probe(), Probe::Liveness);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timers = TimerRegistry::new();

        let counter = fired.clone();
        timers.arm(TimerSlot::ReadinessRestore, Duration::from_secs(10), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timers = TimerRegistry::new();

        let counter = fired.clone();
        timers.arm(TimerSlot::LivenessRestore, Duration::from_secs(5), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timers.cancel(TimerSlot::LivenessRestore));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(timers.remaining(TimerSlot::LivenessRestore).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_empty_slot_is_noop() {
        let mut timers = TimerRegistry::new();
        assert!(!timers.cancel(TimerSlot::ReadinessRestore));
        assert!(!timers.cancel(TimerSlot::ReadinessRestore));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_timer() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut timers = TimerRegistry::new();

        let counter = first.clone();
        timers.arm(TimerSlot::LivenessRestore, Duration::from_secs(5), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = second.clone();
        timers.arm(TimerSlot::LivenessRestore, Duration::from_secs(20), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_are_independent() {
        let mut timers = TimerRegistry::new();

        timers.arm(TimerSlot::ReadinessRestore, Duration::from_secs(5), |_| async {});
        timers.arm(TimerSlot::LivenessRestore, Duration::from_secs(5), |_| async {});
        timers.cancel(TimerSlot::LivenessRestore);

        assert!(timers.remaining(TimerSlot::ReadinessRestore).is_some());
        assert!(timers.remaining(TimerSlot::LivenessRestore).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_only_succeeds_for_current_token() {
        let mut timers = TimerRegistry::new();
        let stale = timers.arm(TimerSlot::ReadinessRestore, Duration::from_secs(30), |_| async {});
        let current = timers.arm(TimerSlot::ReadinessRestore, Duration::from_secs(30), |_| async {});

        assert!(!timers.claim(TimerSlot::ReadinessRestore, stale));
        assert!(timers.claim(TimerSlot::ReadinessRestore, current));
        // Slot is cleared after a successful claim
        assert!(!timers.claim(TimerSlot::ReadinessRestore, current));
        assert!(timers.remaining(TimerSlot::ReadinessRestore).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_delay_is_clamped() {
        let mut timers = TimerRegistry::new();
        timers.arm(TimerSlot::LivenessRestore, Duration::MAX, |_| async {});

        let remaining = timers.remaining(TimerSlot::LivenessRestore).unwrap();
        assert!(remaining <= FAR_FUTURE);
        assert!(remaining > Duration::from_secs(86400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let mut timers = TimerRegistry::new();
        timers.arm(TimerSlot::ReadinessRestore, Duration::from_secs(30), |_| async {});

        tokio::time::advance(Duration::from_secs(12)).await;
        assert_eq!(
            timers.remaining(TimerSlot::ReadinessRestore),
            Some(Duration::from_secs(18))
        );
    }
}
