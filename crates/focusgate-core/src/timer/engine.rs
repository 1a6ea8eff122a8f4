//! Timer engine.
//!
//! Drives the persisted countdown record through its transitions and
//! keeps the derived remaining time consistent across restarts, alarm
//! firings, and concurrent reads. Expiry is reconciled in two places:
//! lazily on any read that finds the deadline in the past (silent), and
//! from the scheduled wake-up (which also notifies the user).
//!
//! ## State machine
//!
//! ```text
//! Stopped(n>0) --start--> Running --pause--> Stopped(n>0)
//! Running --expiry--> Stopped(0)
//! Stopped(any) --set_minutes--> Stopped(m)
//! any --reset--> Stopped(default)
//! ```
//!
//! Every transition is a load-mutate-persist sequence on shared storage;
//! an engine-wide async mutex serializes those sequences so back-to-back
//! control messages cannot interleave between load and persist.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::state::{TimerState, MAX_DURATION_SEC, TIMER_ALARM, TIMER_KEY};
use crate::error::{Result, ValidationError};
use crate::host::{AlarmScheduler, KeyValueStore, Notifier};

const EXPIRY_TITLE: &str = "Focus time is up";
const EXPIRY_MESSAGE: &str = "Cycle complete. Take a break and come back stronger.";

#[derive(Clone)]
pub struct TimerEngine {
    store: Arc<dyn KeyValueStore>,
    alarms: Arc<dyn AlarmScheduler>,
    notifier: Arc<dyn Notifier>,
    default_duration_sec: u64,
    guard: Arc<Mutex<()>>,
}

impl TimerEngine {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        alarms: Arc<dyn AlarmScheduler>,
        notifier: Arc<dyn Notifier>,
        default_duration_sec: u64,
    ) -> Self {
        Self {
            store,
            alarms,
            notifier,
            default_duration_sec,
            guard: Arc::new(Mutex::new(())),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current state with `remaining_sec` reflecting wall-clock time.
    ///
    /// If the deadline has passed, this also persists the terminal state
    /// and cancels the wake-up (lazy expiry reconciliation, no
    /// notification). A missing or unreadable record is the default
    /// state, never an error.
    pub async fn fresh_state(&self) -> Result<TimerState> {
        let _guard = self.guard.lock().await;
        self.reconcile()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) the countdown from the current remaining time.
    ///
    /// No-op while already running or when nothing is left. Schedules
    /// the wake-up for the computed deadline, replacing any pending one.
    pub async fn start(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut st = self.reconcile()?;
        if st.is_running || st.remaining_sec == 0 {
            return Ok(());
        }
        // Clamp before the deadline arithmetic: a persisted record may
        // carry any u64, and chrono durations top out well below that.
        let secs = st.remaining_sec.min(MAX_DURATION_SEC);
        st.remaining_sec = secs;
        let target = Utc::now() + Duration::seconds(secs as i64);
        // Truncate to whole milliseconds so the scheduled deadline and
        // the persisted record (epoch ms on the wire) agree exactly.
        let target = DateTime::from_timestamp_millis(target.timestamp_millis()).unwrap_or(target);
        st.is_running = true;
        st.target_time = Some(target);
        self.alarms.schedule(TIMER_ALARM, target)?;
        self.persist(&st)
    }

    /// Freeze the countdown at its live remaining value.
    pub async fn pause(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        let st = self.reconcile()?;
        if !st.is_running {
            return Ok(());
        }
        // reconcile() already substituted the live remaining value.
        let frozen = TimerState::stopped(st.remaining_sec);
        self.alarms.clear(TIMER_ALARM)?;
        self.persist(&frozen)
    }

    /// Restore the default state from any prior state.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.alarms.clear(TIMER_ALARM)?;
        self.persist(&TimerState::stopped(self.default_duration_sec))
    }

    /// Stop and rewrite the duration, regardless of prior state.
    ///
    /// Whole seconds, rounded, clamped between 1 and [`MAX_DURATION_SEC`].
    /// Non-finite or non-positive input is rejected.
    pub async fn set_minutes(&self, minutes: f64) -> Result<()> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "minutes".into(),
                message: format!("expected a positive number, got {minutes}"),
            }
            .into());
        }
        let secs = ((minutes * 60.0).round().max(1.0) as u64).min(MAX_DURATION_SEC);
        let _guard = self.guard.lock().await;
        self.alarms.clear(TIMER_ALARM)?;
        self.persist(&TimerState::stopped(secs))
    }

    /// Persist the default record if none exists yet (install time).
    pub async fn ensure_initialized(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        if matches!(self.store.get(TIMER_KEY), Ok(Some(_))) {
            return Ok(());
        }
        self.persist(&TimerState::stopped(self.default_duration_sec))
    }

    /// Re-arm the wake-up from the persisted deadline (startup time).
    ///
    /// Needed with process-local alarm schedulers: the deadline survives
    /// a restart in storage, the pending alarm does not. An already
    /// passed deadline is reconciled on the spot, without notifying.
    pub async fn restore_alarm(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        let st = self.reconcile()?;
        if let Some(target) = st.target_time.filter(|_| st.is_running) {
            self.alarms.schedule(TIMER_ALARM, target)?;
        }
        Ok(())
    }

    /// Wake-up handler: move to the terminal state and notify.
    ///
    /// Idempotent; tolerates the state having already been reconciled by
    /// a read. This is the only path that emits the notification.
    pub async fn on_expiry(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.persist(&TimerState::expired())?;
        if let Err(e) = self.notifier.notify(EXPIRY_TITLE, EXPIRY_MESSAGE) {
            tracing::warn!(error = %e, "expiry notification failed");
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Load, then fold wall-clock time into the record. Caller holds the
    /// engine guard.
    fn reconcile(&self) -> Result<TimerState> {
        let mut st = self.load();
        if st.is_running && st.target_time.is_some() {
            let remaining = st.live_remaining_sec(Utc::now());
            if remaining == 0 {
                st = TimerState::expired();
                self.alarms.clear(TIMER_ALARM)?;
                self.persist(&st)?;
                tracing::debug!("countdown expired, reconciled on read");
            } else {
                // Expose the live value without persisting it.
                st.remaining_sec = remaining;
            }
        }
        Ok(st)
    }

    fn load(&self) -> TimerState {
        match self.store.get(TIMER_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "corrupt timer record, using defaults");
                TimerState::stopped(self.default_duration_sec)
            }),
            Ok(None) => TimerState::stopped(self.default_duration_sec),
            Err(e) => {
                tracing::warn!(error = %e, "timer record unreadable, using defaults");
                TimerState::stopped(self.default_duration_sec)
            }
        }
    }

    fn persist(&self, st: &TimerState) -> Result<()> {
        self.store.set(TIMER_KEY, serde_json::to_value(st)?)?;
        Ok(())
    }
}
