//! Persisted timer record and live-remaining derivation.
//!
//! The record stores an absolute deadline, not a tick count. While a
//! countdown is running, `remaining_sec` in the record is a stale
//! snapshot and the true value is recomputed from `target_time` on every
//! read; while stopped, `remaining_sec` is authoritative. The invariant
//! is `is_running == target_time.is_some()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default focus duration in minutes.
pub const DEFAULT_MINUTES: u32 = 25;

/// Default focus duration in seconds.
pub const DEFAULT_DURATION_SEC: u64 = DEFAULT_MINUTES as u64 * 60;

/// Longest accepted countdown: one year, in seconds.
///
/// Durations are clamped here so deadline arithmetic stays inside what
/// the wall-clock types can represent, whatever the caller sends.
pub const MAX_DURATION_SEC: u64 = 60 * 60 * 24 * 365;

/// Storage key for the single persisted timer record.
pub const TIMER_KEY: &str = "timerState";

/// Name of the one-shot wake-up scheduled for the countdown deadline.
pub const TIMER_ALARM: &str = "focusgate_timer_end";

/// The persisted countdown record.
///
/// `target_time` is epoch milliseconds on the wire, matching the message
/// API's `targetTime` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub remaining_sec: u64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub target_time: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::stopped(DEFAULT_DURATION_SEC)
    }
}

impl TimerState {
    /// A stopped countdown with `remaining_sec` seconds left.
    pub fn stopped(remaining_sec: u64) -> Self {
        Self {
            is_running: false,
            remaining_sec,
            target_time: None,
        }
    }

    /// The terminal state: stopped with nothing left.
    pub fn expired() -> Self {
        Self::stopped(0)
    }

    /// Seconds remaining as of `now`.
    ///
    /// Recomputed from the deadline while running (rounded to whole
    /// seconds, floored at zero); the stored snapshot otherwise.
    pub fn live_remaining_sec(&self, now: DateTime<Utc>) -> u64 {
        match self.target_time {
            Some(target) if self.is_running => {
                let ms = (target - now).num_milliseconds();
                if ms <= 0 {
                    0
                } else {
                    (ms as f64 / 1000.0).round() as u64
                }
            }
            _ => self.remaining_sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn default_is_stopped_at_default_duration() {
        let st = TimerState::default();
        assert!(!st.is_running);
        assert_eq!(st.remaining_sec, 1500);
        assert_eq!(st.target_time, None);
    }

    #[test]
    fn live_remaining_rounds_to_whole_seconds() {
        let now = Utc::now();
        let st = TimerState {
            is_running: true,
            remaining_sec: 999, // stale snapshot, ignored while running
            target_time: Some(now + Duration::milliseconds(10_400)),
        };
        assert_eq!(st.live_remaining_sec(now), 10);
        let st = TimerState {
            target_time: Some(now + Duration::milliseconds(10_600)),
            ..st
        };
        assert_eq!(st.live_remaining_sec(now), 11);
    }

    #[test]
    fn live_remaining_floors_at_zero() {
        let now = Utc::now();
        let st = TimerState {
            is_running: true,
            remaining_sec: 60,
            target_time: Some(now - Duration::seconds(5)),
        };
        assert_eq!(st.live_remaining_sec(now), 0);
    }

    #[test]
    fn stored_snapshot_is_authoritative_while_stopped() {
        let st = TimerState::stopped(42);
        assert_eq!(st.live_remaining_sec(Utc::now()), 42);
    }

    #[test]
    fn wire_format_uses_epoch_millis() {
        let st = TimerState {
            is_running: true,
            remaining_sec: 3,
            target_time: Some(DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()),
        };
        let json = serde_json::to_value(&st).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isRunning": true,
                "remainingSec": 3,
                "targetTime": 1_700_000_000_123i64,
            })
        );
        let back: TimerState = serde_json::from_value(json).unwrap();
        assert_eq!(back, st);
    }
}
