//! Tokio-backed alarm scheduler.
//!
//! Each named alarm is a spawned `sleep` task; scheduling a new alarm
//! under the same name aborts the previous task. Alarms here are
//! process-local: after a restart the background service re-schedules
//! from the persisted deadline (see `Background::on_startup`).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::AlarmScheduler;
use crate::error::HostError;

type FireCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub struct TokioAlarms {
    on_fire: FireCallback,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioAlarms {
    /// `on_fire` is invoked with the alarm name when a deadline passes.
    /// It runs on a tokio worker, so it should hand off to a channel
    /// rather than block.
    pub fn new(on_fire: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            on_fire: Arc::new(on_fire),
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

impl AlarmScheduler for TokioAlarms {
    fn schedule(&self, name: &str, at: DateTime<Utc>) -> Result<(), HostError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| HostError::Alarm("no async runtime available".into()))?;
        let delay = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let on_fire = Arc::clone(&self.on_fire);
        let alarm_name = name.to_string();
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(&alarm_name);
        });
        let mut tasks = self
            .tasks
            .lock()
            .map_err(|e| HostError::Alarm(e.to_string()))?;
        if let Some(prev) = tasks.insert(name.to_string(), task) {
            prev.abort();
        }
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<(), HostError> {
        let mut tasks = self
            .tasks
            .lock()
            .map_err(|e| HostError::Alarm(e.to_string()))?;
        if let Some(task) = tasks.remove(name) {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for TokioAlarms {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.lock() {
            for task in tasks.values() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fires_after_deadline() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = Arc::clone(&fired);
        let alarms = TokioAlarms::new(move |_| {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        alarms
            .schedule("t", Utc::now() + chrono::Duration::milliseconds(20))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reschedule_replaces_pending() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = Arc::clone(&fired);
        let alarms = TokioAlarms::new(move |_| {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        alarms
            .schedule("t", Utc::now() + chrono::Duration::milliseconds(30))
            .unwrap();
        alarms
            .schedule("t", Utc::now() + chrono::Duration::milliseconds(30))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = Arc::clone(&fired);
        let alarms = TokioAlarms::new(move |_| {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        alarms
            .schedule("t", Utc::now() + chrono::Duration::milliseconds(30))
            .unwrap();
        alarms.clear("t").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
