//! Shared command wiring.
//!
//! Each invocation builds the background service over the local sqlite
//! store, with the stored rule engine standing in for a platform
//! rule-matcher and a terminal notifier. Every command starts with the
//! install hook, which is idempotent: it seeds defaults only when
//! storage is empty.

use std::sync::Arc;
use tokio::sync::mpsc;

use focusgate_core::error::HostError;
use focusgate_core::host::{Notifier, StoredRuleEngine, TokioAlarms};
use focusgate_core::{Background, Config, CoreError, LocalStore, Response};

/// Notifier that writes to the terminal. Disabled via config.
pub struct ConsoleNotifier {
    enabled: bool,
}

impl ConsoleNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), HostError> {
        if self.enabled {
            println!("{title}: {message}");
        }
        Ok(())
    }
}

pub struct Context {
    pub background: Background,
    pub rules: Arc<StoredRuleEngine>,
    /// Receives the alarm name when a scheduled wake-up fires.
    pub alarm_rx: mpsc::UnboundedReceiver<String>,
}

impl Context {
    pub async fn init() -> Result<Self, CoreError> {
        let config = Config::load()?;
        let store: Arc<LocalStore> = Arc::new(LocalStore::open_default()?);
        let (tx, alarm_rx) = mpsc::unbounded_channel();
        let alarms = Arc::new(TokioAlarms::new(move |name: &str| {
            let _ = tx.send(name.to_string());
        }));
        let rules = Arc::new(StoredRuleEngine::new(store.clone()));
        let notifier = Arc::new(ConsoleNotifier::new(config.notifications.enabled));
        let background = Background::new(store, alarms, rules.clone(), notifier, &config);
        background.on_installed().await?;
        Ok(Self {
            background,
            rules,
            alarm_rx,
        })
    }
}

/// Print a message-API response as JSON. An `ok: false` response is
/// still a response, not a process failure.
pub fn print_response(response: &Response) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
