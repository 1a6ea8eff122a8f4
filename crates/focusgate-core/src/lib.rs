//! # Focusgate Core Library
//!
//! Core business logic for Focusgate: a focus/countdown timer persisted
//! across process restarts, plus a user-editable blocked-domain list
//! compiled into request-blocking rules.
//!
//! ## Architecture
//!
//! - **Timer Engine**: derives live remaining time from a persisted
//!   absolute deadline; four transitions (start/pause/reset/set) plus
//!   lazy and alarm-driven expiry reconciliation
//! - **Rule Synchronizer**: regenerates the full block-rule set from the
//!   domain list on every observed mutation, atomically
//! - **Message Dispatcher**: the single typed request/response entry
//!   point UI surfaces talk to
//! - **Host seams**: storage, alarms, rule engine, and notifications are
//!   injected traits with in-memory, sqlite, and tokio implementations
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: countdown state machine over injected hosts
//! - [`Background`]: install/startup/alarm entry points and wiring
//! - [`Dispatcher`]: message API boundary
//! - [`LocalStore`]: sqlite-backed persistence

pub mod background;
pub mod blocklist;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod messages;
pub mod rules;
pub mod storage;
pub mod timer;

pub use background::Background;
pub use blocklist::{BlockedList, BLOCKED_KEY, SEED_DOMAINS};
pub use dispatch::Dispatcher;
pub use error::{ConfigError, CoreError, HostError, RuleEngineError, StorageError, ValidationError};
pub use messages::{Request, Response};
pub use rules::{build_rules, normalize_domain, BlockRule, RuleSynchronizer, MAX_RULES};
pub use storage::{Config, LocalStore};
pub use timer::{TimerEngine, TimerState, DEFAULT_DURATION_SEC, DEFAULT_MINUTES};
