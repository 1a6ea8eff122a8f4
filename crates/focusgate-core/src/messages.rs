//! Message API wire types.
//!
//! Requests arrive as `{"type": "...", ...payload}` and every response
//! carries an `ok` flag: `{ok: true, ...}` on success, `{ok: false,
//! error}` otherwise. Field names here are the wire contract with the
//! UI surfaces and must not drift.

use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// A typed request from a UI surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "TIMER_GET_STATE")]
    TimerGetState,
    #[serde(rename = "TIMER_START")]
    TimerStart,
    #[serde(rename = "TIMER_PAUSE")]
    TimerPause,
    #[serde(rename = "TIMER_RESET")]
    TimerReset,
    #[serde(rename = "TIMER_SET_MINUTES")]
    TimerSetMinutes { minutes: f64 },
    #[serde(rename = "BLOCKED_GET")]
    BlockedGet,
    #[serde(rename = "BLOCKED_ADD")]
    BlockedAdd { domain: String },
    #[serde(rename = "BLOCKED_REMOVE")]
    BlockedRemove { domain: String },
    #[serde(rename = "BLOCKED_SET")]
    BlockedSet { list: Vec<String> },
    /// Anything with an unrecognized `type`.
    #[serde(other)]
    Unknown,
}

/// The response to a request. Untagged: the shape is determined by
/// which fields are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    State { ok: bool, state: TimerState },
    List { ok: bool, list: Vec<String> },
    Error { ok: bool, error: String },
    Ack { ok: bool },
}

impl Response {
    pub fn state(state: TimerState) -> Self {
        Response::State { ok: true, state }
    }

    pub fn list(list: Vec<String>) -> Self {
        Response::List { ok: true, list }
    }

    pub fn ack() -> Self {
        Response::Ack { ok: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            ok: false,
            error: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            Response::State { ok, .. }
            | Response::List { ok, .. }
            | Response::Error { ok, .. }
            | Response::Ack { ok } => *ok,
        }
    }
}
