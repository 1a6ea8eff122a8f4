//! Message dispatcher.
//!
//! The single entry point for UI surfaces. Every request gets exactly
//! one response: handler errors are converted into `{ok: false, error}`
//! at this boundary and never propagate further.

use serde_json::Value;

use crate::blocklist::BlockedList;
use crate::error::{CoreError, Result, ValidationError};
use crate::messages::{Request, Response};
use crate::timer::TimerEngine;

#[derive(Clone)]
pub struct Dispatcher {
    timer: TimerEngine,
    blocked: BlockedList,
}

impl Dispatcher {
    pub fn new(timer: TimerEngine, blocked: BlockedList) -> Self {
        Self { timer, blocked }
    }

    /// Handle a raw JSON message. Malformed payloads degrade to an
    /// error response rather than a transport failure.
    pub async fn handle_value(&self, value: Value) -> Response {
        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Response::error(e.to_string()),
        }
    }

    /// Handle a typed request.
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => Response::error(error_message(&e)),
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        match request {
            Request::TimerGetState => {
                let state = self.timer.fresh_state().await?;
                Ok(Response::state(state))
            }
            Request::TimerStart => {
                self.timer.start().await?;
                Ok(Response::ack())
            }
            Request::TimerPause => {
                self.timer.pause().await?;
                Ok(Response::ack())
            }
            Request::TimerReset => {
                self.timer.reset().await?;
                Ok(Response::ack())
            }
            Request::TimerSetMinutes { minutes } => {
                self.timer.set_minutes(minutes).await?;
                Ok(Response::ack())
            }
            Request::BlockedGet => Ok(Response::list(self.blocked.get())),
            Request::BlockedAdd { domain } => Ok(Response::list(self.blocked.add(&domain)?)),
            Request::BlockedRemove { domain } => {
                Ok(Response::list(self.blocked.remove(&domain)?))
            }
            Request::BlockedSet { list } => Ok(Response::list(self.blocked.set(&list)?)),
            Request::Unknown => Ok(Response::error("unknown action")),
        }
    }
}

fn error_message(e: &CoreError) -> String {
    match e {
        CoreError::Validation(ValidationError::InvalidDomain) => "invalid domain".to_string(),
        other => other.to_string(),
    }
}
