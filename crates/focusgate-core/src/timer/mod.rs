mod engine;
mod state;

pub use engine::TimerEngine;
pub use state::{
    TimerState, DEFAULT_DURATION_SEC, DEFAULT_MINUTES, MAX_DURATION_SEC, TIMER_ALARM, TIMER_KEY,
};
