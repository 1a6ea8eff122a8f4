use clap::Subcommand;

use focusgate_core::{Request, Response};

use super::common::{print_response, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown, freezing the remaining time
    Pause,
    /// Reset to the default duration, stopped
    Reset,
    /// Set the focus duration in minutes (stops the timer)
    Set { minutes: f64 },
    /// Stay running until the countdown expires, then notify
    Watch,
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::init().await?;
    let dispatcher = ctx.background.dispatcher();
    match action {
        TimerAction::Status => {
            print_response(&dispatcher.handle(Request::TimerGetState).await)?;
        }
        TimerAction::Start => {
            dispatcher.handle(Request::TimerStart).await;
            print_response(&dispatcher.handle(Request::TimerGetState).await)?;
        }
        TimerAction::Pause => {
            dispatcher.handle(Request::TimerPause).await;
            print_response(&dispatcher.handle(Request::TimerGetState).await)?;
        }
        TimerAction::Reset => {
            dispatcher.handle(Request::TimerReset).await;
            print_response(&dispatcher.handle(Request::TimerGetState).await)?;
        }
        TimerAction::Set { minutes } => {
            let response = dispatcher.handle(Request::TimerSetMinutes { minutes }).await;
            if response.is_ok() {
                print_response(&dispatcher.handle(Request::TimerGetState).await)?;
            } else {
                print_response(&response)?;
            }
        }
        TimerAction::Watch => {
            // Re-arm the wake-up from the persisted deadline, then block
            // until it fires.
            ctx.background.on_startup().await?;
            let state = match ctx.background.dispatcher().handle(Request::TimerGetState).await {
                Response::State { state, .. } => state,
                other => {
                    print_response(&other)?;
                    return Ok(());
                }
            };
            if !state.is_running {
                println!("timer is not running ({} sec remaining)", state.remaining_sec);
                return Ok(());
            }
            tracing::info!(remaining_sec = state.remaining_sec, "watching countdown");
            while let Some(name) = ctx.alarm_rx.recv().await {
                ctx.background.on_alarm(&name).await?;
                break;
            }
        }
    }
    Ok(())
}
