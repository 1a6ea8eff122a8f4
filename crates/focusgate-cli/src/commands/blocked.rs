use clap::Subcommand;

use focusgate_core::host::RuleEngine;
use focusgate_core::Request;

use super::common::{print_response, Context};

#[derive(Subcommand)]
pub enum BlockedAction {
    /// Print the blocked-domain list
    List,
    /// Add one domain to the list
    Add { domain: String },
    /// Remove one domain from the list
    Remove { domain: String },
    /// Replace the whole list
    Set { domains: Vec<String> },
    /// Print the active block rules
    Rules,
}

pub async fn run(action: BlockedAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::init().await?;
    let dispatcher = ctx.background.dispatcher();
    match action {
        BlockedAction::List => {
            print_response(&dispatcher.handle(Request::BlockedGet).await)?;
        }
        BlockedAction::Add { domain } => {
            print_response(&dispatcher.handle(Request::BlockedAdd { domain }).await)?;
        }
        BlockedAction::Remove { domain } => {
            print_response(&dispatcher.handle(Request::BlockedRemove { domain }).await)?;
        }
        BlockedAction::Set { domains } => {
            print_response(&dispatcher.handle(Request::BlockedSet { list: domains }).await)?;
        }
        BlockedAction::Rules => {
            let rules = ctx.rules.active_rules()?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}
