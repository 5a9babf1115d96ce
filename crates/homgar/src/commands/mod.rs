//! Command dispatch: bridges CLI args -> facade calls -> output formatting.

pub mod auth;
pub mod devices;
pub mod homes;
pub mod status;

use homgar_core::Home;

use crate::cli::{Command, GlobalOpts, HomeFilterArgs};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a cloud-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Homes => homes::handle(ctx, global).await,
        Command::Devices(args) => devices::handle(ctx, &args, global).await,
        Command::Status(args) => status::handle(ctx, &args, global).await,
        Command::Login(args) => auth::login(ctx, &args, global).await,
        Command::Logout => {
            auth::logout(ctx, global);
            Ok(())
        }
        // Completions is handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}

/// The resolved hierarchy, or just the one home asked for.
pub(crate) async fn resolve_homes(
    ctx: &Context,
    filter: &HomeFilterArgs,
) -> Result<Vec<Home>, CliError> {
    match filter.home {
        Some(ref id) => Ok(vec![ctx.homgar.get_home(id).await?]),
        None => Ok(ctx.homgar.get_hierarchy().await?),
    }
}
