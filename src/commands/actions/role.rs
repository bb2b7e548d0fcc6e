//! Role command handler.

use log::{debug, error};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{format_host_error, format_role_not_found, format_role_set},
    },
    host::{Host, HostError, RoleId},
};

/// Sets the role members hold on their Meatball Day.
///
/// The role must exist in the guild. Members already holding it are not
/// touched until the next check.
pub async fn handle_role<H: Host>(context: &CommandContext<'_, H>, role: RoleId) -> CommandResult {
    debug!("handling role command");

    match context.host.find_role(context.guild_id, role).await {
        Ok(()) => {}
        Err(HostError::NotFound(_)) => {
            return CommandResult::private(format_role_not_found(role));
        }
        Err(e) => {
            error!(
                "failed to look up role {} in guild {}: {}",
                role, context.guild_id, e
            );
            return CommandResult::private(format_host_error(&e));
        }
    }

    context.store.set_role(context.guild_id, role).await;

    CommandResult::public(format_role_set(role))
}
