//! Forget command handler.

use log::{debug, error, info};

use crate::{
    commands::{CommandContext, CommandResult, markdown_response::format_day_forgotten},
    host::Host,
};

/// Removes the issuer's Meatball Day.
///
/// The reply is the same whether or not a day was recorded. A member holding
/// the Meatball Day role loses it, since no later check would take it back.
/// Failing to revoke is only logged, the day is forgotten anyway.
pub async fn handle_forget<H: Host>(context: &CommandContext<'_, H>) -> CommandResult {
    debug!("handling forget command");

    let (guild, member) = (context.guild_id, context.user_id);
    context.store.forget_day(guild, member).await;

    if let Some(role) = context.store.guild(guild).await.and_then(|entry| entry.role) {
        match context.host.member_roles(guild, member).await {
            Ok(roles) if roles.contains(&role) => {
                match context.host.revoke_role(guild, member, role).await {
                    Ok(()) => info!(
                        "removed meatball day role from member {} in guild {}",
                        member, guild
                    ),
                    Err(e) => error!(
                        "failed to remove meatball day role from member {} in guild {}: {}",
                        member, guild, e
                    ),
                }
            }
            Ok(_) => {}
            Err(e) => error!(
                "failed to fetch roles of member {} in guild {}: {}",
                member, guild, e
            ),
        }
    }

    CommandResult::private(format_day_forgotten())
}
