//! Channel command handler.

use log::{debug, error};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{
            format_channel_not_found, format_channel_not_text, format_channel_set,
            format_host_error,
        },
    },
    host::{ChannelId, Host, HostError},
};

/// Sets the channel Meatball Days are announced in. Only text channels are
/// accepted.
pub async fn handle_channel<H: Host>(
    context: &CommandContext<'_, H>,
    channel: ChannelId,
) -> CommandResult {
    debug!("handling channel command");

    match context.host.find_text_channel(context.guild_id, channel).await {
        Ok(()) => {}
        Err(HostError::NotFound(_)) => {
            return CommandResult::private(format_channel_not_found(channel));
        }
        Err(HostError::NotTextChannel(_)) => {
            return CommandResult::private(format_channel_not_text(channel));
        }
        Err(e @ HostError::Unavailable(_)) => {
            error!(
                "failed to look up channel {} in guild {}: {}",
                channel, context.guild_id, e
            );
            return CommandResult::private(format_host_error(&e));
        }
    }

    context.store.set_channel(context.guild_id, channel).await;

    CommandResult::public(format_channel_set(channel))
}
