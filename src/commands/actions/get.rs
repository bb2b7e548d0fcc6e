//! Get command handler.
//!
//! Shows the issuer their own Meatball Day. The reply is private.

use log::debug;

use crate::commands::{
    CommandContext, CommandResult,
    markdown_response::{format_day, format_day_not_set},
};

pub async fn handle_get<H>(context: &CommandContext<'_, H>) -> CommandResult {
    debug!("handling get command");

    let response = match context.store.day(context.guild_id, context.user_id).await {
        Some(day) => format_day(&day),
        None => format_day_not_set(),
    };

    CommandResult::private(response)
}
