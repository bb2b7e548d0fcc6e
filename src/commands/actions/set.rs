//! Set command handler.
//!
//! Records the issuer's Meatball Day. The month and day are validated while
//! parsing, so the handler only stores them.

use log::debug;

use crate::{
    commands::{CommandContext, CommandResult, markdown_response::format_day_set},
    meatball::MeatballDay,
};

pub async fn handle_set<H>(context: &CommandContext<'_, H>, day: MeatballDay) -> CommandResult {
    debug!("handling set command");

    context
        .store
        .set_day(context.guild_id, context.user_id, day)
        .await;

    CommandResult::private(format_day_set(&day))
}
