//! Next command handler.
//!
//! Finds whose Meatball Day comes next among the current members of the guild.
//! Days of members who left are ignored here; the daily check prunes them.

use std::collections::HashSet;

use log::{debug, error};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{format_host_error, format_next, format_nobody},
    },
    host::{Host, MemberId},
    meatball::next_meatball_day,
};

/// Replies with the member whose Meatball Day is the first strictly after today.
///
/// Dates that do not exist this year or the next (February 30th, or
/// February 29th outside leap years) are skipped.
pub async fn handle_next<H: Host>(context: &CommandContext<'_, H>) -> CommandResult {
    debug!("handling next command");

    let Some(entry) = context.store.guild(context.guild_id).await else {
        return CommandResult::private(format_nobody());
    };

    let members: HashSet<MemberId> = match context.host.members(context.guild_id).await {
        Ok(members) => members.into_iter().collect(),
        Err(e) => {
            error!("failed to list members of guild {}: {}", context.guild_id, e);
            return CommandResult::private(format_host_error(&e));
        }
    };

    let days = entry
        .members
        .into_iter()
        .filter(|(member, _)| members.contains(member));

    match next_meatball_day(days, context.today) {
        Some((member, date)) => CommandResult::public(format_next(member, date)),
        None => CommandResult::private(format_nobody()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::{
        commands::testing::{create_test_store, stopped_scheduler},
        host::{GuildId, HostError, MockHost},
        meatball::MeatballDay,
    };

    #[tokio::test]
    async fn test_handle_next_nobody() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        let mut host = MockHost::new();
        host.expect_members().never();

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let result = handle_next(&context).await;
        assert!(result.private);
        assert!(result.response.starts_with("Nobody has set their Meatball Day yet."));
    }

    #[tokio::test]
    async fn test_handle_next_ignores_departed_members() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        store
            .set_day(GuildId(1), MemberId(100), MeatballDay::new(3, 1).unwrap())
            .await;
        store
            .set_day(GuildId(1), MemberId(101), MeatballDay::new(2, 1).unwrap())
            .await;

        let mut host = MockHost::new();
        // Member 101 left the guild
        host.expect_members()
            .returning(|_| Ok(vec![MemberId(100), MemberId(102)]));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(102),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };

        let result = handle_next(&context).await;
        assert!(!result.private);
        assert_eq!(
            result.response,
            "Next Meatball Day is for <@100> on Mar 1, 2024! :eyes:"
        );
    }

    #[tokio::test]
    async fn test_handle_next_wraps_to_next_year() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        store
            .set_day(GuildId(1), MemberId(100), MeatballDay::new(7, 4).unwrap())
            .await;

        let mut host = MockHost::new();
        host.expect_members().returning(|_| Ok(vec![MemberId(100)]));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            // Today's Meatball Day does not count as next
            today: NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
        };

        assert_eq!(
            handle_next(&context).await.response,
            "Next Meatball Day is for <@100> on Jul 4, 2025! :eyes:"
        );
    }

    #[tokio::test]
    async fn test_handle_next_only_impossible_dates() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        store
            .set_day(GuildId(1), MemberId(100), MeatballDay::new(2, 30).unwrap())
            .await;

        let mut host = MockHost::new();
        host.expect_members().returning(|_| Ok(vec![MemberId(100)]));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        assert!(handle_next(&context).await.response.starts_with("Nobody"));
    }

    #[tokio::test]
    async fn test_handle_next_host_error() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        store
            .set_day(GuildId(1), MemberId(100), MeatballDay::new(7, 4).unwrap())
            .await;

        let mut host = MockHost::new();
        host.expect_members()
            .returning(|_| Err(HostError::Unavailable("timeout".to_string())));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let result = handle_next(&context).await;
        assert!(result.private);
        assert!(result.response.contains("host unavailable: timeout"));
    }
}
