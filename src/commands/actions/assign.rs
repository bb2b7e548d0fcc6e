//! Assign command handler.
//!
//! Lets an administrator record the Meatball Day of another member. The member
//! must currently belong to the guild.

use log::{debug, error};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{format_host_error, format_member_day_set, format_member_not_found},
    },
    host::{Host, HostError, MemberId},
    meatball::MeatballDay,
};

pub async fn handle_assign<H: Host>(
    context: &CommandContext<'_, H>,
    member: MemberId,
    day: MeatballDay,
) -> CommandResult {
    debug!("handling assign command");

    match context.host.member_roles(context.guild_id, member).await {
        Ok(_) => {}
        Err(HostError::NotFound(_)) => {
            debug!("member {} not found in guild {}", member, context.guild_id);
            return CommandResult::private(format_member_not_found(member));
        }
        Err(e) => {
            error!(
                "failed to look up member {} in guild {}: {}",
                member, context.guild_id, e
            );
            return CommandResult::private(format_host_error(&e));
        }
    }

    context.store.set_day(context.guild_id, member, day).await;

    CommandResult::public(format_member_day_set(member, &day))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::{
        commands::testing::{create_test_store, stopped_scheduler},
        host::{Entity, GuildId, MockHost},
    };

    #[tokio::test]
    async fn test_handle_assign() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        let mut host = MockHost::new();
        host.expect_member_roles()
            .with(eq(GuildId(1)), eq(MemberId(101)))
            .times(1)
            .returning(|_, _| Ok(HashSet::new()));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let day = MeatballDay::new(12, 25).unwrap();

        let result = handle_assign(&context, MemberId(101), day).await;

        assert!(!result.private);
        assert_eq!(
            result.response,
            "I have set <@101>'s Meatball Day to December 25th."
        );
        assert_eq!(store.day(GuildId(1), MemberId(101)).await, Some(day));
        assert_eq!(store.day(GuildId(1), MemberId(100)).await, None);
    }

    #[tokio::test]
    async fn test_handle_assign_unknown_member() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        let mut host = MockHost::new();
        host.expect_member_roles()
            .returning(|_, member| Err(HostError::NotFound(Entity::Member(member))));

        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let result = handle_assign(&context, MemberId(999), MeatballDay::new(1, 1).unwrap()).await;

        assert!(result.private);
        assert_eq!(result.response, "<@999> is not a member of this server.");
        assert!(store.get_guilds_map().await.is_empty());
    }
}
