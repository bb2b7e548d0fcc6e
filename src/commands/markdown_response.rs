//! Markdown response formatters for bot commands.
//!
//! This module provides functions to format bot responses in Markdown format.
//! Every reply the bot sends to a member is built here so the wording stays in
//! one place.

use chrono::NaiveDate;

use crate::{
    host::{ChannelId, HostError, MemberId, RoleId},
    meatball::{MeatballDay, PassReport, SchedulerError, SchedulerState, ValidationError},
};

/// Formats the help message showing available bot commands.
///
/// # Examples
///
/// ```ignore
/// # use meatbot::commands::markdown_response::format_help;
/// let help = format_help();
/// assert!(help.contains("Commands:"));
/// ```
pub fn format_help() -> String {
    let body = "Commands:\n\
        - `get`: show your Meatball Day\n\
        - `set <month> <day>`: set your Meatball Day\n\
        - `forget`: forget your Meatball Day\n\
        - `next`: show whose Meatball Day comes next\n\
        - `help`: show this help message\n\n\
        Administrator commands:\n\
        - `assign <member> <month> <day>`: set the Meatball Day of a member\n\
        - `role <role>`: set the role given on Meatball Day\n\
        - `channel <channel>`: set the channel where Meatball Days are announced\n\
        - `recheck`: check all members for Meatball Day now\n\n\
        Every day at the check time, members whose Meatball Day it is receive the role and are announced in the channel. The role is removed the day after.";

    body.to_owned()
}

/// Formats a response for an unknown command.
pub fn format_unknown_command() -> String {
    "Unknown command. Type `!meatball help` for more information.".to_owned()
}

/// Formats an error response for a command used with the wrong arguments.
///
/// `name` is the subcommand, `usage` its full syntax.
pub fn format_invalid_usage(name: &str, usage: &str) -> String {
    format!("Invalid {} command. Usage: `{}`", name, usage)
}

/// Formats a rejected month or day.
///
/// # Examples
///
/// ```ignore
/// # use meatbot::commands::markdown_response::format_validation_error;
/// # use meatbot::meatball::ValidationError;
/// let msg = format_validation_error(&ValidationError::NotNumeric("july".to_string()));
/// assert_eq!(msg, "july is not a number. Please try again.");
/// ```
pub fn format_validation_error(error: &ValidationError) -> String {
    format!("{}. Please try again.", error)
}

pub fn format_not_admin() -> String {
    "Only administrators can use this command.".to_owned()
}

/// Formats a failure of the chat platform while handling a command.
pub fn format_host_error(error: &HostError) -> String {
    format!(
        "Something went wrong while talking to the server ({}). Please try again later.",
        error
    )
}

pub fn format_day(day: &MeatballDay) -> String {
    format!("Your Meatball Day is {}. :calendar:", day)
}

pub fn format_day_not_set() -> String {
    "You have not set your Meatball Day yet. Please use `!meatball set` to set it.".to_owned()
}

pub fn format_day_set(day: &MeatballDay) -> String {
    format!("I have set your Meatball Day to {}! :calendar:", day)
}

pub fn format_day_forgotten() -> String {
    "Your Meatball Day has been lost, like tears in rain. :magic_wand:".to_owned()
}

/// Formats the next upcoming Meatball Day, dated like `Jul 4, 2025`.
///
/// # Examples
///
/// ```ignore
/// # use meatbot::commands::markdown_response::format_next;
/// # use meatbot::host::MemberId;
/// # use chrono::NaiveDate;
/// let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
/// assert_eq!(
///     format_next(MemberId(42), date),
///     "Next Meatball Day is for <@42> on Jul 4, 2025! :eyes:"
/// );
/// ```
pub fn format_next(member: MemberId, date: NaiveDate) -> String {
    format!(
        "Next Meatball Day is for {} on {}! :eyes:",
        member.mention(),
        date.format("%b %-d, %Y")
    )
}

pub fn format_nobody() -> String {
    "Nobody has set their Meatball Day yet. You could be the first! Use `!meatball set` to get started."
        .to_owned()
}

pub fn format_member_day_set(member: MemberId, day: &MeatballDay) -> String {
    format!("I have set {}'s Meatball Day to {}.", member.mention(), day)
}

pub fn format_member_not_found(member: MemberId) -> String {
    format!("{} is not a member of this server.", member.mention())
}

pub fn format_role_set(role: RoleId) -> String {
    format!("I have set the Meatball Day role to {}.", role.mention())
}

pub fn format_role_not_found(role: RoleId) -> String {
    format!("Role {} does not exist on this server.", role)
}

pub fn format_channel_set(channel: ChannelId) -> String {
    format!("I have set the Meatball Day channel to {}.", channel.mention())
}

pub fn format_channel_not_found(channel: ChannelId) -> String {
    format!("Channel {} does not exist on this server.", channel)
}

pub fn format_channel_not_text(channel: ChannelId) -> String {
    format!("{} is not a text channel.", channel.mention())
}

/// Formats the outcome of a manual check.
///
/// When the scheduler is idle the time of the next daily check is appended.
pub fn format_rechecked(report: &PassReport, state: SchedulerState) -> String {
    let mut response = format!(
        "I have rechecked all members for Meatball Day.\n\n\
        - **granted**: {}\n\
        - **revoked**: {}\n\
        - **announced**: {}\n\
        - **forgotten members**: {}\n\
        - **skipped servers**: {}\n\
        - **failures**: {}",
        report.granted,
        report.revoked,
        report.notified,
        report.pruned_members,
        report.skipped_guilds,
        report.failures
    );

    if let SchedulerState::Idle { next_wake } = state {
        response.push_str(&format!(
            "\n\nNext check is at {}.",
            next_wake.format("%Y-%m-%d %H:%M")
        ));
    }

    response
}

pub fn format_recheck_failed(error: &SchedulerError) -> String {
    format!("I could not recheck Meatball Days: {}.", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_help() {
        let help = format_help();
        assert!(help.contains("Commands:"));
        assert!(help.contains("`set <month> <day>`"));
        assert!(help.contains("`recheck`"));
    }

    #[test]
    fn test_format_unknown_command() {
        assert!(format_unknown_command().contains("Unknown command"));
    }

    #[test]
    fn test_format_invalid_usage() {
        assert_eq!(
            format_invalid_usage("set", "!meatball set <month> <day>"),
            "Invalid set command. Usage: `!meatball set <month> <day>`"
        );
    }

    #[test]
    fn test_format_validation_error() {
        let error = ValidationError::OutOfRange {
            value: "13".to_string(),
            start: 1,
            stop: 12,
        };
        assert_eq!(
            format_validation_error(&error),
            "13 is out of range 1-12. Please try again."
        );
    }

    #[test]
    fn test_format_day() {
        let day = MeatballDay::new(7, 4).unwrap();
        assert_eq!(format_day(&day), "Your Meatball Day is July 4th. :calendar:");
        assert_eq!(
            format_day_set(&day),
            "I have set your Meatball Day to July 4th! :calendar:"
        );
        assert_eq!(
            format_member_day_set(MemberId(7), &day),
            "I have set <@7>'s Meatball Day to July 4th."
        );
    }

    #[test]
    fn test_format_next_day_without_padding() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(
            format_next(MemberId(1), date),
            "Next Meatball Day is for <@1> on Jan 9, 2025! :eyes:"
        );
    }

    #[test]
    fn test_format_settings() {
        assert_eq!(
            format_role_set(RoleId(20)),
            "I have set the Meatball Day role to <@&20>."
        );
        assert_eq!(
            format_channel_set(ChannelId(10)),
            "I have set the Meatball Day channel to <#10>."
        );
        assert_eq!(format_channel_not_text(ChannelId(10)), "<#10> is not a text channel.");
    }

    #[test]
    fn test_format_rechecked_with_next_wake() {
        let report = PassReport {
            granted: 2,
            notified: 2,
            ..Default::default()
        };
        let next_wake = NaiveDate::from_ymd_opt(2024, 7, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let response = format_rechecked(&report, SchedulerState::Idle { next_wake });
        assert!(response.starts_with("I have rechecked all members for Meatball Day."));
        assert!(response.contains("- **granted**: 2"));
        assert!(response.ends_with("Next check is at 2024-07-05 09:00."));

        let response = format_rechecked(&report, SchedulerState::Running);
        assert!(!response.contains("Next check"));
    }

    #[test]
    fn test_format_recheck_failed() {
        assert_eq!(
            format_recheck_failed(&SchedulerError::Stopped),
            "I could not recheck Meatball Days: meatball day scheduler is stopped."
        );
    }
}
