//! Command parsing.
//!
//! This module converts message text into structured [`Command`] enums. Month,
//! day and mention arguments are validated here so handlers only ever see
//! well-formed values.

use std::str::FromStr;

use command_parser::{Command as ParserCommand, Parser};
use log::debug;

use crate::{
    commands::markdown_response::{
        format_invalid_usage, format_unknown_command, format_validation_error,
    },
    host::{ChannelId, MemberId, RoleId},
    meatball::{MeatballDay, ValidationError},
};

/// Name every command starts with, after the `!` prefix.
pub const BOT_COMMAND: &str = "meatball";

/// Represents a parsed bot command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Display help information
    Help,
    /// Show the Meatball Day of the issuer
    Get,
    /// Set the Meatball Day of the issuer
    Set(MeatballDay),
    /// Forget the Meatball Day of the issuer
    Forget,
    /// Show whose Meatball Day comes next
    Next,
    /// Set the Meatball Day of another member (administrators only)
    Assign(MemberId, MeatballDay),
    /// Set the role given on Meatball Day (administrators only)
    Role(RoleId),
    /// Set the announcement channel (administrators only)
    Channel(ChannelId),
    /// Run a check immediately (administrators only)
    Recheck,
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The command is not for this bot (wrong prefix)
    NotMeatball,
    /// The command is not recognized
    Unknown,
    /// Missing or malformed arguments
    ///
    /// # Fields
    ///
    /// * `&str` - Subcommand name
    /// * `&str` - Full usage of the subcommand
    InvalidUsage(&'static str, &'static str),
    /// The month or the day is not valid
    InvalidDay(ValidationError),
}

const SET_USAGE: &str = "!meatball set <month> <day>";
const ASSIGN_USAGE: &str = "!meatball assign <member> <month> <day>";
const ROLE_USAGE: &str = "!meatball role <role>";
const CHANNEL_USAGE: &str = "!meatball channel <channel>";

impl Command {
    /// Parses a message string into a Command.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message is not a command format - [`CommandParsingError::UnableToParse`]
    /// - The command is for a different bot - [`CommandParsingError::NotMeatball`]
    /// - The command is not recognized - [`CommandParsingError::Unknown`]
    /// - Arguments are missing or not ids - [`CommandParsingError::InvalidUsage`]
    /// - The month or day is rejected - [`CommandParsingError::InvalidDay`]
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let body = body.to_string() + " dummy";

        // This is normal to fails if the message is not a command
        let command = match parser.parse(&body) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        // Ignore commands that are not for the bot
        if command.name != BOT_COMMAND {
            return Err(CommandParsingError::NotMeatball);
        }

        debug!("parsing command: {:?}", command);

        // If no arguments, return help
        if command.arguments.is_empty() {
            return Ok(Command::Help);
        }

        match command.arguments[0].as_str() {
            "help" => Ok(Command::Help),
            "get" => Ok(Command::Get),
            "set" => Ok(Command::Set(Self::parse_set(&command)?)),
            "forget" => Ok(Command::Forget),
            "next" => Ok(Command::Next),
            "assign" => {
                let (member, day) = Self::parse_assign(&command)?;
                Ok(Command::Assign(member, day))
            }
            "role" => Ok(Command::Role(Self::parse_id(&command, "role", ROLE_USAGE)?)),
            "channel" => Ok(Command::Channel(Self::parse_id(
                &command,
                "channel",
                CHANNEL_USAGE,
            )?)),
            "recheck" => Ok(Command::Recheck),
            _ => Err(CommandParsingError::Unknown),
        }
    }

    /// Whether only guild administrators may run the command.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Assign(..) | Command::Role(_) | Command::Channel(_) | Command::Recheck
        )
    }

    fn parse_set(command: &ParserCommand) -> Result<MeatballDay, CommandParsingError> {
        // 3 arguments: set, month and day
        if command.arguments.len() < 3 {
            return Err(CommandParsingError::InvalidUsage("set", SET_USAGE));
        }

        MeatballDay::parse(&command.arguments[1], &command.arguments[2])
            .map_err(CommandParsingError::InvalidDay)
    }

    fn parse_assign(
        command: &ParserCommand,
    ) -> Result<(MemberId, MeatballDay), CommandParsingError> {
        // 4 arguments: assign, member, month and day
        if command.arguments.len() < 4 {
            return Err(CommandParsingError::InvalidUsage("assign", ASSIGN_USAGE));
        }

        let member = command.arguments[1]
            .parse::<MemberId>()
            .map_err(|_| CommandParsingError::InvalidUsage("assign", ASSIGN_USAGE))?;
        let day = MeatballDay::parse(&command.arguments[2], &command.arguments[3])
            .map_err(CommandParsingError::InvalidDay)?;

        debug!("parsed assign command - member: {}, day: {}", member, day);

        Ok((member, day))
    }

    /// Parses the single id argument of `role` and `channel`.
    fn parse_id<T: FromStr>(
        command: &ParserCommand,
        name: &'static str,
        usage: &'static str,
    ) -> Result<T, CommandParsingError> {
        command
            .arguments
            .get(1)
            .and_then(|argument| argument.parse::<T>().ok())
            .ok_or(CommandParsingError::InvalidUsage(name, usage))
    }
}

/// Formats a command error into a user-friendly message.
///
/// `UnableToParse` and `NotMeatball` return `None` to avoid responding to
/// messages that are not meant for the bot.
pub fn format_command_error(error: CommandParsingError) -> Option<String> {
    match error {
        CommandParsingError::Unknown => Some(format_unknown_command()),
        CommandParsingError::InvalidUsage(name, usage) => Some(format_invalid_usage(name, usage)),
        CommandParsingError::InvalidDay(e) => Some(format_validation_error(&e)),
        CommandParsingError::UnableToParse | CommandParsingError::NotMeatball => None,
    }
}
