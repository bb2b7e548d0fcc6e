//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, which serves as the main entry point
//! for processing bot commands. It coordinates command parsing and execution, routing
//! commands to their appropriate handlers.
//!
//! # Flow
//!
//! ```text
//! Message → parse() → Command → parse_command() → CommandResult
//! ```

use command_parser::Parser;
use log::{error, info};

use crate::{
    commands::{
        CommandContext, CommandParseError, CommandResult,
        actions::{
            handle_assign, handle_channel, handle_forget, handle_get, handle_help, handle_next,
            handle_recheck, handle_role, handle_set,
        },
        command::{Command, format_command_error},
        markdown_response::{format_host_error, format_not_admin},
    },
    host::Host,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// All commands must start with the `!meatball` prefix. Messages without this
/// prefix are silently ignored (returning [`CommandParseError::NotForBot`]).
pub struct Commander {
    /// Command parser for processing user commands
    parser: Parser,
}

impl Commander {
    /// Creates a new Commander instance with a configured command parser.
    ///
    /// The parser is configured to recognize commands starting with `!` as the command
    /// prefix and `-` as the option prefix.
    pub fn new() -> Self {
        let parser = Parser::new('!', '-');
        Commander { parser }
    }

    /// Parses a message body into a structured command.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForBot)` - Message is not a command or for a different bot
    /// * `Err(CommandParseError::InvalidCommand)` - Command syntax is invalid
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| {
            // Return silently if the command is not for the bot
            // Otherwise, send an error message
            match format_command_error(error) {
                Some(message) => CommandParseError::InvalidCommand(message),
                None => CommandParseError::NotForBot,
            }
        })
    }

    /// Executes a parsed command and returns the result.
    ///
    /// Administrator-only commands are refused for anyone the host does not
    /// report as an administrator of the guild.
    pub async fn parse_command<H: Host>(
        &self,
        command: &Command,
        context: &CommandContext<'_, H>,
    ) -> CommandResult {
        if command.requires_admin() {
            match context.host.is_admin(context.guild_id, context.user_id).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(
                        "member {} is not allowed to run {:?} in guild {}",
                        context.user_id, command, context.guild_id
                    );
                    return CommandResult::private(format_not_admin());
                }
                Err(e) => {
                    error!(
                        "failed to check permissions of member {} in guild {}: {}",
                        context.user_id, context.guild_id, e
                    );
                    return CommandResult::private(format_host_error(&e));
                }
            }
        }

        match command {
            Command::Help => handle_help(),
            Command::Get => handle_get(context).await,
            Command::Set(day) => handle_set(context, *day).await,
            Command::Forget => handle_forget(context).await,
            Command::Next => handle_next(context).await,
            Command::Assign(member, day) => handle_assign(context, *member, *day).await,
            Command::Role(role) => handle_role(context, *role).await,
            Command::Channel(channel) => handle_channel(context, *channel).await,
            Command::Recheck => handle_recheck(context).await,
        }
    }
}
