//! Bot command parsing and response formatting.
//!
//! This module provides the complete command processing pipeline of the bot,
//! letting members record their Meatball Day and administrators configure it.
//!
//! # Overview
//!
//! The commands module handles the entire lifecycle of bot commands:
//! 1. **Parsing** - Converting messages into structured [`command::Command`] enums
//! 2. **Validation** - Checking arguments, months and days
//! 3. **Authorization** - Administrator-only commands are checked against the host
//! 4. **Execution** - Routing commands to specialized handlers
//! 5. **Response** - Formatting results as Markdown
//!
//! # Architecture
//!
//! ```text
//! Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← Entry point: parse() + parse_command()
//! └─────────────┘
//!      │
//!      ├── parse() ────────────────────┐
//!      │                               ▼
//!                          ┌──────────────────┐
//!                          │  command::Command│
//!                          └──────────────────┘
//!      │
//!      └── parse_command() ───────────┐
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │ Action Handlers     │
//!                          │  - handle_help      │
//!                          │  - handle_get       │
//!                          │  - handle_set       │
//!                          │  - handle_forget    │
//!                          │  - handle_next      │
//!                          │  - handle_assign    │
//!                          │  - handle_role      │
//!                          │  - handle_channel   │
//!                          │  - handle_recheck   │
//!                          └─────────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌────────────────────┐
//!                          │  CommandResult     │
//!                          │  - response (MD)   │
//!                          │  - private flag    │
//!                          └────────────────────┘
//! ```
//!
//! # Command Structure
//!
//! All commands follow the format: `!meatball <subcommand> [args...]`
//!
//! | Command | Arguments | Who | Description |
//! |---------|-----------|-----|-------------|
//! | `help` | None | anyone | Display help information |
//! | `get` | None | anyone | Show your Meatball Day |
//! | `set` | `<month> <day>` | anyone | Set your Meatball Day |
//! | `forget` | None | anyone | Forget your Meatball Day |
//! | `next` | None | anyone | Show whose Meatball Day comes next |
//! | `assign` | `<member> <month> <day>` | admin | Set the Meatball Day of a member |
//! | `role` | `<role>` | admin | Set the Meatball Day role |
//! | `channel` | `<channel>` | admin | Set the announcement channel |
//! | `recheck` | None | admin | Check all members now |
//!
//! Members, roles and channels are given either as bare ids or as mentions.
//!
//! # Error Handling
//!
//! The module distinguishes between two error categories:
//!
//! - **Silent Errors** ([`CommandParseError::NotForBot`]): Messages that aren't commands
//!   or are for a different bot. These should not generate responses.
//!
//! - **User Errors** ([`CommandParseError::InvalidCommand`]): Invalid command syntax
//!   or arguments. These include helpful error messages for the user.

use chrono::NaiveDate;

use crate::{
    host::{GuildId, MemberId},
    meatball::{MeatballStore, SchedulerHandle},
};

mod actions;
mod command;
mod commander;
mod markdown_response;

pub use crate::commands::commander::Commander;

/// Runtime context for command execution.
///
/// Built by the caller for every message and passed to command handlers.
pub struct CommandContext<'a, H> {
    /// Guild the command was issued in
    pub guild_id: GuildId,
    /// Member who issued the command
    pub user_id: MemberId,
    pub host: &'a H,
    pub store: &'a MeatballStore,
    pub scheduler: &'a SchedulerHandle,
    /// Local date the command is handled on
    pub today: NaiveDate,
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Markdown-formatted response message
    pub response: String,
    /// Whether only the issuer should see the response
    pub private: bool,
}

impl CommandResult {
    pub fn public(response: String) -> Self {
        CommandResult {
            response,
            private: false,
        }
    }

    pub fn private(response: String) -> Self {
        CommandResult {
            response,
            private: true,
        }
    }
}

/// Errors that can occur during command parsing.
///
/// This enum distinguishes between errors that should produce user-facing
/// messages and those that should be silently ignored.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
    /// Invalid command syntax with error message
    InvalidCommand(String),
}
