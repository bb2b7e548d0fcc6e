//! Command action handlers.
//!
//! Individual handler functions for each bot command. Each handler receives a
//! [`CommandContext`](crate::commands::CommandContext), processes the command,
//! and returns a [`CommandResult`](crate::commands::CommandResult).
//!
//! # Handler Pattern
//!
//! Handlers follow a consistent pattern:
//! 1. Receive context with the issuer, the guild, the store and the host
//! 2. Check the arguments against the host when they name a member, role or channel
//! 3. Apply the change to the store and return a Markdown response
//!
//! Replies that only concern the issuer are flagged private.

mod assign;
mod channel;
mod forget;
mod get;
mod help;
mod next;
mod recheck;
mod role;
mod set;

pub use crate::commands::actions::{
    assign::handle_assign, channel::handle_channel, forget::handle_forget, get::handle_get,
    help::handle_help, next::handle_next, recheck::handle_recheck, role::handle_role,
    set::handle_set,
};
