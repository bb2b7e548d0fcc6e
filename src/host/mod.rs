//! The chat platform as seen by the bot.
//!
//! The scheduler and the commands never talk to a chat platform directly. They
//! go through the [`Host`] trait, which exposes the handful of guild, member,
//! role and message operations Meatball Day needs.
//!
//! # Modules
//!
//! - `ids` - Strongly typed identifiers for guilds, members, channels and roles
//! - `snapshot` - [`SnapshotHost`], a file-backed host used by the binary
//!
//! # Errors
//!
//! Every lookup returns a [`HostError`]. Callers distinguish a vanished entity
//! ([`HostError::NotFound`]) from any other failure so they can prune stored
//! state in the first case and only skip in the second.

use std::{collections::HashSet, fmt};

use mockall::automock;
use thiserror::Error;

mod ids;
mod snapshot;

pub use crate::host::ids::{ChannelId, GuildId, MemberId, RoleId};
pub use crate::host::snapshot::SnapshotHost;
#[cfg(test)]
pub use crate::host::snapshot::{ChannelKind, ChannelSnapshot, GuildSnapshot, MemberSnapshot, Snapshot};

/// An entity the host could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Guild(GuildId),
    Channel(ChannelId),
    Role(RoleId),
    Member(MemberId),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Entity::Guild(id) => write!(f, "guild {}", id),
            Entity::Channel(id) => write!(f, "channel {}", id),
            Entity::Role(id) => write!(f, "role {}", id),
            Entity::Member(id) => write!(f, "member {}", id),
        }
    }
}

/// Errors returned by a [`Host`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// The entity does not exist (anymore) on the platform.
    #[error("{0} not found")]
    NotFound(Entity),
    /// The channel exists but messages cannot be posted to it.
    #[error("channel {0} is not a text channel")]
    NotTextChannel(ChannelId),
    /// Any other platform failure.
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// Operations the bot needs from the chat platform.
///
/// This trait abstracts the platform for easier testing with mocks.
#[automock]
pub trait Host {
    /// Lists the guilds the bot is a member of.
    async fn guilds(&self) -> Result<Vec<GuildId>, HostError>;
    /// Checks that a guild still exists.
    async fn find_guild(&self, guild: GuildId) -> Result<(), HostError>;
    /// Checks that a channel exists in the guild and accepts text messages.
    async fn find_text_channel(&self, guild: GuildId, channel: ChannelId)
    -> Result<(), HostError>;
    /// Checks that a role exists in the guild.
    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<(), HostError>;
    /// Lists the current members of a guild.
    async fn members(&self, guild: GuildId) -> Result<Vec<MemberId>, HostError>;
    /// Fetches the roles a member currently holds.
    async fn member_roles(
        &self,
        guild: GuildId,
        member: MemberId,
    ) -> Result<HashSet<RoleId>, HostError>;
    /// Whether the member has administrator permissions in the guild.
    async fn is_admin(&self, guild: GuildId, member: MemberId) -> Result<bool, HostError>;
    async fn grant_role(
        &self,
        guild: GuildId,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), HostError>;
    async fn revoke_role(
        &self,
        guild: GuildId,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), HostError>;
    /// Posts a message to a channel of the guild.
    async fn send_message(
        &self,
        guild: GuildId,
        channel: ChannelId,
        text: &str,
    ) -> Result<(), HostError>;
}
