//! File-backed host.
//!
//! [`SnapshotHost`] serves the [`Host`] operations from a JSON description of
//! the guilds the bot lives in. Role changes are written back to the file so
//! that a restarted bot sees the roles it granted. Messages are printed and
//! kept in an outbox.
//!
//! # File Format
//!
//! ```json
//! {
//!   "guilds": {
//!     "1": {
//!       "name": "kitchen",
//!       "channels": { "10": { "name": "general", "kind": "text" } },
//!       "roles": { "20": "meatball" },
//!       "members": {
//!         "100": { "name": "alice", "admin": true, "roles": [] },
//!         "101": { "name": "bob" },
//!         "900": { "name": "wordlebot", "bot": true }
//!       }
//!     }
//!   }
//! }
//! ```

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::PathBuf,
};

use anyhow::Context;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use crate::host::{ChannelId, Entity, GuildId, Host, HostError, MemberId, RoleId};

/// The complete state of the platform as the bot sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub guilds: BTreeMap<GuildId, GuildSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildSnapshot {
    pub name: String,
    #[serde(default)]
    pub channels: BTreeMap<ChannelId, ChannelSnapshot>,
    /// Role names indexed by role id
    #[serde(default)]
    pub roles: BTreeMap<RoleId, String>,
    #[serde(default)]
    pub members: BTreeMap<MemberId, MemberSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    #[serde(default)]
    pub admin: bool,
    /// Other bots share the guild, their messages are never answered
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
}

/// A message posted through [`SnapshotHost::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub guild: GuildId,
    pub channel: ChannelId,
    pub text: String,
}

/// [`Host`] implementation backed by a [`Snapshot`].
pub struct SnapshotHost {
    /// Where role changes are written back, `None` for an in-memory host
    path: Option<PathBuf>,
    snapshot: Mutex<Snapshot>,
    outbox: Mutex<Vec<SentMessage>>,
}

impl SnapshotHost {
    /// Creates an in-memory host that never touches the disk.
    #[cfg(test)]
    pub fn new(snapshot: Snapshot) -> Self {
        SnapshotHost {
            path: None,
            snapshot: Mutex::new(snapshot),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Loads the snapshot file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid snapshot. Unlike the
    /// store, a host without guilds is useless so there is no empty fallback.
    pub async fn load(path: PathBuf) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read guild snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse guild snapshot {}", path.display()))?;

        info!(
            "loaded guild snapshot {} with {} guilds",
            path.display(),
            snapshot.guilds.len()
        );

        Ok(SnapshotHost {
            path: Some(path),
            snapshot: Mutex::new(snapshot),
            outbox: Mutex::new(Vec::new()),
        })
    }

    /// Returns every message sent so far.
    #[cfg(test)]
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.outbox.lock().await.clone()
    }

    /// Returns a copy of the current snapshot.
    #[cfg(test)]
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().await.clone()
    }

    /// Whether `member` is a bot account. Unknown members are not.
    pub async fn is_bot(&self, guild: GuildId, member: MemberId) -> bool {
        let snapshot = self.snapshot.lock().await;
        member_of(&snapshot, guild, member).is_ok_and(|member| member.bot)
    }

    async fn persist(&self, snapshot: &Snapshot) {
        let Some(path) = &self.path else {
            return;
        };

        let serialized = match serde_json::to_string_pretty(snapshot) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("failed to serialize guild snapshot: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(path, serialized).await {
            error!("failed to persist guild snapshot: {}", e);
        }
    }

    /// Applies `change` to the member's role set and persists the snapshot.
    async fn update_roles(
        &self,
        guild: GuildId,
        member: MemberId,
        role: RoleId,
        change: impl FnOnce(&mut BTreeSet<RoleId>, RoleId),
    ) -> Result<(), HostError> {
        let snapshot = {
            let mut snapshot = self.snapshot.lock().await;
            let guild_snapshot = snapshot
                .guilds
                .get_mut(&guild)
                .ok_or(HostError::NotFound(Entity::Guild(guild)))?;

            if !guild_snapshot.roles.contains_key(&role) {
                return Err(HostError::NotFound(Entity::Role(role)));
            }

            let member_snapshot = guild_snapshot
                .members
                .get_mut(&member)
                .ok_or(HostError::NotFound(Entity::Member(member)))?;

            change(&mut member_snapshot.roles, role);
            snapshot.clone()
        };

        self.persist(&snapshot).await;
        Ok(())
    }
}

fn guild_of(snapshot: &Snapshot, guild: GuildId) -> Result<&GuildSnapshot, HostError> {
    snapshot
        .guilds
        .get(&guild)
        .ok_or(HostError::NotFound(Entity::Guild(guild)))
}

fn member_of(
    snapshot: &Snapshot,
    guild: GuildId,
    member: MemberId,
) -> Result<&MemberSnapshot, HostError> {
    guild_of(snapshot, guild)?
        .members
        .get(&member)
        .ok_or(HostError::NotFound(Entity::Member(member)))
}

impl Host for SnapshotHost {
    async fn guilds(&self) -> Result<Vec<GuildId>, HostError> {
        Ok(self.snapshot.lock().await.guilds.keys().copied().collect())
    }

    async fn find_guild(&self, guild: GuildId) -> Result<(), HostError> {
        guild_of(&*self.snapshot.lock().await, guild).map(|_| ())
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<(), HostError> {
        let snapshot = self.snapshot.lock().await;
        let channel_snapshot = guild_of(&snapshot, guild)?
            .channels
            .get(&channel)
            .ok_or(HostError::NotFound(Entity::Channel(channel)))?;

        match channel_snapshot.kind {
            ChannelKind::Text => Ok(()),
            ChannelKind::Voice => Err(HostError::NotTextChannel(channel)),
        }
    }

    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<(), HostError> {
        let snapshot = self.snapshot.lock().await;
        if guild_of(&snapshot, guild)?.roles.contains_key(&role) {
            Ok(())
        } else {
            Err(HostError::NotFound(Entity::Role(role)))
        }
    }

    async fn members(&self, guild: GuildId) -> Result<Vec<MemberId>, HostError> {
        let snapshot = self.snapshot.lock().await;
        Ok(guild_of(&snapshot, guild)?.members.keys().copied().collect())
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        member: MemberId,
    ) -> Result<HashSet<RoleId>, HostError> {
        let snapshot = self.snapshot.lock().await;
        Ok(member_of(&snapshot, guild, member)?
            .roles
            .iter()
            .copied()
            .collect())
    }

    async fn is_admin(&self, guild: GuildId, member: MemberId) -> Result<bool, HostError> {
        let snapshot = self.snapshot.lock().await;
        Ok(member_of(&snapshot, guild, member)?.admin)
    }

    async fn grant_role(
        &self,
        guild: GuildId,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), HostError> {
        debug!("grant role {} to member {} in guild {}", role, member, guild);
        self.update_roles(guild, member, role, |roles, role| {
            roles.insert(role);
        })
        .await
    }

    async fn revoke_role(
        &self,
        guild: GuildId,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), HostError> {
        debug!("revoke role {} from member {} in guild {}", role, member, guild);
        self.update_roles(guild, member, role, |roles, role| {
            roles.remove(&role);
        })
        .await
    }

    async fn send_message(
        &self,
        guild: GuildId,
        channel: ChannelId,
        text: &str,
    ) -> Result<(), HostError> {
        self.find_text_channel(guild, channel).await?;

        info!("message to channel {} in guild {}: {}", channel, guild, text);
        println!("[{}#{}] {}", guild, channel, text);

        self.outbox.lock().await.push(SentMessage {
            guild,
            channel,
            text: text.to_owned(),
        });

        Ok(())
    }
}
