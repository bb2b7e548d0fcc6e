//! In-memory store of guild settings and member Meatball Days.
//!
//! [`MeatballStore`] is shared between the commands, which edit it, and the
//! reconciler, which reads it and prunes entries that point at vanished guilds
//! or members. Every operation takes the lock for its own read-modify-write
//! only; there are no cross-key transactions.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    host::{ChannelId, GuildId, MemberId, RoleId},
    meatball::{MeatballDay, StoreLoader},
};

pub type GuildsMap = HashMap<GuildId, GuildEntry>;

/// Settings and member dates of one guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEntry {
    /// Channel the Meatball Day announcements are posted to
    #[serde(default)]
    pub channel: Option<ChannelId>,
    /// Role held by members on their Meatball Day
    #[serde(default)]
    pub role: Option<RoleId>,
    #[serde(default, deserialize_with = "deserialize_members")]
    pub members: BTreeMap<MemberId, MeatballDay>,
}

/// Reads member days one by one so an invalid record only loses itself.
fn deserialize_members<'de, D>(deserializer: D) -> Result<BTreeMap<MemberId, MeatballDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw_members = BTreeMap::<MemberId, serde_json::Value>::deserialize(deserializer)?;

    Ok(raw_members
        .into_iter()
        .filter_map(
            |(member, value)| match serde_json::from_value::<MeatballDay>(value) {
                Ok(day) => Some((member, day)),
                Err(e) => {
                    warn!("dropping invalid meatball day of member {}: {}", member, e);
                    None
                }
            },
        )
        .collect())
}

/// Thread-safe handle on the guilds map. Clones share the same map.
#[derive(Clone)]
pub struct MeatballStore {
    guilds_map: Arc<Mutex<GuildsMap>>,
    loader: StoreLoader,
}

impl MeatballStore {
    /// Creates a store and loads the persisted guilds map from `path`.
    ///
    /// A missing or corrupted file results in an empty store.
    pub async fn new(path: String) -> Self {
        let loader = StoreLoader::new(path);
        let guilds_map = Arc::new(Mutex::new(loader.load().await));

        MeatballStore { guilds_map, loader }
    }

    /// Returns a clone of the whole guilds map.
    pub async fn get_guilds_map(&self) -> GuildsMap {
        self.guilds_map.lock().await.clone()
    }

    /// Returns a clone of one guild's entry, if the guild has any data.
    pub async fn guild(&self, guild: GuildId) -> Option<GuildEntry> {
        self.guilds_map.lock().await.get(&guild).cloned()
    }

    pub async fn day(&self, guild: GuildId, member: MemberId) -> Option<MeatballDay> {
        self.guilds_map
            .lock()
            .await
            .get(&guild)
            .and_then(|entry| entry.members.get(&member).copied())
    }

    /// Records (or replaces) a member's Meatball Day.
    pub async fn set_day(&self, guild: GuildId, member: MemberId, day: MeatballDay) {
        self.guilds_map
            .lock()
            .await
            .entry(guild)
            .or_default()
            .members
            .insert(member, day);

        info!(
            "set meatball day of member {} in guild {} to {}",
            member, guild, day
        );
    }

    /// Removes a member's Meatball Day. Returns whether one was recorded.
    pub async fn forget_day(&self, guild: GuildId, member: MemberId) -> bool {
        let removed = self
            .guilds_map
            .lock()
            .await
            .get_mut(&guild)
            .and_then(|entry| entry.members.remove(&member))
            .is_some();

        if removed {
            info!("forgot meatball day of member {} in guild {}", member, guild);
        }

        removed
    }

    pub async fn set_channel(&self, guild: GuildId, channel: ChannelId) {
        self.guilds_map.lock().await.entry(guild).or_default().channel = Some(channel);
        info!("set meatball day channel of guild {} to {}", guild, channel);
    }

    pub async fn set_role(&self, guild: GuildId, role: RoleId) {
        self.guilds_map.lock().await.entry(guild).or_default().role = Some(role);
        info!("set meatball day role of guild {} to {}", guild, role);
    }

    /// Removes everything stored for a guild.
    pub async fn forget_guild(&self, guild: GuildId) {
        if self.guilds_map.lock().await.remove(&guild).is_some() {
            info!("forgot all meatball day data of guild {}", guild);
        }
    }

    /// Writes the current guilds map to disk.
    pub async fn persist(&self) {
        let guilds_map = self.get_guilds_map().await;
        self.loader.persist_guilds_map(&guilds_map).await;
    }

    /// Starts a background task that persists the store every `interval`.
    ///
    /// The task stops once `cancel` is cancelled. It does not persist on the
    /// way out; callers persist once more after shutting everything down.
    pub fn start_persistence_task(
        &self,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut interval = time::interval(interval);
            // The first tick completes immediately, nothing changed yet
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("store persistence task stopped");
                        break;
                    }
                    _ = interval.tick() => store.persist().await,
                }
            }
        })
    }
}
