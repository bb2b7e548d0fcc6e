//! Store persistence layer for loading and saving Meatball Days to disk.
//!
//! This module provides the [`StoreLoader`] for persisting guild settings and
//! member dates between bot restarts. The guilds map is serialized to JSON and
//! stored in a file.

use log::{error, info, warn};
use tokio::fs;

use crate::meatball::store::GuildsMap;

/// Handles loading and persisting the guilds map to disk.
///
/// If loading fails (file missing or corrupted), it returns an empty map
/// rather than failing, so the bot can always start. A corrupted file is moved
/// aside first so the next write cannot destroy it.
#[derive(Clone)]
pub struct StoreLoader {
    /// Path to the JSON file where the guilds map is stored.
    path: String,
}

impl StoreLoader {
    pub fn new(path: String) -> Self {
        StoreLoader { path }
    }

    /// Where a file that cannot be parsed is kept.
    fn corrupt_path(&self) -> String {
        format!("{}.corrupt", self.path)
    }

    /// Written first, then renamed over the store file.
    fn temp_path(&self) -> String {
        format!("{}.tmp", self.path)
    }

    /// Loads the guilds map from disk.
    ///
    /// # Error Handling
    ///
    /// - If the file doesn't exist or is empty: logs a warning and returns an empty map
    /// - If deserialization fails: moves the file to `<path>.corrupt`, logs an
    ///   error and returns an empty map
    /// - Invalid member days are dropped one by one, the rest is kept
    pub async fn load(&self) -> GuildsMap {
        let Ok(serialized_guilds_map) = fs::read_to_string(&self.path).await else {
            warn!("no persisted meatball days found, starting with an empty store");
            return GuildsMap::new();
        };

        if serialized_guilds_map.trim().is_empty() {
            warn!("persisted meatball days are empty, starting with an empty store");
            return GuildsMap::new();
        }

        let guilds_map: GuildsMap = match serde_json::from_str(&serialized_guilds_map) {
            Ok(guilds_map) => guilds_map,
            Err(e) => {
                error!(
                    "failed to deserialize persisted meatball days, starting with an empty store: {}",
                    e
                );
                self.move_aside().await;
                return GuildsMap::new();
            }
        };

        info!("loaded persisted meatball days for {} guilds", guilds_map.len());

        guilds_map
    }

    async fn move_aside(&self) {
        let corrupt_path = self.corrupt_path();
        match fs::rename(&self.path, &corrupt_path).await {
            Ok(()) => warn!("kept unreadable meatball days in {}", corrupt_path),
            Err(e) => error!(
                "failed to move unreadable meatball days to {}: {}",
                corrupt_path, e
            ),
        }
    }

    /// Persists the guilds map to disk.
    ///
    /// The map is written to a temporary file renamed over the store, so the
    /// store file is always either the old or the new content.
    ///
    /// Errors are logged but not propagated, allowing the bot to continue
    /// operating even if persistence fails.
    pub async fn persist_guilds_map(&self, guilds_map: &GuildsMap) {
        let serialized_guilds_map = match serde_json::to_string(guilds_map) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("failed to serialize meatball days: {}", e);
                return;
            }
        };

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &serialized_guilds_map).await {
            error!("failed to write meatball days to {}: {}", temp_path, e);
            return;
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            error!("failed to persist meatball days: {}", e);
            return;
        }

        info!("persisted meatball days");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{ChannelId, GuildId, MemberId, RoleId},
        meatball::{MeatballDay, store::GuildEntry},
    };
    use tempfile::{NamedTempFile, tempdir};

    #[tokio::test]
    async fn test_load_nonexistent_file_returns_empty_map() {
        let loader = StoreLoader::new("nonexistent_store.json".to_string());
        let guilds_map = loader.load().await;

        assert!(guilds_map.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_load_preserves_entries() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let loader = StoreLoader::new(path);

        let mut entry = GuildEntry {
            channel: Some(ChannelId(10)),
            role: Some(RoleId(20)),
            ..Default::default()
        };
        entry
            .members
            .insert(MemberId(100), MeatballDay::new(7, 4).unwrap());

        let mut guilds_map = GuildsMap::new();
        guilds_map.insert(GuildId(1), entry.clone());
        guilds_map.insert(GuildId(2), GuildEntry::default());

        loader.persist_guilds_map(&guilds_map).await;

        let loaded_map = loader.load().await;
        assert_eq!(loaded_map.len(), 2);
        assert_eq!(loaded_map.get(&GuildId(1)), Some(&entry));
        assert_eq!(loaded_map.get(&GuildId(2)), Some(&GuildEntry::default()));
    }

    #[tokio::test]
    async fn test_load_corrupted_json_moves_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meatball_days.json");
        let path = path.to_str().unwrap().to_string();
        fs::write(&path, "{ this is not valid json ").await.unwrap();

        let loader = StoreLoader::new(path.clone());
        assert!(loader.load().await.is_empty());

        // The original bytes survive, and persisting cannot overwrite them
        assert!(fs::metadata(&path).await.is_err());
        assert_eq!(
            fs::read_to_string(format!("{}.corrupt", path)).await.unwrap(),
            "{ this is not valid json "
        );
        loader.persist_guilds_map(&GuildsMap::new()).await;
        assert_eq!(
            fs::read_to_string(format!("{}.corrupt", path)).await.unwrap(),
            "{ this is not valid json "
        );
    }

    #[tokio::test]
    async fn test_load_empty_file_returns_empty_map() {
        let temp_file = NamedTempFile::new().unwrap();
        let loader = StoreLoader::new(temp_file.path().to_str().unwrap().to_string());

        assert!(loader.load().await.is_empty());
        assert!(temp_file.path().exists());
    }

    #[tokio::test]
    async fn test_load_drops_only_invalid_days() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meatball_days.json");
        let path = path.to_str().unwrap().to_string();
        let content = r#"{
            "1": {
                "channel": 10,
                "role": 20,
                "members": {"100": {"month": 7, "day": 4}, "101": {"month": 8, "day": 5}}
            },
            "2": {"members": {"200": {"month": 14, "day": 1}, "201": {"month": 2, "day": 30}}}
        }"#;
        fs::write(&path, content).await.unwrap();

        let loader = StoreLoader::new(path.clone());
        let loaded_map = loader.load().await;

        let first = loaded_map.get(&GuildId(1)).unwrap();
        assert_eq!(first.channel, Some(ChannelId(10)));
        assert_eq!(first.role, Some(RoleId(20)));
        assert_eq!(first.members.len(), 2);

        let second = loaded_map.get(&GuildId(2)).unwrap();
        assert_eq!(second.members.len(), 1);
        assert_eq!(
            second.members.get(&MemberId(201)),
            Some(&MeatballDay::new(2, 30).unwrap())
        );

        // Nothing was unreadable, the file stays where it is
        assert_eq!(fs::read_to_string(&path).await.unwrap(), content);
        assert!(fs::metadata(format!("{}.corrupt", path)).await.is_err());
    }

    #[tokio::test]
    async fn test_persist_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meatball_days.json");
        let loader = StoreLoader::new(path.to_str().unwrap().to_string());

        let mut guilds_map = GuildsMap::new();
        guilds_map.insert(GuildId(1), GuildEntry::default());
        loader.persist_guilds_map(&guilds_map).await;

        assert!(path.exists());
        assert!(!dir.path().join("meatball_days.json.tmp").exists());
        assert_eq!(loader.load().await, guilds_map);
    }
}
