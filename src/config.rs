//! Configuration of the meatbot.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables prefixed by `MEATBOT_`, nested keys being separated
//! by `__`. Every setting has a default, the file only lists what differs.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # JSON description of the guilds the bot lives in
//! snapshot: "guilds.json"
//!
//! scheduler:
//!   # Local time of the daily check, as HH:MM
//!   check_time: "09:00"
//!   # Longest single sleep while waiting for the check
//!   max_sleep_secs: 10800
//!   # Pause after each daily check
//!   settle_secs: 1
//!
//! store:
//!   # How often Meatball Days are written to disk
//!   persistence_interval_secs: 60
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export MEATBOT_SNAPSHOT="/srv/meatbot/guilds.json"
//! export MEATBOT_SCHEDULER__CHECK_TIME="08:30"
//! ```

use std::{path::Path, time::Duration};

use chrono::NaiveTime;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meatball::SchedulerSettings;

const ENV_PREFIX: &str = "MEATBOT_";
const CHECK_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    Missing(String),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
    #[error("check time {0} is not a valid HH:MM time")]
    InvalidCheckTime(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the guild snapshot served by the host
    pub snapshot: String,
    pub scheduler: Scheduler,
    pub store: Store,
}

/// Timing of the daily Meatball Day check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    /// Local time of day, formatted `HH:MM`
    pub check_time: String,
    pub max_sleep_secs: u64,
    pub settle_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub persistence_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            snapshot: "guilds.json".to_string(),
            scheduler: Scheduler {
                check_time: "09:00".to_string(),
                max_sleep_secs: 3 * 60 * 60,
                settle_secs: 1,
            },
            store: Store {
                persistence_interval_secs: 60,
            },
        }
    }
}

impl Config {
    /// Loads the configuration from the YAML file at `path`.
    ///
    /// Defaults are overridden by the file, which is overridden by the
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist or if a value has the wrong type.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Err(ConfigError::Missing(path.to_string()));
        }

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        debug!("loaded configuration: {:?}", config);

        Ok(config)
    }

    /// Converts the scheduler section into [`SchedulerSettings`].
    ///
    /// # Errors
    ///
    /// Fails on a malformed check time or a zero `max_sleep_secs`.
    pub fn scheduler_settings(&self) -> Result<SchedulerSettings, ConfigError> {
        let check_time =
            NaiveTime::parse_from_str(&self.scheduler.check_time, CHECK_TIME_FORMAT)
                .map_err(|_| ConfigError::InvalidCheckTime(self.scheduler.check_time.clone()))?;

        if self.scheduler.max_sleep_secs == 0 {
            return Err(ConfigError::ZeroDuration("scheduler.max_sleep_secs"));
        }

        Ok(SchedulerSettings {
            check_time,
            max_sleep: Duration::from_secs(self.scheduler.max_sleep_secs),
            settle: Duration::from_secs(self.scheduler.settle_secs),
        })
    }

    /// Interval between two writes of the store.
    ///
    /// # Errors
    ///
    /// Fails when the interval is zero.
    pub fn persistence_interval(&self) -> Result<Duration, ConfigError> {
        match self.store.persistence_interval_secs {
            0 => Err(ConfigError::ZeroDuration("store.persistence_interval_secs")),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let file = write_config("snapshot: guilds.json\n");
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config, Config::default());

        let settings = config.scheduler_settings().unwrap();
        assert_eq!(settings.check_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(settings.max_sleep, Duration::from_secs(10800));
        assert_eq!(settings.settle, Duration::from_secs(1));
        assert_eq!(config.persistence_interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let file = write_config(
            "snapshot: /srv/guilds.json\n\
             scheduler:\n  check_time: \"18:45\"\n  max_sleep_secs: 600\n\
             store:\n  persistence_interval_secs: 5\n",
        );
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.snapshot, "/srv/guilds.json");
        assert_eq!(config.scheduler.check_time, "18:45");
        assert_eq!(config.scheduler.max_sleep_secs, 600);
        // Keys missing from the file keep their default
        assert_eq!(config.scheduler.settle_secs, 1);
        assert_eq!(config.store.persistence_interval_secs, 5);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config("scheduler:\n  check_time: \"18:45\"\n");

        // SAFETY: env-var tests run serially
        unsafe {
            std::env::set_var("MEATBOT_SCHEDULER__CHECK_TIME", "07:15");
            std::env::set_var("MEATBOT_SNAPSHOT", "from-env.json");
        }
        let config = Config::load(file.path().to_str().unwrap());
        unsafe {
            std::env::remove_var("MEATBOT_SCHEDULER__CHECK_TIME");
            std::env::remove_var("MEATBOT_SNAPSHOT");
        }

        let config = config.unwrap();
        assert_eq!(config.scheduler.check_time, "07:15");
        assert_eq!(config.snapshot, "from-env.json");
    }

    #[test]
    #[serial]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("nonexistent_config.yaml"),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_wrong_type() {
        let file = write_config("scheduler:\n  max_sleep_secs: forever\n");
        assert!(matches!(
            Config::load(file.path().to_str().unwrap()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_check_time() {
        let mut config = Config::default();
        config.scheduler.check_time = "25:00".to_string();
        assert!(matches!(
            config.scheduler_settings(),
            Err(ConfigError::InvalidCheckTime(time)) if time == "25:00"
        ));

        config.scheduler.check_time = "noon".to_string();
        assert!(config.scheduler_settings().is_err());
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        let mut config = Config::default();
        config.scheduler.max_sleep_secs = 0;
        config.store.persistence_interval_secs = 0;

        assert!(matches!(
            config.scheduler_settings(),
            Err(ConfigError::ZeroDuration("scheduler.max_sleep_secs"))
        ));
        assert!(matches!(
            config.persistence_interval(),
            Err(ConfigError::ZeroDuration("store.persistence_interval_secs"))
        ));
    }
}
