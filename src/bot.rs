//! Bot module wiring the Meatball Day services together.
//!
//! This module provides the main [`Bot`] implementation. It owns the host, the
//! store of Meatball Days, the daily scheduler and the message handlers, and
//! drives their lifecycle from startup to a clean shutdown.
//!
//! # Architecture
//!
//! The bot operates with three concurrent tasks:
//!
//! 1. **Scheduler Task**: Sleeps until the daily check time, then grants the
//!    Meatball Day role to the members whose day it is, announces them, and
//!    takes the role back from the others.
//!
//! 2. **Console Task** (main): Reads messages from stdin, runs the
//!    `!meatball` commands they contain, reacts to game scores, and prints the
//!    answers.
//!
//! 3. **Store Persistence Task**: Periodically saves the Meatball Days to disk
//!    so they survive restarts.
//!
//! # Message Processing Flow
//!
//! ```text
//! Console Line → Bot Author? → Parse Command ─┬→ Execute → Reply
//!                                             └→ Not a command → Reactions
//! ```
//!
//! # Shutdown
//!
//! The end of stdin or Ctrl-C cancels the scheduler and the persistence task,
//! waits for them, and persists the store a last time.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use log::{debug, error, info};
use tokio::{fs, signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    commands::{CommandContext, CommandParseError, CommandResult, Commander},
    config::Config,
    console::{self, Console},
    host::{GuildId, Host, MemberId, SnapshotHost},
    meatball::{
        Clock, MeatballStore, Reconciler, Scheduler, SchedulerHandle, SchedulerSettings,
        SystemClock,
    },
    reactions::Reactor,
    utils::get_path,
};

/// Name of the file holding the Meatball Days inside the data directory.
const STORE_FILE: &str = "meatball_days.json";

/// What the bot answers to a single message.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BotResponse {
    /// Reply to a `!meatball` command
    pub reply: Option<CommandResult>,
    /// Emoji reactions to a game score, in reaction table order
    pub reactions: Vec<&'static str>,
}

/// Main bot structure.
///
/// Created with [`Bot::new`], which already starts the scheduler and the store
/// persistence task. [`Bot::start`] then serves the console until it is closed.
pub struct Bot {
    host: Arc<SnapshotHost>,
    store: MeatballStore,
    commander: Commander,
    reactor: Reactor,
    scheduler: SchedulerHandle,
    clock: SystemClock,
    scheduler_task: JoinHandle<()>,
    persistence_task: JoinHandle<()>,
}

impl Bot {
    /// Creates a new Bot instance from configuration and the data directory.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration, see [`crate::config`]
    /// * `data_path` - Directory holding the Meatball Day store, created if missing
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The scheduler settings are invalid (malformed check time, zero durations)
    /// - The guild snapshot cannot be read or parsed
    /// - The data directory cannot be created
    pub async fn new(config: Config, data_path: &str) -> Result<Self, anyhow::Error> {
        let settings = config.scheduler_settings()?;
        let persistence_interval = config.persistence_interval()?;

        let host = Arc::new(SnapshotHost::load(PathBuf::from(&config.snapshot)).await?);
        info!("serving {} guilds", host.guilds().await?.len());

        fs::create_dir_all(data_path)
            .await
            .with_context(|| format!("failed to create data directory {}", data_path))?;
        let store = MeatballStore::new(get_path(data_path, STORE_FILE)).await;

        Self::with_services(host, store, settings, persistence_interval)
    }

    /// Starts the scheduler and persistence tasks around an existing host and store.
    fn with_services(
        host: Arc<SnapshotHost>,
        store: MeatballStore,
        settings: SchedulerSettings,
        persistence_interval: Duration,
    ) -> Result<Self, anyhow::Error> {
        let reactor = Reactor::new()?;
        let cancel = CancellationToken::new();
        let clock = SystemClock;

        let reconciler = Reconciler::new(Arc::clone(&host), store.clone());
        let (scheduler, scheduler_handle) =
            Scheduler::new(reconciler, clock, settings, cancel.clone())?;

        let scheduler_task = Self::start_scheduler_task(scheduler);
        let persistence_task = store.start_persistence_task(persistence_interval, cancel);

        Ok(Bot {
            host,
            store,
            commander: Commander::new(),
            reactor,
            scheduler: scheduler_handle,
            clock,
            scheduler_task,
            persistence_task,
        })
    }

    /// Spawns the scheduler loop. An error ending the loop is only logged, the
    /// bot keeps answering commands and `recheck` reports the scheduler stopped.
    fn start_scheduler_task(scheduler: Scheduler<SnapshotHost, SystemClock>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = scheduler.run().await {
                error!("meatball day scheduler failed: {}", e);
            }
        })
    }

    /// Serves the console until stdin is closed or Ctrl-C is received, then
    /// shuts down.
    pub async fn start(self) {
        let mut console = Console::stdin();

        loop {
            let message = tokio::select! {
                message = console.next_message() => message,
                _ = signal::ctrl_c() => {
                    info!("received ctrl-c");
                    None
                }
            };

            let Some(message) = message else {
                break;
            };

            let response = self
                .on_message(message.guild, message.member, &message.text)
                .await;
            for line in console::render(response.reply.as_ref(), &response.reactions) {
                println!("{}", line);
            }
        }

        self.shutdown().await;
    }

    /// Handles a message posted by `member` in `guild`.
    ///
    /// Commands get a reply; any other message may earn reactions. Messages of
    /// bots are ignored.
    pub async fn on_message(&self, guild: GuildId, member: MemberId, body: &str) -> BotResponse {
        if self.host.is_bot(guild, member).await {
            debug!("ignoring message of bot {} in guild {}", member, guild);
            return BotResponse::default();
        }

        let command = match self.commander.parse(body) {
            Ok(command) => command,
            Err(CommandParseError::InvalidCommand(message)) => {
                return BotResponse {
                    reply: Some(CommandResult::private(message)),
                    reactions: Vec::new(),
                };
            }
            // Not a command, maybe a game score
            Err(CommandParseError::NotForBot) => {
                return BotResponse {
                    reply: None,
                    reactions: self.reactor.reactions(body),
                };
            }
        };

        let context = CommandContext {
            guild_id: guild,
            user_id: member,
            host: &*self.host,
            store: &self.store,
            scheduler: &self.scheduler,
            today: self.clock.now().date(),
        };

        BotResponse {
            reply: Some(self.commander.parse_command(&command, &context).await),
            reactions: Vec::new(),
        }
    }

    /// Stops the background tasks and persists the store one last time.
    async fn shutdown(self) {
        info!("shutting down");
        self.scheduler.shutdown();

        if let Err(e) = self.scheduler_task.await {
            error!("meatball day scheduler task panicked: {}", e);
        }
        if let Err(e) = self.persistence_task.await {
            error!("store persistence task panicked: {}", e);
        }

        self.store.persist().await;
        info!("meatball days saved, bye");
    }
}
