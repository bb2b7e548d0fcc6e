//! Meatbot - A chat bot that celebrates each member's Meatball Day.
//!
//! This is the main entry point for the meatbot. Members record the day of
//! the year they want to be celebrated, and every day at a configured time the
//! bot hands them a role and announces them in a channel. The role is taken
//! back the day after.
//!
//! # Features
//!
//! - **Meatball Days**: Members set, show and forget their own Meatball Day
//! - **Daily Check**: The role is granted and revoked once a day, idempotently
//! - **Administration**: Administrators choose the role and the channel, set
//!   the day of other members, and trigger a check on demand
//! - **Game Score Reactions**: Daily puzzle scores (Wordle, Waffle...) earn emoji
//! - **Persistence**: Meatball Days survive restarts
//! - **YAML Configuration**: Simple configuration file format with environment variable support
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! snapshot: "guilds.json"
//! scheduler:
//!   check_time: "09:00"
//! ```
//!
//! Every key is optional, see [`config`] for the complete list.
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `MEATBOT_` prefix:
//!
//! ```bash
//! export MEATBOT_SNAPSHOT="/srv/meatbot/guilds.json"
//! export MEATBOT_SCHEDULER__CHECK_TIME="08:30"
//! ```
//!
//! # Usage
//!
//! ```bash
//! meatbot --config config.yaml --data ./meatbot-data < messages.txt
//! ```
//!
//! Each input line is a message: `<guild id> <member id> <text>`.
//!
//! # Bot Commands
//!
//! - `!meatball help` - Display help information
//! - `!meatball get` - Show your Meatball Day
//! - `!meatball set <month> <day>` - Set your Meatball Day
//! - `!meatball forget` - Forget your Meatball Day
//! - `!meatball next` - Show whose Meatball Day comes next
//! - `!meatball assign <member> <month> <day>` - Set the Meatball Day of a member (admin)
//! - `!meatball role <role>` - Set the Meatball Day role (admin)
//! - `!meatball channel <channel>` - Set the announcement channel (admin)
//! - `!meatball recheck` - Check all members now (admin)
//!
//! # Architecture
//!
//! - [`bot`] - Main bot logic wiring the services and the console together
//! - [`commands`] - Command parsing and execution with validation
//! - [`config`] - YAML configuration loading with environment variable support
//! - [`console`] - Line-based message input
//! - [`host`] - The chat platform seen through the `Host` trait, and its file-backed implementation
//! - [`meatball`] - Meatball Days, their store, the daily reconciler and its scheduler
//! - [`reactions`] - Game score reactions
//! - [`utils`] - Utility functions for path handling
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod console;
mod host;
mod meatball;
mod reactions;
mod utils;

/// Command-line arguments for the meatbot.
///
/// # Examples
///
/// ```bash
/// meatbot --config config.yaml --data ./meatbot-data
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Values can be overridden with `MEATBOT_` environment variables, nested
    /// keys separated by `__`.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// This directory will contain `meatball_days.json`, the guild settings
    /// and the Meatball Days of the members. It is created if missing.
    #[arg(short, long)]
    data: String,
}

/// Main entry point for the meatbot.
///
/// 1. **Logging Setup**: `info` level by default, overridden with `RUST_LOG`
/// 2. **Argument Parsing**: Parses command-line arguments using `clap`
/// 3. **Configuration Loading**: Reads the YAML file and the environment
/// 4. **Bot Initialization**: Loads the guild snapshot and the stored Meatball
///    Days, starts the daily scheduler and the persistence task
/// 5. **Bot Execution**: Serves console messages until stdin is closed or
///    Ctrl-C is received
///
/// Configuration and initialization errors are logged and end the process.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("starting meatbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config, &args.data).await {
        Ok(b) => b,
        Err(e) => {
            error!("failed to initialize bot: {:#}", e);
            return;
        }
    };
    bot.start().await;
}
