//! Meatball Day: members pick a day of the year and hold a role on that day.
//!
//! This module provides the full Meatball Day life cycle:
//!
//! - [`MeatballDay`] - A validated month and day, with formatting helpers
//! - [`MeatballStore`] - Guild settings and member days, persisted to JSON
//! - [`Reconciler`] - One idempotent pass granting and revoking the role
//! - [`Scheduler`] - Wakes once a day at the configured time and runs a pass
//!
//! The scheduler and the reconciler are independent of the clock and of the
//! chat platform: both are injected through the [`Clock`] and
//! [`Host`](crate::host::Host) traits.

mod clock;
mod day;
mod reconciler;
mod scheduler;
mod store;
mod store_loader;

pub use crate::meatball::clock::{Clock, SystemClock};
pub use crate::meatball::day::{MeatballDay, ValidationError, next_meatball_day};
pub use crate::meatball::reconciler::{PassReport, Reconciler, announcement};
pub use crate::meatball::scheduler::{
    Scheduler, SchedulerError, SchedulerHandle, SchedulerSettings, SchedulerState,
};
pub use crate::meatball::store::{GuildEntry, MeatballStore};
use crate::meatball::store_loader::StoreLoader;
