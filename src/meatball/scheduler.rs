//! Daily Meatball Day check loop.
//!
//! The [`Scheduler`] sleeps until the configured check time, runs a
//! reconciliation pass, then schedules the next check for the same time
//! tomorrow. Long waits are split into chunks of at most `max_sleep` so a
//! suspended machine or a clock change is noticed within one chunk.
//!
//! The loop is driven from the outside through a [`SchedulerHandle`]: it can be
//! asked for an immediate pass, observed, and stopped.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use log::{debug, info};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    host::Host,
    meatball::{Clock, PassReport, Reconciler},
};

/// Errors ending the scheduler or returned to callers of its handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The next check time cannot be represented.
    #[error("cannot schedule the check following {0}")]
    InvalidSchedule(NaiveDateTime),
    #[error("meatball day scheduler is stopped")]
    Stopped,
}

/// What the scheduler is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for `next_wake`.
    Idle { next_wake: NaiveDateTime },
    /// A reconciliation pass is in progress.
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Local time of day at which the daily pass runs
    pub check_time: NaiveTime,
    /// Longest single sleep while waiting for the next check
    pub max_sleep: Duration,
    /// Pause after a scheduled pass before the next evaluation
    pub settle: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            check_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            max_sleep: Duration::from_secs(3 * 60 * 60),
            settle: Duration::from_secs(1),
        }
    }
}

/// A pending manual pass, answered with the report of that pass.
type RecheckRequest = oneshot::Sender<PassReport>;

/// The scheduling loop. Build one with [`Scheduler::new`] and spawn [`Scheduler::run`].
pub struct Scheduler<H, C> {
    reconciler: Reconciler<H>,
    clock: C,
    settings: SchedulerSettings,
    state: watch::Sender<SchedulerState>,
    rechecks: mpsc::Receiver<RecheckRequest>,
    cancel: CancellationToken,
}

/// Cloneable remote control of a running [`Scheduler`].
#[derive(Clone)]
pub struct SchedulerHandle {
    state: watch::Receiver<SchedulerState>,
    rechecks: mpsc::Sender<RecheckRequest>,
    cancel: CancellationToken,
}

/// First check time at or after `now`.
///
/// Unlike a plain "tomorrow at check time", a check still ahead today is kept.
fn first_wake(now: NaiveDateTime, check_time: NaiveTime) -> Result<NaiveDateTime, SchedulerError> {
    let today = now.date().and_time(check_time);
    if today >= now {
        return Ok(today);
    }
    next_wake_after(now, check_time)
}

/// Check time on the day following `now`.
fn next_wake_after(
    now: NaiveDateTime,
    check_time: NaiveTime,
) -> Result<NaiveDateTime, SchedulerError> {
    now.date()
        .succ_opt()
        .map(|tomorrow| tomorrow.and_time(check_time))
        .ok_or(SchedulerError::InvalidSchedule(now))
}

/// How long to sleep before re-evaluating, or `None` when the wake time is
/// reached.
fn sleep_duration(
    now: NaiveDateTime,
    next_wake: NaiveDateTime,
    max_sleep: Duration,
) -> Option<Duration> {
    let remaining = next_wake - now;
    if remaining <= TimeDelta::zero() {
        return None;
    }

    let remaining = remaining.to_std().unwrap_or(max_sleep);
    Some(remaining.min(max_sleep))
}

impl<H: Host, C: Clock> Scheduler<H, C> {
    /// Creates the scheduler and its handle.
    ///
    /// The first check is today at the check time if that is still ahead,
    /// tomorrow otherwise. Cancelling `cancel` stops the loop.
    pub fn new(
        reconciler: Reconciler<H>,
        clock: C,
        settings: SchedulerSettings,
        cancel: CancellationToken,
    ) -> Result<(Self, SchedulerHandle), SchedulerError> {
        let next_wake = first_wake(clock.now(), settings.check_time)?;
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle { next_wake });
        let (recheck_tx, recheck_rx) = mpsc::channel(8);

        let scheduler = Scheduler {
            reconciler,
            clock,
            settings,
            state: state_tx,
            rechecks: recheck_rx,
            cancel: cancel.clone(),
        };
        let handle = SchedulerHandle {
            state: state_rx,
            rechecks: recheck_tx,
            cancel,
        };

        Ok((scheduler, handle))
    }

    /// Runs the loop until cancelled.
    ///
    /// Cancellation is only observed while waiting, so a pass that has started
    /// always completes.
    pub async fn run(mut self) -> Result<(), SchedulerError> {
        let mut next_wake = self.next_wake();
        debug!("meatball day scheduler started, first check at {}", next_wake);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if let Some(sleep) =
                sleep_duration(self.clock.now(), next_wake, self.settings.max_sleep)
            {
                info!(
                    "next check is at {}; sleeping for {}s",
                    next_wake,
                    sleep.as_secs()
                );

                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    Some(reply) = self.rechecks.recv() => {
                        self.manual_pass(next_wake, reply).await;
                    }
                    _ = time::sleep(sleep) => {}
                }
                continue;
            }

            info!("check time has elapsed, checking for meatball days now");
            self.pass().await;

            next_wake = next_wake_after(self.clock.now(), self.settings.check_time)?;
            self.state.send_replace(SchedulerState::Idle { next_wake });

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = time::sleep(self.settings.settle) => {}
            }
        }

        info!("meatball day scheduler stopped");
        Ok(())
    }

    fn next_wake(&self) -> NaiveDateTime {
        match *self.state.borrow() {
            SchedulerState::Idle { next_wake } => next_wake,
            SchedulerState::Running => self.clock.now(),
        }
    }

    async fn pass(&self) -> PassReport {
        self.state.send_replace(SchedulerState::Running);
        self.reconciler.reconcile(self.clock.now().date()).await
    }

    /// Runs a pass out of schedule, leaving `next_wake` untouched.
    async fn manual_pass(&self, next_wake: NaiveDateTime, reply: RecheckRequest) {
        info!("manual meatball day check requested");
        let report = self.pass().await;
        self.state.send_replace(SchedulerState::Idle { next_wake });

        if reply.send(report).is_err() {
            debug!("manual meatball day check requester went away");
        }
    }
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Asks the scheduler for an immediate pass and waits for its report.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Stopped`] if the loop is no longer running.
    pub async fn recheck(&self) -> Result<PassReport, SchedulerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.rechecks
            .send(reply_tx)
            .await
            .map_err(|_| SchedulerError::Stopped)?;
        reply_rx.await.map_err(|_| SchedulerError::Stopped)
    }

    /// Stops the loop at its next suspension point.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
