//! Recheck command handler.
//!
//! Asks the scheduler for an immediate pass over every guild. The daily check
//! time is left unchanged.

use log::{debug, error};

use crate::commands::{
    CommandContext, CommandResult,
    markdown_response::{format_recheck_failed, format_rechecked},
};

pub async fn handle_recheck<H>(context: &CommandContext<'_, H>) -> CommandResult {
    debug!("handling recheck command");

    match context.scheduler.recheck().await {
        Ok(report) => {
            CommandResult::public(format_rechecked(&report, context.scheduler.state()))
        }
        Err(e) => {
            error!("manual meatball day check failed: {}", e);
            CommandResult::private(format_recheck_failed(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tempfile::NamedTempFile;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::{
        commands::testing::{create_test_store, stopped_scheduler},
        host::{GuildId, MemberId, MockHost},
        meatball::{Reconciler, Scheduler, SchedulerSettings, SystemClock},
    };

    #[tokio::test]
    async fn test_handle_recheck() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        // Nothing stored, so the pass never calls the host
        let reconciler = Reconciler::new(Arc::new(MockHost::new()), store.clone());
        let (scheduler, handle) = Scheduler::new(
            reconciler,
            SystemClock,
            SchedulerSettings::default(),
            CancellationToken::new(),
        )
        .unwrap();
        let task = tokio::spawn(scheduler.run());

        let host = MockHost::new();
        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &handle,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let result = handle_recheck(&context).await;
        assert!(!result.private);
        assert!(
            result
                .response
                .starts_with("I have rechecked all members for Meatball Day.")
        );
        assert!(result.response.contains("- **granted**: 0"));

        handle.shutdown();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_handle_recheck_stopped_scheduler() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = create_test_store(&temp_file).await;
        let scheduler = stopped_scheduler(&store);
        let host = MockHost::new();
        let context = CommandContext {
            guild_id: GuildId(1),
            user_id: MemberId(100),
            host: &host,
            store: &store,
            scheduler: &scheduler,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let result = handle_recheck(&context).await;
        assert!(result.private);
        assert!(result.response.contains("scheduler is stopped"));
    }
}
