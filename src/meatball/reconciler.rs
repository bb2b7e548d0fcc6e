//! Meatball Day role reconciliation.
//!
//! A pass walks every guild in the store and brings the Meatball Day role of
//! each recorded member in line with today's date: granted (and announced) on
//! the member's day, revoked on any other day. Running a pass twice on the same
//! day changes nothing the second time.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use crate::{
    host::{ChannelId, Entity, GuildId, Host, HostError, MemberId, RoleId},
    meatball::{GuildEntry, MeatballDay, MeatballStore},
};

/// Counters describing what a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub granted: usize,
    pub revoked: usize,
    pub notified: usize,
    pub pruned_members: usize,
    pub pruned_guilds: usize,
    pub skipped_guilds: usize,
    pub failures: usize,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "granted {}, revoked {}, notified {}, pruned {} members and {} guilds, skipped {} guilds, {} failures",
            self.granted,
            self.revoked,
            self.notified,
            self.pruned_members,
            self.pruned_guilds,
            self.skipped_guilds,
            self.failures
        )
    }
}

/// The message posted when a member's Meatball Day starts.
pub fn announcement(member: MemberId) -> String {
    format!(
        "It's {}'s Meatball Day! :partying_face::tada:",
        member.mention()
    )
}

/// Applies the Meatball Day role of every stored member for a given date.
pub struct Reconciler<H> {
    host: Arc<H>,
    store: MeatballStore,
    /// Held for the whole pass so two passes never interleave
    pass_lock: Mutex<()>,
}

impl<H: Host> Reconciler<H> {
    pub fn new(host: Arc<H>, store: MeatballStore) -> Self {
        Reconciler {
            host,
            store,
            pass_lock: Mutex::new(()),
        }
    }

    /// Runs one pass for `today`.
    ///
    /// Failures are contained to the entity they concern: a guild that cannot
    /// be resolved is skipped, a member whose roles cannot be changed is
    /// counted as a failure, and the pass carries on with the rest.
    pub async fn reconcile(&self, today: NaiveDate) -> PassReport {
        let _guard = self.pass_lock.lock().await;
        let mut report = PassReport::default();

        let mut guilds: Vec<(GuildId, GuildEntry)> =
            self.store.get_guilds_map().await.into_iter().collect();
        guilds.sort_by_key(|(guild, _)| *guild);

        debug!("reconciling meatball days of {} guilds for {}", guilds.len(), today);

        for (guild, entry) in guilds {
            self.reconcile_guild(guild, entry, today, &mut report).await;
        }

        info!("meatball day pass for {} done: {}", today, report);
        report
    }

    async fn reconcile_guild(
        &self,
        guild: GuildId,
        entry: GuildEntry,
        today: NaiveDate,
        report: &mut PassReport,
    ) {
        match self.host.find_guild(guild).await {
            Ok(()) => {}
            Err(HostError::NotFound(_)) => {
                warn!("guild {} no longer exists, removing its meatball days", guild);
                self.store.forget_guild(guild).await;
                report.pruned_guilds += 1;
                return;
            }
            Err(e) => {
                error!("failed to look up guild {}, skipping: {}", guild, e);
                report.skipped_guilds += 1;
                return;
            }
        }

        let Some((channel, role)) = self.resolve_settings(guild, &entry).await else {
            report.skipped_guilds += 1;
            return;
        };

        for (member, day) in entry.members {
            self.reconcile_member(guild, channel, role, member, day, today, report)
                .await;
        }
    }

    /// Resolves the announcement channel and the role of a guild, logging why
    /// the guild is skipped when either is unusable.
    async fn resolve_settings(
        &self,
        guild: GuildId,
        entry: &GuildEntry,
    ) -> Option<(ChannelId, RoleId)> {
        let Some(channel) = entry.channel else {
            warn!("no meatball day channel set in guild {}, skipping", guild);
            return None;
        };

        if let Err(e) = self.host.find_text_channel(guild, channel).await {
            warn!("cannot use channel {} in guild {}, skipping: {}", channel, guild, e);
            return None;
        }

        let Some(role) = entry.role else {
            warn!("no meatball day role set in guild {}, skipping", guild);
            return None;
        };

        if let Err(e) = self.host.find_role(guild, role).await {
            warn!("cannot use role {} in guild {}, skipping: {}", role, guild, e);
            return None;
        }

        Some((channel, role))
    }

    #[allow(clippy::too_many_arguments)]
    async fn reconcile_member(
        &self,
        guild: GuildId,
        channel: ChannelId,
        role: RoleId,
        member: MemberId,
        day: MeatballDay,
        today: NaiveDate,
        report: &mut PassReport,
    ) {
        let roles = match self.host.member_roles(guild, member).await {
            Ok(roles) => roles,
            Err(HostError::NotFound(Entity::Member(_))) => {
                warn!(
                    "member {} no longer exists in guild {}, removing their meatball day",
                    member, guild
                );
                self.store.forget_day(guild, member).await;
                report.pruned_members += 1;
                return;
            }
            Err(e) => {
                error!(
                    "failed to fetch roles of member {} in guild {}: {}",
                    member, guild, e
                );
                report.failures += 1;
                return;
            }
        };

        let is_meatball_day = day.is_on(today);
        let holds_role = roles.contains(&role);

        if is_meatball_day && !holds_role {
            if let Err(e) = self.host.grant_role(guild, member, role).await {
                error!(
                    "failed to add meatball day role to member {} in guild {}: {}",
                    member, guild, e
                );
                report.failures += 1;
                return;
            }
            info!("added meatball day role to member {} in guild {}", member, guild);
            report.granted += 1;

            match self
                .host
                .send_message(guild, channel, &announcement(member))
                .await
            {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    warn!(
                        "failed to announce meatball day of member {} in guild {}: {}",
                        member, guild, e
                    );
                    report.failures += 1;
                }
            }
        } else if !is_meatball_day && holds_role {
            if let Err(e) = self.host.revoke_role(guild, member, role).await {
                error!(
                    "failed to remove meatball day role from member {} in guild {}: {}",
                    member, guild, e
                );
                report.failures += 1;
                return;
            }
            info!(
                "removed meatball day role from member {} in guild {}",
                member, guild
            );
            report.revoked += 1;
        }
    }
}
