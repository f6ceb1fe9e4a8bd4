use chrono::{Duration, NaiveDateTime};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::engine::inflight::InFlightJoins;
use crate::repository::store::{Result, Store};

/// Matches, contests, players and teams go once the match has been over this long.
pub fn match_retention() -> Duration {
    Duration::hours(1)
}

/// Joined entries are financial history and are kept longer.
pub fn joined_retention() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub matches: u64,
    pub contests: u64,
    pub players: u64,
    pub user_teams: u64,
    pub joined_contests: u64,
    /// Matches whose end time could not be read. They are never expired.
    pub skipped_unresolved: usize,
    /// Matches left alone because a join for them was running.
    pub skipped_in_flight: usize,
    pub failed_steps: usize,
}

impl SweepReport {
    fn count(&mut self, step: &str, match_id: &str, outcome: Result<u64>) -> u64 {
        match outcome {
            Ok(n) => n,
            Err(e) => {
                error!("sweep step {} failed for match {}: {}", step, match_id, e);
                self.failed_steps += 1;
                0
            }
        }
    }
}

pub struct Sweeper {
    in_flight: InFlightJoins,
}

impl Sweeper {
    pub fn new(in_flight: InFlightJoins) -> Self {
        Sweeper { in_flight }
    }

    /// One full expiry pass. Never fails; failed steps are logged and counted, and the next pass
    /// picks up whatever was left behind.
    pub async fn sweep(&self, store: &dyn Store, now: NaiveDateTime) -> SweepReport {
        let cutoff = now - match_retention();
        let cutoff_joined = now - joined_retention();
        let mut report = SweepReport::default();

        let matches = match store.all_matches().await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Error loading matches for cleanup: {}", e);
                report.failed_steps += 1;
                return report;
            }
        };

        let stored: Vec<String> = matches.iter().map(|m| m.match_id.clone()).collect();

        for record in matches {
            let id = record.match_id.as_str();
            let Some(end) = record.match_end_time.as_ref().and_then(|e| e.resolve()) else {
                debug!("match {} has no readable end time, keeping it", id);
                report.skipped_unresolved += 1;
                continue;
            };
            if end >= cutoff {
                continue;
            }
            if self.in_flight.is_active(id) {
                warn!("match {} has a join in progress, leaving it for the next sweep", id);
                report.skipped_in_flight += 1;
                continue;
            }

            let outcome = store.delete_contests(id).await;
            let contests = report.count("contests", id, outcome);
            let outcome = store.delete_players(id).await;
            let players = report.count("players", id, outcome);
            let outcome = store.delete_user_teams(id).await;
            let user_teams = report.count("user_teams", id, outcome);
            let joined = if end < cutoff_joined {
                let outcome = store.delete_joined_entries(id).await;
                report.count("joined_contests", id, outcome)
            } else {
                0
            };
            let outcome = store.delete_match(id).await;
            let deleted = report.count("matches", id, outcome);

            report.contests += contests;
            report.players += players;
            report.user_teams += user_teams;
            report.joined_contests += joined;
            report.matches += deleted;
        }

        // Entries whose match row went in an earlier pass. Stored matches were handled above with
        // their current end time; the snapshot on the entry may predate a reschedule.
        let outcome = store
            .delete_joined_entries_ended_before(cutoff_joined, &stored)
            .await;
        let orphaned = report.count("joined_contests", "*", outcome);
        report.joined_contests += orphaned;

        info!(
            "Cleanup: {} matches, {} contests, {} players, {} teams, {} joined entries removed",
            report.matches, report.contests, report.players, report.user_teams, report.joined_contests
        );
        report
    }
}
