use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::contest::{self, ContestSeed};
use crate::engine::entry::{
    validate_team, JoinedStats, TRANSACTION_DEBIT, TRANSACTION_SUCCESS, WALLET_METHOD,
};
use crate::engine::fixtures::FixtureFetcher;
use crate::engine::inflight::InFlightJoins;
use crate::engine::reconcile::{reconcile, ReconcileReport};
use crate::engine::roster::{Roster, RosterProvider, RosterRequest};
use crate::engine::sweeper::{SweepReport, Sweeper};
use crate::error::{EntryError, StoreError};
use crate::models::entry::{JoinedEntry, Transaction, UserTeam, ENTRY_STATUS_ACTIVE};
use crate::models::fixture::SportType;
use crate::repository::store::Store;
use crate::util::time::reference_now;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    #[serde(flatten)]
    pub reconciled: ReconcileReport,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinReceipt {
    pub entry: JoinedEntry,
    pub new_balance: i32,
    pub roster_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSaved {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinedHistory {
    pub contests: Vec<JoinedEntry>,
    pub stats: JoinedStats,
}

/// The caller-facing side of the match lifecycle: sync, cleanup, rosters and contest entry.
pub struct Lifecycle {
    store: Arc<dyn Store>,
    fixtures: FixtureFetcher,
    rosters: RosterProvider,
    sweeper: Sweeper,
    in_flight: InFlightJoins,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn Store>, fixtures: FixtureFetcher, rosters: RosterProvider) -> Self {
        let in_flight = InFlightJoins::new();
        Lifecycle {
            store,
            fixtures,
            rosters,
            sweeper: Sweeper::new(in_flight.clone()),
            in_flight,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn in_flight(&self) -> &InFlightJoins {
        &self.in_flight
    }

    pub async fn sync(&self) -> SyncReport {
        self.sync_at(reference_now()).await
    }

    /// Fetch every sport, then reconcile. Storage failures end the cycle early and are reported,
    /// never raised.
    pub async fn sync_at(&self, now: NaiveDateTime) -> SyncReport {
        let fixtures = self.fixtures.fetch_all(now).await;
        let mut report = SyncReport {
            fetched: fixtures.len(),
            ..Default::default()
        };
        match reconcile(self.store.as_ref(), &fixtures, now).await {
            Ok(reconciled) => {
                report.reconciled = reconciled;
                report.success = true;
            }
            Err(e) => error!("Error in sync: {}", e),
        }
        report
    }

    pub async fn cleanup(&self) -> SweepReport {
        self.cleanup_at(reference_now()).await
    }

    pub async fn cleanup_at(&self, now: NaiveDateTime) -> SweepReport {
        self.sweeper.sweep(self.store.as_ref(), now).await
    }

    pub async fn create_contest_if_absent(
        &self,
        match_id: &str,
        match_name: &str,
        sport_type: SportType,
    ) -> Result<bool, StoreError> {
        let seed = ContestSeed {
            match_id: match_id.to_string(),
            match_name: match_name.to_string(),
            sport_type,
            details: None,
        };
        contest::create_if_absent(self.store.as_ref(), seed, reference_now()).await
    }

    pub async fn get_roster(&self, match_id: &str, team1: &str, team2: &str) -> Roster {
        self.get_roster_at(match_id, team1, team2, reference_now()).await
    }

    /// The 22 players of a match, produced on first request and stored from then on. Sport and
    /// date come from the stored match, or the contest when the match row is gone.
    ///
    /// Players are only stored for ids the sweeper can still reach through a match or contest.
    pub async fn get_roster_at(
        &self,
        match_id: &str,
        team1: &str,
        team2: &str,
        now: NaiveDateTime,
    ) -> Roster {
        let context = self.match_context(match_id).await;
        let known = context.is_some();
        let (sport, match_date) = context.unwrap_or((SportType::Cricket, None));
        let request = RosterRequest {
            match_id: match_id.to_string(),
            team1: team1.to_string(),
            team2: team2.to_string(),
            sport,
            match_date,
            now,
        };
        let roster = self.rosters.provide(&request).await;
        if roster.is_fresh() && known {
            match self.store.insert_players(&roster.players).await {
                Ok(n) => info!("stored {} players for match {}", n, match_id),
                Err(e) => warn!("Error storing players for {}: {}", match_id, e),
            }
        } else if roster.is_fresh() {
            debug!("match {} is not stored, roster not kept", match_id);
        }
        roster
    }

    /// Sport and date of a stored match or contest. `None` when neither row exists.
    pub async fn match_context(&self, match_id: &str) -> Option<(SportType, Option<String>)> {
        match self.store.find_match(match_id).await {
            Ok(Some(m)) => return Some((m.sport_type, Some(m.date))),
            Ok(None) => {}
            Err(e) => warn!("Error reading match {}: {}", match_id, e),
        }
        match self.store.find_contest(match_id).await {
            Ok(Some(c)) => Some((c.sport_type, c.match_date)),
            Ok(None) => None,
            Err(e) => {
                warn!("Error reading contest {}: {}", match_id, e);
                None
            }
        }
    }

    /// Pay the entry fee from the wallet, record the entry and make sure the roster exists.
    ///
    /// The match is marked in flight until this returns, so a concurrent sweep leaves it alone.
    pub async fn join_contest(
        &self,
        username: &str,
        contest_id: &str,
        now: NaiveDateTime,
    ) -> Result<JoinReceipt, EntryError> {
        let _guard = self.in_flight.enter(contest_id);

        if self.store.find_joined_entry(username, contest_id).await?.is_some() {
            return Err(EntryError::AlreadyJoined);
        }
        let contest = self
            .store
            .find_contest(contest_id)
            .await?
            .ok_or(EntryError::ContestNotFound)?;
        if contest.match_start_time.map_or(false, |start| now >= start) {
            return Err(EntryError::MatchStarted);
        }
        if contest.is_full() {
            return Err(EntryError::ContestFull);
        }
        let user = self
            .store
            .find_user(username)
            .await?
            .ok_or(EntryError::UserNotFound)?;
        if user.wallet < contest.entry_fee {
            return Err(EntryError::InsufficientBalance {
                balance: user.wallet,
                required: contest.entry_fee,
            });
        }

        let new_balance = user.wallet - contest.entry_fee;
        self.store.update_wallet(username, new_balance).await?;
        self.store
            .insert_transaction(&Transaction {
                uuid: Uuid::new_v4().to_string(),
                username: user.username.clone(),
                email: user.email.clone(),
                kind: TRANSACTION_DEBIT.to_string(),
                amount: contest.entry_fee,
                status: TRANSACTION_SUCCESS.to_string(),
                description: format!("Entry fee for contest {}", contest_id),
                contest_id: Some(contest_id.to_string()),
                method: WALLET_METHOD.to_string(),
                created_at: now,
            })
            .await?;
        let entry = JoinedEntry {
            username: user.username.clone(),
            email: user.email,
            contest_id: contest_id.to_string(),
            contest_title: contest.title.clone(),
            entry_fee: contest.entry_fee,
            prize_pool: contest.prize_pool,
            badge: contest.badge.clone(),
            status: ENTRY_STATUS_ACTIVE.to_string(),
            match_end_time: contest.match_end_time,
            joined_at: now,
        };
        self.store.insert_joined_entry(&entry).await?;
        self.store.increment_filled_spots(contest_id).await?;

        let roster_size = match (contest.teams.first(), contest.teams.get(1)) {
            (Some(team1), Some(team2)) => {
                self.get_roster_at(contest_id, team1, team2, now)
                    .await
                    .players
                    .len()
            }
            _ => {
                warn!("contest {} has no team names, roster not prepared", contest_id);
                0
            }
        };
        info!("{} joined contest {}", username, contest_id);
        Ok(JoinReceipt {
            entry,
            new_balance,
            roster_size,
        })
    }

    pub async fn save_team(
        &self,
        username: &str,
        contest_id: &str,
        selected_players: Vec<String>,
        captain_id: &str,
        vice_captain_id: &str,
        now: NaiveDateTime,
    ) -> Result<TeamSaved, EntryError> {
        validate_team(&selected_players, captain_id, vice_captain_id)?;

        let start = match self.store.find_match(contest_id).await? {
            Some(m) => Some(m.match_start_time),
            None => self
                .store
                .find_contest(contest_id)
                .await?
                .and_then(|c| c.match_start_time),
        };
        if start.map_or(false, |start| now >= start) {
            return Err(EntryError::TeamLocked);
        }

        let existing = self.store.find_user_team(username, contest_id).await?;
        let team = UserTeam {
            username: username.to_string(),
            contest_id: contest_id.to_string(),
            selected_players,
            captain_id: captain_id.to_string(),
            vice_captain_id: vice_captain_id.to_string(),
            created_at: existing.as_ref().map_or(now, |t| t.created_at),
            updated_at: now,
        };
        if existing.is_some() {
            self.store.update_user_team(&team).await?;
            Ok(TeamSaved::Updated)
        } else {
            self.store.insert_user_team(&team).await?;
            Ok(TeamSaved::Created)
        }
    }

    pub async fn joined_history(&self, username: &str) -> Result<JoinedHistory, StoreError> {
        let contests = self.store.joined_entries_for_user(username).await?;
        let stats = JoinedStats::from_entries(&contests);
        Ok(JoinedHistory { contests, stats })
    }
}
