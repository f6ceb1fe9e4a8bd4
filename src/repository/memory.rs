use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::models::contest::{Contest, CONTEST_STATUS_OPEN};
use crate::models::entry::{JoinedEntry, Transaction, UserTeam};
use crate::models::fixture::{Match, SportType};
use crate::models::player::Player;
use crate::models::user::User;
use crate::repository::store::{Result, Store};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    matches: Vec<Match>,
    contests: Vec<Contest>,
    players: Vec<Player>,
    user_teams: Vec<UserTeam>,
    joined_contests: Vec<JoinedEntry>,
    transactions: Vec<Transaction>,
}

/// Document-store style implementation kept entirely in memory. Used by the test suite and by
/// local runs without Postgres.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn remove_where<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|r| !pred(r));
    (before - rows.len()) as u64
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.lock().await.users.push(user);
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.tables.lock().await.transactions.clone()
    }

    pub async fn contest_count(&self, match_id: &str) -> usize {
        let tables = self.tables.lock().await;
        tables.contests.iter().filter(|c| c.match_id == match_id).count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_match(&self, match_id: &str) -> Result<Option<Match>> {
        let tables = self.tables.lock().await;
        Ok(tables.matches.iter().find(|m| m.match_id == match_id).cloned())
    }

    async fn all_matches(&self) -> Result<Vec<Match>> {
        Ok(self.tables.lock().await.matches.clone())
    }

    async fn matches_by_sport(&self, sport: SportType, limit: i64) -> Result<Vec<Match>> {
        let tables = self.tables.lock().await;
        let mut found: Vec<Match> = tables
            .matches
            .iter()
            .filter(|m| m.sport_type == sport)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn insert_match(&self, record: &Match) -> Result<()> {
        self.tables.lock().await.matches.push(record.clone());
        Ok(())
    }

    async fn update_match(&self, record: &Match) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for existing in tables.matches.iter_mut().filter(|m| m.match_id == record.match_id) {
            *existing = record.clone();
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_match(&self, match_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.matches, |m| m.match_id == match_id))
    }

    async fn find_contest(&self, match_id: &str) -> Result<Option<Contest>> {
        let tables = self.tables.lock().await;
        Ok(tables.contests.iter().find(|c| c.match_id == match_id).cloned())
    }

    async fn open_contests(&self, sport: Option<SportType>, limit: i64) -> Result<Vec<Contest>> {
        let tables = self.tables.lock().await;
        let mut found: Vec<Contest> = tables
            .contests
            .iter()
            .filter(|c| c.status == CONTEST_STATUS_OPEN)
            .filter(|c| sport.map_or(true, |s| c.sport_type == s))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.match_start_time);
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn insert_contest(&self, contest: &Contest) -> Result<()> {
        self.tables.lock().await.contests.push(contest.clone());
        Ok(())
    }

    async fn increment_filled_spots(&self, match_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for contest in tables.contests.iter_mut().filter(|c| c.match_id == match_id) {
            contest.filled_spots += 1;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_contests(&self, match_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.contests, |c| c.match_id == match_id))
    }

    async fn players_for_match(&self, match_id: &str) -> Result<Vec<Player>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .players
            .iter()
            .filter(|p| p.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn insert_players(&self, players: &[Player]) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut inserted = 0;
        for player in players {
            let taken = tables
                .players
                .iter()
                .any(|p| p.match_id == player.match_id && p.player_id == player.player_id);
            if !taken {
                tables.players.push(player.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn delete_players(&self, match_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.players, |p| p.match_id == match_id))
    }

    async fn find_user_team(&self, username: &str, contest_id: &str) -> Result<Option<UserTeam>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .user_teams
            .iter()
            .find(|t| t.username == username && t.contest_id == contest_id)
            .cloned())
    }

    async fn insert_user_team(&self, team: &UserTeam) -> Result<()> {
        self.tables.lock().await.user_teams.push(team.clone());
        Ok(())
    }

    async fn update_user_team(&self, team: &UserTeam) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for existing in tables
            .user_teams
            .iter_mut()
            .filter(|t| t.username == team.username && t.contest_id == team.contest_id)
        {
            *existing = team.clone();
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_user_teams(&self, contest_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.user_teams, |t| t.contest_id == contest_id))
    }

    async fn find_joined_entry(
        &self,
        username: &str,
        contest_id: &str,
    ) -> Result<Option<JoinedEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .joined_contests
            .iter()
            .find(|e| e.username == username && e.contest_id == contest_id)
            .cloned())
    }

    async fn joined_entries_for_user(&self, username: &str) -> Result<Vec<JoinedEntry>> {
        let tables = self.tables.lock().await;
        let mut found: Vec<JoinedEntry> = tables
            .joined_contests
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(found)
    }

    async fn insert_joined_entry(&self, entry: &JoinedEntry) -> Result<()> {
        self.tables.lock().await.joined_contests.push(entry.clone());
        Ok(())
    }

    async fn delete_joined_entries(&self, contest_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.joined_contests, |e| e.contest_id == contest_id))
    }

    async fn delete_joined_entries_ended_before(
        &self,
        cutoff: NaiveDateTime,
        stored: &[String],
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.joined_contests, |e| {
            e.match_end_time.map_or(false, |end| end < cutoff) && !stored.contains(&e.contest_id)
        }))
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.tables.lock().await.transactions.push(transaction.clone());
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_wallet(&self, username: &str, balance: i32) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for user in tables.users.iter_mut().filter(|u| u.username == username) {
            user.wallet = balance;
            updated += 1;
        }
        Ok(updated)
    }
}
