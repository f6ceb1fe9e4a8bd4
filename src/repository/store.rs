use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::models::contest::Contest;
use crate::models::entry::{JoinedEntry, Transaction, UserTeam};
use crate::models::fixture::{Match, SportType};
use crate::models::player::Player;
use crate::models::user::User;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage boundary shared by the lifecycle engine and the route layer.
///
/// Rows are related only by `match_id` / `contest_id`; nothing here cascades. Every `delete_*`
/// returns the number of rows it removed so callers can report what a sweep did.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_match(&self, match_id: &str) -> Result<Option<Match>>;
    async fn all_matches(&self) -> Result<Vec<Match>>;
    async fn matches_by_sport(&self, sport: SportType, limit: i64) -> Result<Vec<Match>>;
    async fn insert_match(&self, record: &Match) -> Result<()>;
    /// Full-field replace of the row with the same `match_id`.
    async fn update_match(&self, record: &Match) -> Result<u64>;
    async fn delete_match(&self, match_id: &str) -> Result<u64>;

    async fn find_contest(&self, match_id: &str) -> Result<Option<Contest>>;
    /// Open contests ordered by match start, earliest first.
    async fn open_contests(&self, sport: Option<SportType>, limit: i64) -> Result<Vec<Contest>>;
    async fn insert_contest(&self, contest: &Contest) -> Result<()>;
    async fn increment_filled_spots(&self, match_id: &str) -> Result<u64>;
    async fn delete_contests(&self, match_id: &str) -> Result<u64>;

    async fn players_for_match(&self, match_id: &str) -> Result<Vec<Player>>;
    /// Rows whose `(match_id, player_id)` is already stored are skipped.
    async fn insert_players(&self, players: &[Player]) -> Result<u64>;
    async fn delete_players(&self, match_id: &str) -> Result<u64>;

    async fn find_user_team(&self, username: &str, contest_id: &str) -> Result<Option<UserTeam>>;
    async fn insert_user_team(&self, team: &UserTeam) -> Result<()>;
    async fn update_user_team(&self, team: &UserTeam) -> Result<u64>;
    async fn delete_user_teams(&self, contest_id: &str) -> Result<u64>;

    async fn find_joined_entry(
        &self,
        username: &str,
        contest_id: &str,
    ) -> Result<Option<JoinedEntry>>;
    /// Newest first.
    async fn joined_entries_for_user(&self, username: &str) -> Result<Vec<JoinedEntry>>;
    async fn insert_joined_entry(&self, entry: &JoinedEntry) -> Result<()>;
    async fn delete_joined_entries(&self, contest_id: &str) -> Result<u64>;
    /// Entries whose end-time snapshot is before `cutoff` and whose contest is not in `stored`.
    /// Entries without an end time are kept.
    async fn delete_joined_entries_ended_before(
        &self,
        cutoff: NaiveDateTime,
        stored: &[String],
    ) -> Result<u64>;

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<()>;

    async fn find_user(&self, username: &str) -> Result<Option<User>>;
    async fn update_wallet(&self, username: &str, balance: i32) -> Result<u64>;
}
