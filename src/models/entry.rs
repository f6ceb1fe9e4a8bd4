use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

pub const ENTRY_STATUS_ACTIVE: &str = "active";

/// A user's paid entry into a contest, keyed by `(username, contest_id)`.
///
/// `match_end_time` is copied from the contest at join time so the entry can still be expired
/// after the match row itself is gone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::models::schema::joined_contests)]
pub struct JoinedEntry {
    pub username: String,
    pub email: String,
    pub contest_id: String,
    pub contest_title: String,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub badge: String,
    pub status: String,
    pub match_end_time: Option<NaiveDateTime>,
    pub joined_at: NaiveDateTime,
}

/// A user's eleven picks for a contest, keyed by `(username, contest_id)`.
#[derive(
    Serialize, Deserialize, Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset,
)]
#[diesel(table_name = crate::models::schema::user_teams)]
pub struct UserTeam {
    pub username: String,
    pub contest_id: String,
    pub selected_players: Vec<String>,
    pub captain_id: String,
    pub vice_captain_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::models::schema::transactions)]
pub struct Transaction {
    pub uuid: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i32,
    pub status: String,
    pub description: String,
    pub contest_id: Option<String>,
    pub method: String,
    pub created_at: NaiveDateTime,
}
