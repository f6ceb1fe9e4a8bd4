use async_trait::async_trait;
use chrono::NaiveDateTime;
use deadpool::managed::Object;
use diesel::{ConnectionError, ConnectionResult, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::error;
use openssl::ssl::{SslConnector, SslMethod};
use postgres_openssl::MakeTlsConnector;

use crate::config::config::Config;
use crate::error::StoreError;
use crate::models::contest::{Contest, ContestRow, CONTEST_STATUS_OPEN};
use crate::models::entry::{JoinedEntry, Transaction, UserTeam};
use crate::models::fixture::{Match, MatchRow, SportType};
use crate::models::player::{Player, PlayerRow};
use crate::models::schema::{
    contests, joined_contests, matches, players, transactions, user_teams, users,
};
use crate::models::user::User;
use crate::repository::store::{Result, Store};

pub type DBPool = Pool<AsyncPgConnection>;
type DBConn = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub struct Database {
    pool: DBPool,
}

impl Database {
    pub fn new(config: &Config) -> std::result::Result<Self, StoreError> {
        let ca_file = config.database_ca_file.clone();
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_setup(
            config.database_url.clone(),
            move |url| Self::establish(url, ca_file.clone()),
        );
        let pool = Pool::builder(manager)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;
        Ok(Database { pool })
    }

    fn establish(
        database_url: &str,
        ca_file: Option<String>,
    ) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
        async move {
            let Some(ca_file) = ca_file else {
                return AsyncPgConnection::establish(database_url).await;
            };
            let mut builder = SslConnector::builder(SslMethod::tls())
                .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
            builder
                .set_ca_file(&ca_file)
                .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
            let connector = MakeTlsConnector::new(builder.build());
            let (client, connection) = tokio_postgres::connect(database_url, connector)
                .await
                .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("postgres connection error: {e}");
                }
            });
            AsyncPgConnection::try_from(client).await
        }
        .boxed()
    }

    async fn get_db_conn(&self) -> Result<DBConn> {
        self.pool.get().await.map_err(|e| {
            error!("error getting a connection from the pool: {}", e);
            StoreError::Pool(e.to_string())
        })
    }
}

#[async_trait]
impl Store for Database {
    async fn find_match(&self, match_id: &str) -> Result<Option<Match>> {
        let mut conn = self.get_db_conn().await?;
        let row = matches::table
            .filter(matches::match_id.eq(match_id))
            .select(MatchRow::as_select())
            .first::<MatchRow>(&mut conn)
            .await
            .optional()?;
        row.map(Match::try_from).transpose()
    }

    async fn all_matches(&self) -> Result<Vec<Match>> {
        let mut conn = self.get_db_conn().await?;
        let rows = matches::table
            .select(MatchRow::as_select())
            .load::<MatchRow>(&mut conn)
            .await?;
        rows.into_iter().map(Match::try_from).collect()
    }

    async fn matches_by_sport(&self, sport: SportType, limit: i64) -> Result<Vec<Match>> {
        let mut conn = self.get_db_conn().await?;
        let rows = matches::table
            .filter(matches::sport_type.eq(sport.as_str()))
            .order(matches::date.asc())
            .limit(limit)
            .select(MatchRow::as_select())
            .load::<MatchRow>(&mut conn)
            .await?;
        rows.into_iter().map(Match::try_from).collect()
    }

    async fn insert_match(&self, record: &Match) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(matches::table)
            .values(MatchRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_match(&self, record: &Match) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(matches::table.filter(matches::match_id.eq(&record.match_id)))
            .set(MatchRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(updated as u64)
    }

    async fn delete_match(&self, match_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(matches::table.filter(matches::match_id.eq(match_id)))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn find_contest(&self, match_id: &str) -> Result<Option<Contest>> {
        let mut conn = self.get_db_conn().await?;
        let row = contests::table
            .filter(contests::match_id.eq(match_id))
            .select(ContestRow::as_select())
            .first::<ContestRow>(&mut conn)
            .await
            .optional()?;
        row.map(Contest::try_from).transpose()
    }

    async fn open_contests(&self, sport: Option<SportType>, limit: i64) -> Result<Vec<Contest>> {
        let mut conn = self.get_db_conn().await?;
        let mut query = contests::table
            .filter(contests::status.eq(CONTEST_STATUS_OPEN))
            .select(ContestRow::as_select())
            .into_boxed();
        if let Some(sport) = sport {
            query = query.filter(contests::sport_type.eq(sport.as_str()));
        }
        let rows = query
            .order(contests::match_start_time.asc())
            .limit(limit)
            .load::<ContestRow>(&mut conn)
            .await?;
        rows.into_iter().map(Contest::try_from).collect()
    }

    async fn insert_contest(&self, contest: &Contest) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(contests::table)
            .values(ContestRow::from(contest))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn increment_filled_spots(&self, match_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(contests::table.filter(contests::match_id.eq(match_id)))
            .set(contests::filled_spots.eq(contests::filled_spots + 1))
            .execute(&mut conn)
            .await?;
        Ok(updated as u64)
    }

    async fn delete_contests(&self, match_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(contests::table.filter(contests::match_id.eq(match_id)))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn players_for_match(&self, match_id: &str) -> Result<Vec<Player>> {
        let mut conn = self.get_db_conn().await?;
        let rows = players::table
            .filter(players::match_id.eq(match_id))
            .order(players::id.asc())
            .select(PlayerRow::as_select())
            .load::<PlayerRow>(&mut conn)
            .await?;
        rows.into_iter().map(Player::try_from).collect()
    }

    async fn insert_players(&self, roster: &[Player]) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let rows: Vec<PlayerRow> = roster.iter().map(PlayerRow::from).collect();
        let inserted = diesel::insert_into(players::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(inserted as u64)
    }

    async fn delete_players(&self, match_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(players::table.filter(players::match_id.eq(match_id)))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn find_user_team(&self, username: &str, contest_id: &str) -> Result<Option<UserTeam>> {
        let mut conn = self.get_db_conn().await?;
        let team = user_teams::table
            .filter(user_teams::username.eq(username))
            .filter(user_teams::contest_id.eq(contest_id))
            .select(UserTeam::as_select())
            .first::<UserTeam>(&mut conn)
            .await
            .optional()?;
        Ok(team)
    }

    async fn insert_user_team(&self, team: &UserTeam) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(user_teams::table)
            .values(team)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_user_team(&self, team: &UserTeam) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(
            user_teams::table
                .filter(user_teams::username.eq(&team.username))
                .filter(user_teams::contest_id.eq(&team.contest_id)),
        )
        .set(team)
        .execute(&mut conn)
        .await?;
        Ok(updated as u64)
    }

    async fn delete_user_teams(&self, contest_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(user_teams::table.filter(user_teams::contest_id.eq(contest_id)))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn find_joined_entry(
        &self,
        username: &str,
        contest_id: &str,
    ) -> Result<Option<JoinedEntry>> {
        let mut conn = self.get_db_conn().await?;
        let entry = joined_contests::table
            .filter(joined_contests::username.eq(username))
            .filter(joined_contests::contest_id.eq(contest_id))
            .select(JoinedEntry::as_select())
            .first::<JoinedEntry>(&mut conn)
            .await
            .optional()?;
        Ok(entry)
    }

    async fn joined_entries_for_user(&self, username: &str) -> Result<Vec<JoinedEntry>> {
        let mut conn = self.get_db_conn().await?;
        let entries = joined_contests::table
            .filter(joined_contests::username.eq(username))
            .order(joined_contests::joined_at.desc())
            .select(JoinedEntry::as_select())
            .load::<JoinedEntry>(&mut conn)
            .await?;
        Ok(entries)
    }

    async fn insert_joined_entry(&self, entry: &JoinedEntry) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(joined_contests::table)
            .values(entry)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete_joined_entries(&self, contest_id: &str) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(
            joined_contests::table.filter(joined_contests::contest_id.eq(contest_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted as u64)
    }

    async fn delete_joined_entries_ended_before(
        &self,
        cutoff: NaiveDateTime,
        stored: &[String],
    ) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(
            joined_contests::table
                .filter(joined_contests::match_end_time.lt(cutoff))
                .filter(joined_contests::contest_id.ne_all(stored)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted as u64)
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(transactions::table)
            .values(transaction)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn update_wallet(&self, username: &str, balance: i32) -> Result<u64> {
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(users::table.filter(users::username.eq(username)))
            .set((
                users::wallet.eq(balance),
                users::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(updated as u64)
    }
}
