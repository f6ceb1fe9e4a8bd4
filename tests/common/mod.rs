#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use fantasyiq_engine::engine::fixtures::{estimated_duration, FixtureFetcher, FixtureWindow};
use fantasyiq_engine::engine::lifecycle::Lifecycle;
use fantasyiq_engine::engine::roster::RosterProvider;
use fantasyiq_engine::error::{FeedError, StoreError};
use fantasyiq_engine::feeds::{FixtureSource, Lineup, LineupEntry, LineupSource, TextGenerator};
use fantasyiq_engine::models::contest::Contest;
use fantasyiq_engine::models::entry::{JoinedEntry, Transaction, UserTeam};
use fantasyiq_engine::models::fixture::{EndTime, Match, SportType};
use fantasyiq_engine::models::player::Player;
use fantasyiq_engine::models::user::User;
use fantasyiq_engine::repository::memory::MemoryStore;
use fantasyiq_engine::repository::store::{Result as StoreResult, Store};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn load_sample(name: &str) -> String {
    std::fs::read_to_string(format!("tests/data/{}", name))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", name, e))
}

pub fn fixture(match_id: &str, sport: SportType, start: NaiveDateTime, fetched_at: NaiveDateTime) -> Match {
    let match_type = match sport {
        SportType::Cricket => "T20".to_string(),
        SportType::Football => "English Premier League".to_string(),
    };
    let end = start + estimated_duration(sport, &match_type);
    Match {
        match_id: match_id.to_string(),
        name: "Mumbai Indians vs Chennai Super Kings".to_string(),
        match_type,
        status: "upcoming".to_string(),
        venue: "Wankhede Stadium".to_string(),
        date: start.format("%Y-%m-%d").to_string(),
        date_time_gmt: String::new(),
        match_start_time: start,
        match_end_time: Some(EndTime::At(end)),
        teams: vec!["Mumbai Indians".to_string(), "Chennai Super Kings".to_string()],
        sport_type: sport,
        league: "Indian Premier League".to_string(),
        season: String::new(),
        round: String::new(),
        created_at: fetched_at,
        fetched_at,
    }
}

pub fn user(username: &str, wallet: i32) -> User {
    User {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        wallet,
    }
}

/// Fixture source returning a fixed list, or failing every call.
pub struct StaticFixtures {
    pub sport: SportType,
    pub matches: Mutex<Vec<Match>>,
    pub fail: bool,
}

impl StaticFixtures {
    pub fn new(sport: SportType, matches: Vec<Match>) -> Self {
        StaticFixtures {
            sport,
            matches: Mutex::new(matches),
            fail: false,
        }
    }

    pub fn failing(sport: SportType) -> Self {
        StaticFixtures {
            sport,
            matches: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn replace(&self, matches: Vec<Match>) {
        *self.matches.lock().unwrap() = matches;
    }
}

#[async_trait]
impl FixtureSource for StaticFixtures {
    fn name(&self) -> &'static str {
        "static"
    }

    fn sport(&self) -> SportType {
        self.sport
    }

    async fn fetch_fixtures(&self, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
        if self.fail {
            return Err(FeedError::Disabled("STATIC"));
        }
        let mut found = self.matches.lock().unwrap().clone();
        found.truncate(window.max_matches);
        Ok(found)
    }
}

pub struct StaticLineup(pub Option<Lineup>);

#[async_trait]
impl LineupSource for StaticLineup {
    async fn fetch_lineup(&self, _match_id: &str, _sport: SportType) -> Result<Option<Lineup>, FeedError> {
        Ok(self.0.clone())
    }
}

pub struct FailingLineup;

#[async_trait]
impl LineupSource for FailingLineup {
    async fn fetch_lineup(&self, _match_id: &str, _sport: SportType) -> Result<Option<Lineup>, FeedError> {
        Err(FeedError::Status {
            url: "https://lineups.test".to_string(),
            status: 503,
        })
    }
}

/// Records every prompt and answers with fixed text.
pub struct ScriptedGenerator {
    pub text: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(text: &str) -> Self {
        ScriptedGenerator {
            text: text.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, FeedError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.text.clone())
    }
}

/// Eleven entries per side with the given positions and ids `{prefix}{n}`.
pub fn lineup(positions: [&str; 11], prefix: &str) -> Lineup {
    let mut entries = Vec::new();
    for side in 0..2 {
        for (slot, position) in positions.iter().enumerate() {
            entries.push(LineupEntry {
                raw_id: format!("{}{}", prefix, side * 100 + slot),
                name: format!("Side {} Player {}", side, slot),
                side: Some(side),
                position: position.to_string(),
                nationality: String::new(),
                birth_date: String::new(),
            });
        }
    }
    Lineup { entries }
}

pub struct Harness {
    pub memory: Arc<MemoryStore>,
    pub lifecycle: Lifecycle,
}

pub fn harness(
    sources: Vec<Arc<dyn FixtureSource>>,
    lineups: Option<Arc<dyn LineupSource>>,
    generator: Option<Arc<dyn TextGenerator>>,
) -> Harness {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = memory.clone();
    let fixtures = FixtureFetcher::new(sources, 7, 6);
    let rosters = RosterProvider::standard(store.clone(), lineups, generator);
    Harness {
        memory,
        lifecycle: Lifecycle::new(store, fixtures, rosters),
    }
}

/// Lifecycle over a `FlakyStore`, returned alongside it so tests can arm failures.
pub fn flaky_harness(sources: Vec<Arc<dyn FixtureSource>>) -> (Arc<FlakyStore>, Lifecycle) {
    let flaky = Arc::new(FlakyStore::new());
    let store: Arc<dyn Store> = flaky.clone();
    let fixtures = FixtureFetcher::new(sources, 7, 6);
    let rosters = RosterProvider::standard(store.clone(), None, None);
    (flaky, Lifecycle::new(store, fixtures, rosters))
}

/// In-memory store that fails chosen calls. `fail(op, n)` makes the `n`th call of `op` fail,
/// `n == 0` makes every call fail.
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: Mutex<Vec<(&'static str, usize)>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        FlakyStore {
            inner: MemoryStore::new(),
            failures: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail(&self, op: &'static str, nth: usize) {
        self.failures.lock().unwrap().push((op, nth));
    }

    fn check(&self, op: &'static str) -> StoreResult<()> {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(op).or_insert(0);
        *count += 1;
        let n = *count;
        let armed = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(name, nth)| *name == op && (*nth == 0 || *nth == n));
        if armed {
            Err(StoreError::Pool(format!("{} call {} refused", op, n)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn find_match(&self, match_id: &str) -> StoreResult<Option<Match>> {
        self.check("find_match")?;
        self.inner.find_match(match_id).await
    }
    async fn all_matches(&self) -> StoreResult<Vec<Match>> {
        self.check("all_matches")?;
        self.inner.all_matches().await
    }
    async fn matches_by_sport(&self, sport: SportType, limit: i64) -> StoreResult<Vec<Match>> {
        self.check("matches_by_sport")?;
        self.inner.matches_by_sport(sport, limit).await
    }
    async fn insert_match(&self, record: &Match) -> StoreResult<()> {
        self.check("insert_match")?;
        self.inner.insert_match(record).await
    }
    async fn update_match(&self, record: &Match) -> StoreResult<u64> {
        self.check("update_match")?;
        self.inner.update_match(record).await
    }
    async fn delete_match(&self, match_id: &str) -> StoreResult<u64> {
        self.check("delete_match")?;
        self.inner.delete_match(match_id).await
    }
    async fn find_contest(&self, match_id: &str) -> StoreResult<Option<Contest>> {
        self.check("find_contest")?;
        self.inner.find_contest(match_id).await
    }
    async fn open_contests(&self, sport: Option<SportType>, limit: i64) -> StoreResult<Vec<Contest>> {
        self.check("open_contests")?;
        self.inner.open_contests(sport, limit).await
    }
    async fn insert_contest(&self, contest: &Contest) -> StoreResult<()> {
        self.check("insert_contest")?;
        self.inner.insert_contest(contest).await
    }
    async fn increment_filled_spots(&self, match_id: &str) -> StoreResult<u64> {
        self.check("increment_filled_spots")?;
        self.inner.increment_filled_spots(match_id).await
    }
    async fn delete_contests(&self, match_id: &str) -> StoreResult<u64> {
        self.check("delete_contests")?;
        self.inner.delete_contests(match_id).await
    }
    async fn players_for_match(&self, match_id: &str) -> StoreResult<Vec<Player>> {
        self.check("players_for_match")?;
        self.inner.players_for_match(match_id).await
    }
    async fn insert_players(&self, players: &[Player]) -> StoreResult<u64> {
        self.check("insert_players")?;
        self.inner.insert_players(players).await
    }
    async fn delete_players(&self, match_id: &str) -> StoreResult<u64> {
        self.check("delete_players")?;
        self.inner.delete_players(match_id).await
    }
    async fn find_user_team(&self, username: &str, contest_id: &str) -> StoreResult<Option<UserTeam>> {
        self.check("find_user_team")?;
        self.inner.find_user_team(username, contest_id).await
    }
    async fn insert_user_team(&self, team: &UserTeam) -> StoreResult<()> {
        self.check("insert_user_team")?;
        self.inner.insert_user_team(team).await
    }
    async fn update_user_team(&self, team: &UserTeam) -> StoreResult<u64> {
        self.check("update_user_team")?;
        self.inner.update_user_team(team).await
    }
    async fn delete_user_teams(&self, contest_id: &str) -> StoreResult<u64> {
        self.check("delete_user_teams")?;
        self.inner.delete_user_teams(contest_id).await
    }
    async fn find_joined_entry(&self, username: &str, contest_id: &str) -> StoreResult<Option<JoinedEntry>> {
        self.check("find_joined_entry")?;
        self.inner.find_joined_entry(username, contest_id).await
    }
    async fn joined_entries_for_user(&self, username: &str) -> StoreResult<Vec<JoinedEntry>> {
        self.check("joined_entries_for_user")?;
        self.inner.joined_entries_for_user(username).await
    }
    async fn insert_joined_entry(&self, entry: &JoinedEntry) -> StoreResult<()> {
        self.check("insert_joined_entry")?;
        self.inner.insert_joined_entry(entry).await
    }
    async fn delete_joined_entries(&self, contest_id: &str) -> StoreResult<u64> {
        self.check("delete_joined_entries")?;
        self.inner.delete_joined_entries(contest_id).await
    }
    async fn delete_joined_entries_ended_before(
        &self,
        cutoff: NaiveDateTime,
        stored: &[String],
    ) -> StoreResult<u64> {
        self.check("delete_joined_entries_ended_before")?;
        self.inner.delete_joined_entries_ended_before(cutoff, stored).await
    }
    async fn insert_transaction(&self, transaction: &Transaction) -> StoreResult<()> {
        self.check("insert_transaction")?;
        self.inner.insert_transaction(transaction).await
    }
    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        self.check("find_user")?;
        self.inner.find_user(username).await
    }
    async fn update_wallet(&self, username: &str, balance: i32) -> StoreResult<u64> {
        self.check("update_wallet")?;
        self.inner.update_wallet(username, balance).await
    }
}

pub fn end_of(m: &Match) -> NaiveDateTime {
    m.match_end_time
        .as_ref()
        .and_then(EndTime::resolve)
        .expect("fixture has an end time")
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}
