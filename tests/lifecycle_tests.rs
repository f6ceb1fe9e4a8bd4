mod common;

use std::sync::Arc;

use fantasyiq_engine::engine::contest::CONTEST_TEMPLATES;
use fantasyiq_engine::engine::reconcile::ReconcileReport;
use fantasyiq_engine::feeds::FixtureSource;
use fantasyiq_engine::models::fixture::{EndTime, SportType};
use fantasyiq_engine::repository::store::Store;

use common::{at, end_of, fixture, flaky_harness, harness, minutes, user, StaticFixtures};

#[tokio::test]
async fn sync_is_idempotent() {
    let now = at(2025, 3, 1, 9, 0);
    let cricket = Arc::new(StaticFixtures::new(
        SportType::Cricket,
        vec![
            fixture("c1", SportType::Cricket, at(2025, 3, 2, 19, 30), now),
            fixture("c2", SportType::Cricket, at(2025, 3, 3, 15, 30), now),
        ],
    ));
    let football = Arc::new(StaticFixtures::new(
        SportType::Football,
        vec![fixture("f1", SportType::Football, at(2025, 3, 2, 22, 0), now)],
    ));
    let sources: Vec<Arc<dyn FixtureSource>> = vec![cricket, football];
    let h = harness(sources, None, None);

    let first = h.lifecycle.sync_at(now).await;
    assert!(first.success);
    assert_eq!(first.fetched, 3);
    assert_eq!(
        first.reconciled,
        ReconcileReport {
            inserted: 3,
            updated: 0,
            contests_created: 3
        }
    );

    let second = h.lifecycle.sync_at(now + minutes(60)).await;
    assert!(second.success);
    assert_eq!(
        second.reconciled,
        ReconcileReport {
            inserted: 0,
            updated: 3,
            contests_created: 0
        }
    );

    let store = h.lifecycle.store();
    assert_eq!(store.all_matches().await.unwrap().len(), 3);
    for id in ["c1", "c2", "f1"] {
        assert_eq!(h.memory.contest_count(id).await, 1, "contest for {}", id);
    }
}

#[tokio::test]
async fn resync_replaces_match_fields_but_not_the_contest() {
    let now = at(2025, 3, 1, 9, 0);
    let original = fixture("c1", SportType::Cricket, at(2025, 3, 2, 19, 30), now);
    let cricket = Arc::new(StaticFixtures::new(SportType::Cricket, vec![original.clone()]));
    let h = harness(vec![cricket.clone() as Arc<dyn FixtureSource>], None, None);
    h.lifecycle.sync_at(now).await;
    let contest_before = h.lifecycle.store().find_contest("c1").await.unwrap().unwrap();

    let mut moved = original.clone();
    moved.venue = "Eden Gardens".to_string();
    moved.match_start_time = at(2025, 3, 2, 20, 0);
    moved.match_end_time = Some(EndTime::At(at(2025, 3, 2, 23, 30)));
    cricket.replace(vec![moved]);
    h.lifecycle.sync_at(now + minutes(30)).await;

    let stored = h.lifecycle.store().find_match("c1").await.unwrap().unwrap();
    assert_eq!(stored.venue, "Eden Gardens");
    assert_eq!(stored.match_start_time, at(2025, 3, 2, 20, 0));
    let contest_after = h.lifecycle.store().find_contest("c1").await.unwrap().unwrap();
    assert_eq!(contest_before, contest_after);
}

#[tokio::test]
async fn failing_source_degrades_to_no_fixtures() {
    let now = at(2025, 3, 1, 9, 0);
    let sources: Vec<Arc<dyn FixtureSource>> = vec![
        Arc::new(StaticFixtures::failing(SportType::Cricket)),
        Arc::new(StaticFixtures::new(
            SportType::Football,
            vec![fixture("f1", SportType::Football, at(2025, 3, 2, 22, 0), now)],
        )),
    ];
    let h = harness(sources, None, None);
    let report = h.lifecycle.sync_at(now).await;
    assert!(report.success);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.reconciled.inserted, 1);
}

#[tokio::test]
async fn contest_is_created_once_from_a_template() {
    let now = at(2025, 3, 1, 9, 0);
    let h = harness(Vec::new(), None, None);
    let record = fixture("c9", SportType::Cricket, at(2025, 3, 2, 19, 30), now);
    h.lifecycle.store().insert_match(&record).await.unwrap();

    let created = h
        .lifecycle
        .create_contest_if_absent("c9", &record.name, SportType::Cricket)
        .await
        .unwrap();
    assert!(created);
    let again = h
        .lifecycle
        .create_contest_if_absent("c9", &record.name, SportType::Cricket)
        .await
        .unwrap();
    assert!(!again);
    assert_eq!(h.memory.contest_count("c9").await, 1);

    let contest = h.lifecycle.store().find_contest("c9").await.unwrap().unwrap();
    let template = CONTEST_TEMPLATES
        .iter()
        .find(|t| t.badge == contest.badge)
        .expect("badge comes from a template");
    assert_eq!(contest.entry_fee, template.entry_fee);
    assert_eq!(contest.prize_pool, template.prize_pool);
    assert_eq!(contest.max_spots, template.max_spots);
    assert_eq!(contest.filled_spots, 0);
    assert_eq!(contest.title, record.name);
    assert_eq!(contest.match_start_time, Some(record.match_start_time));
    assert_eq!(contest.match_end_time, Some(end_of(&record)));
    assert_eq!(contest.teams, record.teams);
}

/// A synced T20 with one joined user and a saved roster, returned with its end time.
async fn joined_match(h: &common::Harness) -> chrono::NaiveDateTime {
    let fetched = at(2025, 3, 1, 9, 0);
    let record = fixture("m1", SportType::Cricket, at(2025, 3, 2, 19, 30), fetched);
    let store = h.lifecycle.store();
    store.insert_match(&record).await.unwrap();
    h.lifecycle
        .create_contest_if_absent("m1", &record.name, SportType::Cricket)
        .await
        .unwrap();
    h.memory.insert_user(user("rahul_k", 10_000)).await;
    h.lifecycle
        .join_contest("rahul_k", "m1", fetched)
        .await
        .expect("join succeeds");
    end_of(&record)
}

#[tokio::test]
async fn sweep_keeps_everything_shortly_after_the_match() {
    let h = harness(Vec::new(), None, None);
    let end = joined_match(&h).await;

    let report = h.lifecycle.cleanup_at(end + minutes(30)).await;
    assert_eq!(report.matches, 0);
    assert_eq!(report.joined_contests, 0);
    let store = h.lifecycle.store();
    assert!(store.find_match("m1").await.unwrap().is_some());
    assert_eq!(store.players_for_match("m1").await.unwrap().len(), 22);
}

#[tokio::test]
async fn sweep_after_an_hour_keeps_joined_entries() {
    let h = harness(Vec::new(), None, None);
    let end = joined_match(&h).await;

    let report = h.lifecycle.cleanup_at(end + minutes(90)).await;
    assert_eq!(report.matches, 1);
    assert_eq!(report.contests, 1);
    assert_eq!(report.players, 22);
    assert_eq!(report.joined_contests, 0);
    assert_eq!(report.failed_steps, 0);

    let store = h.lifecycle.store();
    assert!(store.find_match("m1").await.unwrap().is_none());
    assert!(store.find_contest("m1").await.unwrap().is_none());
    assert!(store.players_for_match("m1").await.unwrap().is_empty());
    assert_eq!(store.joined_entries_for_user("rahul_k").await.unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_after_a_day_removes_joined_entries() {
    let h = harness(Vec::new(), None, None);
    let end = joined_match(&h).await;

    let report = h.lifecycle.cleanup_at(end + minutes(25 * 60)).await;
    assert_eq!(report.matches, 1);
    assert_eq!(report.joined_contests, 1);
    assert!(h
        .lifecycle
        .store()
        .joined_entries_for_user("rahul_k")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn joined_entries_outlive_their_match_until_the_day_passes() {
    let h = harness(Vec::new(), None, None);
    let end = joined_match(&h).await;

    h.lifecycle.cleanup_at(end + minutes(90)).await;
    let early = h.lifecycle.cleanup_at(end + minutes(12 * 60)).await;
    assert_eq!(early.joined_contests, 0);

    let late = h.lifecycle.cleanup_at(end + minutes(24 * 60 + 1)).await;
    assert_eq!(late.matches, 0);
    assert_eq!(late.joined_contests, 1);
    assert!(h
        .lifecycle
        .store()
        .joined_entries_for_user("rahul_k")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn sweep_skips_unreadable_end_times() {
    let now = at(2025, 3, 1, 9, 0);
    let h = harness(Vec::new(), None, None);
    let mut record = fixture("m2", SportType::Football, at(2025, 2, 1, 20, 0), now);
    record.match_end_time = Some(EndTime::Raw("sometime tonight".to_string()));
    h.lifecycle.store().insert_match(&record).await.unwrap();
    let mut open_ended = fixture("m3", SportType::Football, at(2025, 2, 1, 20, 0), now);
    open_ended.match_end_time = None;
    h.lifecycle.store().insert_match(&open_ended).await.unwrap();

    let report = h.lifecycle.cleanup_at(now).await;
    assert_eq!(report.skipped_unresolved, 2);
    assert_eq!(report.matches, 0);
    assert_eq!(h.lifecycle.store().all_matches().await.unwrap().len(), 2);
}

#[tokio::test]
async fn sweep_accepts_text_end_times() {
    let now = at(2025, 3, 1, 9, 0);
    let h = harness(Vec::new(), None, None);
    let mut record = fixture("m4", SportType::Football, at(2025, 2, 28, 18, 0), now);
    record.match_end_time = Some(EndTime::Raw("2025-02-28 20:00:00".to_string()));
    h.lifecycle.store().insert_match(&record).await.unwrap();

    let report = h.lifecycle.cleanup_at(now).await;
    assert_eq!(report.matches, 1);
}

#[tokio::test]
async fn sweep_leaves_matches_with_a_join_in_flight() {
    let h = harness(Vec::new(), None, None);
    let end = joined_match(&h).await;

    let guard = h.lifecycle.in_flight().enter("m1");
    let report = h.lifecycle.cleanup_at(end + minutes(90)).await;
    assert_eq!(report.skipped_in_flight, 1);
    assert_eq!(report.matches, 0);
    assert!(h.lifecycle.store().find_contest("m1").await.unwrap().is_some());

    drop(guard);
    let report = h.lifecycle.cleanup_at(end + minutes(90)).await;
    assert_eq!(report.skipped_in_flight, 0);
    assert_eq!(report.matches, 1);
}

#[tokio::test]
async fn rescheduled_matches_keep_their_joined_entries() {
    let now = at(2025, 3, 1, 9, 0);
    let original = fixture("m1", SportType::Cricket, at(2025, 3, 2, 19, 30), now);
    let cricket = Arc::new(StaticFixtures::new(SportType::Cricket, vec![original.clone()]));
    let h = harness(vec![cricket.clone() as Arc<dyn FixtureSource>], None, None);
    h.lifecycle.sync_at(now).await;
    h.memory.insert_user(user("rahul_k", 10_000)).await;
    h.lifecycle.join_contest("rahul_k", "m1", now).await.expect("join succeeds");

    let mut moved = original.clone();
    moved.match_start_time = original.match_start_time + chrono::Duration::days(3);
    moved.match_end_time = Some(EndTime::At(end_of(&original) + chrono::Duration::days(3)));
    cricket.replace(vec![moved.clone()]);
    h.lifecycle.sync_at(now + minutes(60)).await;

    let report = h.lifecycle.cleanup_at(end_of(&original) + minutes(25 * 60)).await;
    assert_eq!(report.matches, 0);
    assert_eq!(report.joined_contests, 0);
    let store = h.lifecycle.store();
    assert!(store.find_match("m1").await.unwrap().is_some());
    assert_eq!(store.joined_entries_for_user("rahul_k").await.unwrap().len(), 1);

    let report = h.lifecycle.cleanup_at(end_of(&moved) + minutes(25 * 60)).await;
    assert_eq!(report.matches, 1);
    assert_eq!(report.joined_contests, 1);
}

#[tokio::test]
async fn sync_keeps_matches_stored_before_a_storage_failure() {
    let now = at(2025, 3, 1, 9, 0);
    let cricket = Arc::new(StaticFixtures::new(
        SportType::Cricket,
        vec![
            fixture("c1", SportType::Cricket, at(2025, 3, 2, 19, 30), now),
            fixture("c2", SportType::Cricket, at(2025, 3, 3, 15, 30), now),
            fixture("c3", SportType::Cricket, at(2025, 3, 4, 15, 30), now),
        ],
    ));
    let (flaky, lifecycle) = flaky_harness(vec![cricket as Arc<dyn FixtureSource>]);
    flaky.fail("insert_match", 2);

    let report = lifecycle.sync_at(now).await;
    assert!(!report.success);
    assert_eq!(report.fetched, 3);
    assert!(flaky.inner.find_match("c1").await.unwrap().is_some());
    assert_eq!(flaky.inner.contest_count("c1").await, 1);
    assert!(flaky.inner.find_match("c2").await.unwrap().is_none());
    assert!(flaky.inner.find_match("c3").await.unwrap().is_none());

    let retry = lifecycle.sync_at(now + minutes(60)).await;
    assert!(retry.success);
    assert_eq!(retry.reconciled.inserted, 2);
    assert_eq!(retry.reconciled.updated, 1);
    assert_eq!(flaky.inner.all_matches().await.unwrap().len(), 3);
}

#[tokio::test]
async fn failed_sweep_steps_do_not_block_the_others() {
    let now = at(2025, 3, 1, 9, 0);
    let (flaky, lifecycle) = flaky_harness(Vec::new());
    for id in ["m1", "m2"] {
        let record = fixture(id, SportType::Cricket, at(2025, 3, 2, 19, 30), now);
        flaky.inner.insert_match(&record).await.unwrap();
        lifecycle
            .create_contest_if_absent(id, &record.name, SportType::Cricket)
            .await
            .unwrap();
        let roster = lifecycle
            .get_roster_at(id, "Mumbai Indians", "Chennai Super Kings", now)
            .await;
        assert_eq!(roster.players.len(), 22);
    }
    flaky.fail("delete_players", 0);

    let report = lifecycle.cleanup_at(at(2025, 3, 10, 12, 0)).await;
    assert_eq!(report.failed_steps, 2);
    assert_eq!(report.matches, 2);
    assert_eq!(report.contests, 2);
    assert_eq!(report.players, 0);
    assert!(flaky.inner.find_contest("m1").await.unwrap().is_none());
    assert_eq!(flaky.inner.players_for_match("m1").await.unwrap().len(), 22);
}

#[tokio::test]
async fn sweep_stops_when_matches_cannot_be_listed() {
    let now = at(2025, 3, 1, 9, 0);
    let (flaky, lifecycle) = flaky_harness(Vec::new());
    let record = fixture("m1", SportType::Cricket, at(2025, 2, 20, 19, 30), now);
    flaky.inner.insert_match(&record).await.unwrap();
    flaky.fail("all_matches", 0);

    let report = lifecycle.cleanup_at(now).await;
    assert_eq!(report.failed_steps, 1);
    assert_eq!(report.matches, 0);
    assert!(flaky.inner.find_match("m1").await.unwrap().is_some());
}

#[tokio::test]
async fn scheduler_runs_both_jobs_at_start() {
    use fantasyiq_engine::engine::scheduler::Scheduler;
    use fantasyiq_engine::util::time::reference_now;
    use std::time::Duration as StdDuration;

    let now = reference_now();
    let cricket = Arc::new(StaticFixtures::new(
        SportType::Cricket,
        vec![fixture("s1", SportType::Cricket, now + chrono::Duration::days(1), now)],
    ));
    let h = harness(vec![cricket as Arc<dyn FixtureSource>], None, None);
    let memory = h.memory.clone();
    let lifecycle = Arc::new(h.lifecycle);

    let hour = StdDuration::from_secs(3600);
    let mut scheduler = Scheduler::start(lifecycle, hour, hour);
    for _ in 0..100 {
        if memory.contest_count("s1").await == 1 {
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(20)).await;
    }
    assert_eq!(memory.contest_count("s1").await, 1);
    scheduler.shutdown();
}
