use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Serialize;

use crate::engine::contest::{create_if_absent, ContestSeed};
use crate::models::fixture::Match;
use crate::repository::store::{Result, Store};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub contests_created: usize,
}

/// Upsert each fixture by `match_id`. New matches get their contest; known ones are replaced in
/// full and nothing tied to them is touched.
///
/// Stops at the first storage error. Matches handled before it stay committed.
pub async fn reconcile(
    store: &dyn Store,
    fixtures: &[Match],
    now: NaiveDateTime,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    for fixture in fixtures {
        match store.find_match(&fixture.match_id).await? {
            None => {
                store.insert_match(fixture).await?;
                report.inserted += 1;
                if create_if_absent(store, ContestSeed::from(fixture), now).await? {
                    report.contests_created += 1;
                }
            }
            Some(_) => {
                let updated = store.update_match(fixture).await?;
                debug!("updated {} row(s) for match {}", updated, fixture.match_id);
                report.updated += 1;
            }
        }
    }
    info!(
        "Reconciled {} fixtures: {} new, {} updated, {} contests created",
        fixtures.len(),
        report.inserted,
        report.updated,
        report.contests_created
    );
    Ok(report)
}
