use std::collections::HashSet;

use serde::Serialize;

use crate::engine::roster::PLAYERS_PER_SIDE;
use crate::error::EntryError;
use crate::models::entry::{JoinedEntry, ENTRY_STATUS_ACTIVE};

pub const TRANSACTION_DEBIT: &str = "debit";
pub const TRANSACTION_SUCCESS: &str = "success";
pub const WALLET_METHOD: &str = "Wallet";

/// A fantasy team is eleven distinct players with a captain and a different vice-captain, both
/// picked from those eleven.
pub fn validate_team(selected: &[String], captain: &str, vice_captain: &str) -> Result<(), EntryError> {
    if selected.len() != PLAYERS_PER_SIDE {
        return Err(EntryError::InvalidTeam("Team must have exactly 11 players"));
    }
    let distinct: HashSet<&str> = selected.iter().map(String::as_str).collect();
    if distinct.len() != selected.len() {
        return Err(EntryError::InvalidTeam("Team cannot contain the same player twice"));
    }
    if captain == vice_captain {
        return Err(EntryError::InvalidTeam("Captain and Vice-Captain must be different"));
    }
    if !distinct.contains(captain) || !distinct.contains(vice_captain) {
        return Err(EntryError::InvalidTeam(
            "Captain and Vice-Captain must be among the selected players",
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedStats {
    pub total_joined: usize,
    pub total_spent: i64,
    pub live_contests: usize,
}

impl JoinedStats {
    pub fn from_entries(entries: &[JoinedEntry]) -> Self {
        JoinedStats {
            total_joined: entries.len(),
            total_spent: entries.iter().map(|e| i64::from(e.entry_fee)).sum(),
            live_contests: entries
                .iter()
                .filter(|e| e.status == ENTRY_STATUS_ACTIVE)
                .count(),
        }
    }
}
