use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Matches with a contest join currently executing in this process.
///
/// A join holds a [`JoinGuard`] for its whole duration; the sweeper leaves such matches for the
/// next pass.
#[derive(Debug, Clone, Default)]
pub struct InFlightJoins {
    active: Arc<Mutex<HashMap<String, usize>>>,
}

impl InFlightJoins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self, match_id: &str) -> JoinGuard {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        *active.entry(match_id.to_string()).or_insert(0) += 1;
        JoinGuard {
            registry: self.clone(),
            match_id: match_id.to_string(),
        }
    }

    pub fn is_active(&self, match_id: &str) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.get(match_id).copied().unwrap_or(0) > 0
    }

    fn leave(&self, match_id: &str) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = active.get_mut(match_id) {
            *count -= 1;
            if *count == 0 {
                active.remove(match_id);
            }
        }
    }
}

#[derive(Debug)]
pub struct JoinGuard {
    registry: InFlightJoins,
    match_id: String,
}

impl Drop for JoinGuard {
    fn drop(&mut self) {
        self.registry.leave(&self.match_id);
    }
}
