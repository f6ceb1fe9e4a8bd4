pub mod contest;
pub mod entry;
pub mod fixtures;
pub mod inflight;
pub mod lifecycle;
pub mod reconcile;
pub mod roles;
pub mod roster;
pub mod scheduler;
pub mod sweeper;
