use std::sync::Arc;

use crate::engine::lifecycle::Lifecycle;

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod feeds;
pub mod models;
pub mod repository;
pub mod service;
pub mod util;

pub struct AppState {
    pub lifecycle: Arc<Lifecycle>,
}
