use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use fantasyiq_engine::config::config::{Config, CricketProvider};
use fantasyiq_engine::config::logging;
use fantasyiq_engine::controller;
use fantasyiq_engine::controller::handler::{health_check, not_found};
use fantasyiq_engine::engine::fixtures::FixtureFetcher;
use fantasyiq_engine::engine::lifecycle::Lifecycle;
use fantasyiq_engine::engine::roster::RosterProvider;
use fantasyiq_engine::engine::scheduler::Scheduler;
use fantasyiq_engine::feeds::cricapi::CricApiClient;
use fantasyiq_engine::feeds::gemini::GeminiClient;
use fantasyiq_engine::feeds::sportmonks::SportMonksClient;
use fantasyiq_engine::feeds::sportsdb::SportsDbClient;
use fantasyiq_engine::feeds::{build_client, FixtureSource, LineupSource, TextGenerator};
use fantasyiq_engine::repository::database::Database;
use fantasyiq_engine::repository::store::Store;
use fantasyiq_engine::AppState;
use log::{error, info};

fn build_lifecycle(config: &Config, store: Arc<dyn Store>) -> reqwest::Result<Lifecycle> {
    let http = build_client(config.http_timeout)?;
    let sportmonks = Arc::new(SportMonksClient::new(
        http.clone(),
        config.sportmonks_api_key.clone(),
    ));

    let cricket: Arc<dyn FixtureSource> = match config.cricket_provider {
        CricketProvider::CricApi => Arc::new(CricApiClient::new(http.clone(), config.cricapi_key.clone())),
        CricketProvider::SportMonks => sportmonks.clone(),
    };
    let football: Arc<dyn FixtureSource> = Arc::new(SportsDbClient::new(
        http.clone(),
        config.sportsdb_api_key.clone(),
    ));
    let fixtures = FixtureFetcher::new(
        vec![cricket, football],
        config.lookahead_days,
        config.max_matches_per_sport,
    );

    let lineups: Option<Arc<dyn LineupSource>> = if config.sportmonks_api_key.is_empty() {
        None
    } else {
        Some(sportmonks)
    };
    let generator: Option<Arc<dyn TextGenerator>> = if config.gemini_api_key.is_empty() {
        None
    } else {
        Some(Arc::new(GeminiClient::new(
            http,
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )))
    };
    let rosters = RosterProvider::standard(store.clone(), lineups, generator);

    Ok(Lifecycle::new(store, fixtures, rosters))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let config = match Config::init() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    config.validate();

    let db = Database::new(&config).map_err(|e| {
        error!("Failed to create the database pool: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let store: Arc<dyn Store> = Arc::new(db);
    let lifecycle = build_lifecycle(&config, store).map_err(|e| {
        error!("Failed to build the HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let lifecycle = Arc::new(lifecycle);

    let mut scheduler = Scheduler::start(
        lifecycle.clone(),
        config.sync_interval,
        config.cleanup_interval,
    );

    let app_data = web::Data::new(AppState { lifecycle });
    info!(
        "Starting server on {}:{}",
        config.server_host, config.server_port
    );
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(controller::handler::config)
            .service(health_check)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await;

    scheduler.shutdown();
    server
}
