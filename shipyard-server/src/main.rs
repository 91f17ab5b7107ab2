#![deny(missing_docs)]
//! Shipyard server executable.
//!
//! Hosts the ship catalog HTTP API over PostgreSQL or an in-memory store.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use shipyard_core::MemoryShipStore;

#[cfg(not(test))]
use crate::config::{ServerConfig, StoreKind};
#[cfg(not(test))]
use crate::db::init_pool;
#[cfg(not(test))]
use crate::routes::{AppState, configure};
#[cfg(not(test))]
use crate::store::PgShipStore;

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env()?;

    let state = web::Data::new(match &config.store {
        StoreKind::Postgres(database_url) => AppState::new(PgShipStore::new(init_pool(database_url)?)),
        StoreKind::Memory => {
            log::warn!("using the in-memory ship store; records are lost on exit");
            AppState::new(MemoryShipStore::new())
        }
    });

    let ServerConfig {
        host,
        port,
        allowed_origins,
        ..
    } = config;
    log::info!("listening on {host}:{port}");

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
