use axum::{Extension, Router};
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod service;
pub mod telemetry;

use auth::JwtKeys;
use service::ClubService;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Pool::builder(db_config)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build database pool: {e}"))
}

pub fn app(service: ClubService, keys: JwtKeys) -> Router {
    api::app()
        .layer(Extension(service))
        .layer(Extension(keys))
}
