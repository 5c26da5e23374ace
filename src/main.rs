use axum::http::Method;
use envconfig::Envconfig;
use sponity_club::{
    auth::JwtKeys,
    config::Config,
    connect_to_db,
    repository::PgClubRepository,
    service::ClubService,
    telemetry,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init();

    let config =
        Config::init_from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    let keys = JwtKeys::from_base64_secret(&config.jwt_secret)
        .map_err(|e| anyhow::anyhow!("JWT_SECRET is not valid base64: {e}"))?;

    let repo = Arc::new(PgClubRepository::new(connect_to_db(&config.db_url)?));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = sponity_club::app(ClubService::new(repo), keys)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
