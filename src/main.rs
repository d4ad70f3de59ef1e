use ambalearn_dashboard::core::{AppState, Config, EngineClient};
use ambalearn_dashboard::{create_router, seed};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza il logging, livello da RUST_LOG (default info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Inizializza la configurazione
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    let engine = EngineClient::new(
        config.engine_url.clone(),
        Duration::from_secs(config.engine_timeout_secs),
    )?;

    let state = Arc::new(
        AppState::new(pool, config.jwt_secret.clone(), engine)
            .with_session_ttl_hours(config.session_ttl_hours)
            .with_secure_cookies(config.is_production()),
    );

    if config.seed_demo_data {
        if seed::seed_if_empty(&state).await? {
            info!("Demo data created");
        }
    }

    // Crea il router
    let app = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Definisci l'indirizzo
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{}", addr);

    // Avvia il server
    axum::serve(listener, app).await?;

    Ok(())
}
