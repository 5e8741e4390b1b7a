use tracing_subscriber::{fmt, EnvFilter};

mod auth;
mod config;
mod database;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod timezone;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kursus_be=debug,tower_http=info")),
        )
        .init();

    // Load konfigurasi dari environment / .env
    let config = Config::from_env()?;

    // Inisialisasi koneksi pool ke database
    let pool = database::create_database_connection(&config).await?;

    // Run migrations
    database::run_migrations(&pool).await?;

    if let Some(admin) = &config.admin {
        database::ensure_admin(&pool, admin).await?;
    }

    let addr = config.bind_addr.clone();
    let app = routes::create_router(AppState::new(pool, config));

    // Binding listener
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
